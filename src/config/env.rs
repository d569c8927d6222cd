use crate::config::types::Config;

/// Overlays environment values onto a configuration
///
/// `lookup` returns the value of a variable, if set. Passing a closure keeps
/// tests independent of the process environment. Blank values are ignored,
/// as are integers that fail to parse.
///
/// | Variable | Field |
/// |----------|-------|
/// | `MOODLE_URL` | `portal.base_url` |
/// | `MOODLE_USER` | `portal.username` |
/// | `MOODLE_PASSWORD` | `portal.password` |
/// | `TOTP_SECRET` | `portal.totp_secret` |
/// | `ACCESS_INTERVAL` | `http.access_interval` |
/// | `REQUEST_TIMEOUT` | `http.request_timeout` |
/// | `REMINDER_DAYS` | `reminder.days` |
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    if let Some(v) = get("MOODLE_URL") {
        config.portal.base_url = v;
    }
    if let Some(v) = get("MOODLE_USER") {
        config.portal.username = v;
    }
    if let Some(v) = get("MOODLE_PASSWORD") {
        config.portal.password = v;
    }
    if let Some(v) = get("TOTP_SECRET") {
        config.portal.totp_secret = Some(v);
    }
    if let Some(v) = get("ACCESS_INTERVAL").and_then(|v| v.parse().ok()) {
        config.http.access_interval = v;
    }
    if let Some(v) = get("REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.http.request_timeout = v;
    }
    if let Some(v) = get("REMINDER_DAYS").and_then(|v| v.parse().ok()) {
        config.reminder.days = v;
    }
}
