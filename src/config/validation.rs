use crate::auth::Totp;
use crate::config::types::{
    Config, HttpConfig, PortalConfig, MAX_TOTP_SECRET_LEN, MIN_REQUEST_TIMEOUT_SECS,
    PLACEHOLDER_BASE_URL,
};
use crate::url::trim_base_url;
use crate::ConfigError;
use url::Url;

/// Normalizes a configuration in place
///
/// - trailing slashes are removed from the base URL
/// - a blank TOTP seed becomes `None`; one longer than 32 characters is cut
///   to its first 32 (the usual result of pasting the seed twice)
/// - the request timeout is raised to the minimum if it is lower
pub fn normalize(config: &mut Config) {
    config.portal.base_url = trim_base_url(&config.portal.base_url);

    config.portal.totp_secret = config
        .portal
        .totp_secret
        .take()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s.chars().count() > MAX_TOTP_SECRET_LEN {
                s.chars().take(MAX_TOTP_SECRET_LEN).collect()
            } else {
                s
            }
        });

    config.http.request_timeout = config.http.request_timeout.max(MIN_REQUEST_TIMEOUT_SECS);
}

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_portal_config(&config.portal)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates portal location and credentials
fn validate_portal_config(config: &PortalConfig) -> Result<(), ConfigError> {
    if config.base_url.is_empty() || config.base_url == PLACEHOLDER_BASE_URL {
        return Err(ConfigError::Validation(
            "base_url must be set to your portal's address (MOODLE_URL)".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.username.is_empty() {
        return Err(ConfigError::Validation(
            "username cannot be empty (MOODLE_USER)".to_string(),
        ));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "password cannot be empty (MOODLE_PASSWORD)".to_string(),
        ));
    }

    if let Some(secret) = &config.totp_secret {
        Totp::from_base32(secret)
            .map_err(|e| ConfigError::Validation(format!("Invalid totp_secret: {}", e)))?;
    }

    Ok(())
}

/// Validates HTTP session settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}
