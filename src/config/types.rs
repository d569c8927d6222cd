use serde::Deserialize;

/// Placeholder base URL shipped in sample configurations
pub const PLACEHOLDER_BASE_URL: &str = "https://moodle.example.ac.jp";

/// Longest TOTP seed accepted; longer values are assumed to be pasted twice
pub const MAX_TOTP_SECRET_LEN: usize = 32;

/// Smallest per-request timeout allowed (seconds)
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Main configuration structure for Moodle Reminder
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: PortalConfig,
    pub http: HttpConfig,
    pub reminder: ReminderConfig,
}

/// Portal location and account credentials
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Root URL of the portal, without trailing slash after normalization
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Account identifier typed into the login form
    pub username: String,

    /// Account secret typed into the login form
    pub password: String,

    /// Base32 seed for time-based one-time codes
    #[serde(rename = "totp-secret")]
    pub totp_secret: Option<String>,
}

/// HTTP session behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Pause after every request (seconds); zero disables pacing
    #[serde(rename = "access-interval")]
    pub access_interval: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            access_interval: 2,
            request_timeout: MIN_REQUEST_TIMEOUT_SECS,
            user_agent: "MoodleReminder/1.0".to_string(),
        }
    }
}

/// Reminder window
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Assignments due within this many days are reminded
    pub days: u32,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { days: 1 }
    }
}
