//! Moodle Reminder: pending assignments from a portal without an API
//!
//! This crate signs into a Moodle-style learning portal using nothing but the
//! HTML it serves, walking whatever chain of login forms, SSO gateways, SAML
//! hand-offs and two-factor pages the institution has put in front of it, and
//! then scrapes the calendar and dashboard into a deduplicated, deadline-sorted
//! list of assignments.

pub mod assignment;
pub mod auth;
pub mod classify;
pub mod config;
pub mod extract;
pub mod output;
pub mod session;
pub mod url;

mod dom;

use thiserror::Error;

/// Main error type for Moodle Reminder operations
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("No login form could be located (last page: {url})")]
    FormNotFound { url: String },

    #[error("Credentials rejected: still on a login page at {url}")]
    CredentialsRejected { url: String },

    #[error("Two-factor authentication required but no TOTP secret is configured")]
    TwoFactorRequired,

    #[error("Two-factor code rejected: challenge still present at {url}")]
    TwoFactorRejected { url: String },

    #[error("Two-factor challenge at {url} has no recognizable code field")]
    TwoFactorFieldMissing { url: String },

    #[error("SSO gateway chain did not settle after {limit} hops (last page: {url})")]
    GatewayLoopExhausted { url: String, limit: usize },

    #[error("{extractor} extraction failed: {reason}")]
    ExtractionPartial {
        extractor: &'static str,
        reason: String,
    },

    #[error("Invalid auth state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: auth::AuthState,
        to: auth::AuthState,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("TOTP error: {0}")]
    Totp(#[from] TotpError),
}

impl ReminderError {
    /// Returns true for network-level failures (the transport error family)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::HttpStatus { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while generating one-time codes
#[derive(Debug, Error)]
pub enum TotpError {
    #[error("Secret is not valid base32: {0}")]
    InvalidSecret(String),

    #[error("Secret is empty")]
    EmptySecret,

    #[error("System clock is before the Unix epoch")]
    ClockSkew,
}

/// Result type alias for Moodle Reminder operations
pub type Result<T> = std::result::Result<T, ReminderError>;

// Re-export commonly used types
pub use assignment::{merge_assignments, Assignment};
pub use auth::{AuthState, Authenticator};
pub use config::Config;
pub use extract::fetch_assignments;
pub use session::{Page, Session};
