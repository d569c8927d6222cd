//! Configuration module for Moodle Reminder
//!
//! Configuration comes from an optional TOML file, is overlaid with
//! environment variables, then normalized and validated.
//!
//! # Example
//!
//! ```no_run
//! use moodle_reminder::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("reminder.toml")).unwrap();
//! println!("Portal: {}", config.portal.base_url);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HttpConfig, PortalConfig, ReminderConfig, MAX_TOTP_SECRET_LEN,
    MIN_REQUEST_TIMEOUT_SECS, PLACEHOLDER_BASE_URL,
};

// Re-export loading functions
pub use env::apply_env_overrides;
pub use parser::{
    compute_config_hash, load_config, load_config_from_env, load_config_with_hash,
    parse_config_with,
};
pub use validation::{normalize, validate};
