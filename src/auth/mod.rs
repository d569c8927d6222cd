//! Authentication against the portal
//!
//! The login flow is a small state machine ([`AuthState`]) driven by
//! [`Authenticator`]. Once credentials (and a one-time code, if asked for)
//! have been accepted, [`follow_sso_chain`] walks whatever gateways remain.

mod machine;
mod sso;
mod state;
mod totp;

pub use machine::{Authenticator, PRE_LOGIN_GATEWAY_LIMIT};
pub use sso::{follow_sso_chain, next_hand_off, HandOff, SSO_FOLLOW_LIMIT};
pub use state::AuthState;
pub use totp::{Totp, TOTP_DIGITS, TOTP_STEP_SECS};
