//! Authentication state definitions
//!
//! This module defines every state the login flow can be in and which
//! transitions between them are legal.
use std::fmt;

/// Represents the current state of an authentication attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthState {
    // ===== Active States =====
    /// Nothing fetched yet
    Start,

    /// Portal root fetched
    HomeFetched,

    /// A login form has been found (possibly after following links/gateways)
    LoginPageLocated,

    /// Credentials were posted
    CredentialsSubmitted,

    /// The response asked for a one-time code
    TwoFactorChallenge,

    /// A one-time code was posted
    TwoFactorSubmitted,

    /// Following SSO gateways, SAML hand-offs and re-authentication pages
    SsoGatewayFollowing,

    // ===== Terminal States =====
    /// Session is ready for data retrieval
    Authenticated,

    /// Authentication failed; the session must not be reused
    Failed,
}

impl AuthState {
    /// Returns true if no further transitions are expected
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated | Self::Failed)
    }

    /// Returns true if `next` may follow this state
    ///
    /// Any non-terminal state may fail.
    pub fn can_transition_to(&self, next: AuthState) -> bool {
        use AuthState::*;

        if next == Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Start, HomeFetched)
                | (HomeFetched, LoginPageLocated)
                | (LoginPageLocated, CredentialsSubmitted)
                | (CredentialsSubmitted, TwoFactorChallenge)
                | (CredentialsSubmitted, SsoGatewayFollowing)
                | (TwoFactorChallenge, TwoFactorSubmitted)
                | (TwoFactorSubmitted, SsoGatewayFollowing)
                | (SsoGatewayFollowing, Authenticated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::HomeFetched => "home_fetched",
            Self::LoginPageLocated => "login_page_located",
            Self::CredentialsSubmitted => "credentials_submitted",
            Self::TwoFactorChallenge => "two_factor_challenge",
            Self::TwoFactorSubmitted => "two_factor_submitted",
            Self::SsoGatewayFollowing => "sso_gateway_following",
            Self::Authenticated => "authenticated",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
