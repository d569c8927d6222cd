//! Bounded following of SSO gateways, SAML hand-offs and re-authentication
//!
//! Gateway chains have no fixed length in the wild, so the loop carries an
//! explicit hop budget and fails once it is spent.

use crate::auth::Totp;
use crate::classify::{build_reauth_payload, classify, FieldGlossary, PageKind};
use crate::config::PortalConfig;
use crate::session::{Page, Session};
use crate::{ReminderError, Result};
use url::Url;

/// Maximum hand-offs followed after login
pub const SSO_FOLLOW_LIMIT: usize = 8;

/// One request the follow loop has decided to make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandOff {
    /// POST identity plus a fresh one-time code
    Reauth {
        url: Url,
        payload: Vec<(String, String)>,
    },
    /// GET the receiver with the SAML request and relay state
    Saml {
        url: Url,
        params: Vec<(String, String)>,
    },
    /// POST the gateway's hidden fields unchanged
    Gateway {
        url: Url,
        payload: Vec<(String, String)>,
    },
}

impl HandOff {
    fn kind(&self) -> PageKind {
        match self {
            Self::Reauth { .. } => PageKind::TwoFactorReauth,
            Self::Saml { .. } => PageKind::SamlRedirect,
            Self::Gateway { .. } => PageKind::SsoGateway,
        }
    }

    async fn send(&self, session: &Session) -> Result<Page> {
        match self {
            Self::Reauth { url, payload } | Self::Gateway { url, payload } => {
                session.post_form(url, payload).await
            }
            Self::Saml { url, params } => session.get_with_query(url, params).await,
        }
    }
}

/// Decides the next hand-off for a page, or None once the chain has settled
///
/// A re-authentication page without a configured TOTP seed also ends the
/// chain, with a warning.
pub fn next_hand_off(
    page: &Page,
    portal: &PortalConfig,
    glossary: &FieldGlossary,
) -> Result<Option<HandOff>> {
    let document = page.document();
    let classification = classify(&document, &page.url, glossary);
    tracing::debug!("Follow check: {} classified as {}", page.url, classification.kind);

    let Some(form) = classification.form.filter(|_| classification.kind.is_hand_off()) else {
        return Ok(None);
    };
    let url = form.resolve_action(&page.url);

    let step = match classification.kind {
        PageKind::TwoFactorReauth => {
            let Some(secret) = portal.totp_secret.as_deref() else {
                tracing::warn!(
                    "Re-authentication page at {} needs a one-time code but no TOTP secret is configured",
                    page.url
                );
                return Ok(None);
            };
            let code = Totp::from_base32(secret)?.now()?;
            HandOff::Reauth {
                url,
                payload: build_reauth_payload(&form, glossary, &portal.username, &code),
            }
        }
        PageKind::SamlRedirect => HandOff::Saml {
            url,
            params: form.replay_payload(),
        },
        _ => HandOff::Gateway {
            url,
            payload: form.replay_payload(),
        },
    };

    Ok(Some(step))
}

/// Follows hand-off pages until one that is none of them is reached
///
/// Returns the settled page. Transport errors are fatal; running out of hops
/// while still on a hand-off page yields `GatewayLoopExhausted`.
pub async fn follow_sso_chain(
    session: &Session,
    portal: &PortalConfig,
    glossary: &FieldGlossary,
    page: Page,
) -> Result<Page> {
    let mut page = page;
    let mut hops = 0;

    while let Some(step) = next_hand_off(&page, portal, glossary)? {
        if hops == SSO_FOLLOW_LIMIT {
            return Err(ReminderError::GatewayLoopExhausted {
                url: page.url.to_string(),
                limit: SSO_FOLLOW_LIMIT,
            });
        }
        hops += 1;

        tracing::info!("[sso] hop {}: following {} from {}", hops, step.kind(), page.url);
        page = step.send(session).await?;
    }

    if hops > 0 {
        tracing::info!("[sso] chain settled after {} hops at {}", hops, page.url);
    }

    Ok(page)
}
