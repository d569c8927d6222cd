//! SSO gateway, SAML hand-off and re-authentication form detectors

use crate::classify::form::FormInfo;
use crate::classify::glossary::FieldGlossary;

/// Action substrings (lowercase) of an authentication server
const AUTH_SERVER_TOKENS: &[&str] = &["auth", "sso"];

/// Action substrings (lowercase) of a SAML assertion receiver
const SAML_RECEIVER_TOKENS: &[&str] = &["authnrequestreceiver", "samlidp"];

/// Action substring (lowercase) of the re-authentication endpoint
const REAUTH_ENDPOINT_TOKEN: &str = "smauthenticator";

fn action_contains_any(form: &FormInfo, tokens: &[&str]) -> bool {
    let action = form.action_str().to_lowercase();
    tokens.iter().any(|t| action.contains(t))
}

/// GET form that returns a SAML assertion to the portal
pub fn is_saml_redirect(form: &FormInfo, glossary: &FieldGlossary) -> bool {
    action_contains_any(form, SAML_RECEIVER_TOKENS)
        && form.is_get()
        && form.has_input_named(&glossary.saml_request)
        && form.has_input_named(&glossary.relay_state)
}

/// Auto-submitting form that forwards the session to an auth server
///
/// Every input must be hidden (submit buttons aside) and none may be shaped
/// like a username or password.
pub fn is_sso_gateway(form: &FormInfo, glossary: &FieldGlossary) -> bool {
    if !action_contains_any(form, AUTH_SERVER_TOKENS) || is_saml_redirect(form, glossary) {
        return false;
    }

    let fields: Vec<_> = form
        .inputs
        .iter()
        .filter(|i| !matches!(i.input_type.as_deref(), Some("submit" | "button" | "image")))
        .collect();

    let only_hidden = !fields.is_empty() && fields.iter().all(|i| i.is_hidden());
    let credential_shaped = fields.iter().any(|i| {
        let name = i.name.as_deref().unwrap_or("").to_lowercase();
        i.is_password() || name.contains("user") || name.contains("pass")
    });

    only_hidden && !credential_shaped
}

/// Secondary login asking for identity plus a one-time code
pub fn is_reauth_form(form: &FormInfo, glossary: &FieldGlossary) -> bool {
    action_contains_any(form, &[REAUTH_ENDPOINT_TOKEN])
        && form.has_input_named(&glossary.reauth_identity)
        && form.has_input_named(&glossary.reauth_secret)
}

/// Builds the re-authentication submission
///
/// The identity and secret fields get the account identifier and a fresh
/// one-time code; every other named input is replayed.
pub fn build_reauth_payload(
    form: &FormInfo,
    glossary: &FieldGlossary,
    username: &str,
    code: &str,
) -> Vec<(String, String)> {
    form.replay_payload()
        .into_iter()
        .map(|(name, value)| {
            if name == glossary.reauth_identity {
                (name, username.to_string())
            } else if name == glossary.reauth_secret {
                (name, code.to_string())
            } else {
                (name, value)
            }
        })
        .collect()
}
