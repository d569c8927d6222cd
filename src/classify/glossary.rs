/// Field and endpoint vocabulary the classifier matches against
///
/// Portals differ in naming; the defaults cover stock Moodle, Shibboleth and
/// CAS style logins and one SiteMinder-based re-authentication page.
#[derive(Debug, Clone)]
pub struct FieldGlossary {
    /// Substrings (lowercase) that mark an identity input
    pub username_hints: Vec<String>,
    /// Name of the anti-CSRF login token
    pub login_token: String,
    /// Identity field searched for case-insensitively as a last resort
    pub fallback_identity: String,
    /// Substrings (lowercase) that mark a one-time code input
    pub code_hints: Vec<String>,
    /// Substrings (lowercase) of a URL that indicate a 2FA page
    pub challenge_url_hints: Vec<String>,
    /// Identity field name on the re-authentication form
    pub reauth_identity: String,
    /// Secret field name on the re-authentication form
    pub reauth_secret: String,
    /// SAML request parameter name
    pub saml_request: String,
    /// SAML relay state parameter name
    pub relay_state: String,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for FieldGlossary {
    fn default() -> Self {
        Self {
            username_hints: owned(&[
                "username", "user", "j_username", "email", "login", "eid", "uid", "id", "omuid",
            ]),
            login_token: "logintoken".to_string(),
            fallback_identity: "OMUID".to_string(),
            code_hints: owned(&["code", "totp", "otp", "token", "verify", "pin"]),
            challenge_url_hints: owned(&["otp", "totp", "2fa", "verify", "mfa"]),
            reauth_identity: "SM_UID".to_string(),
            reauth_secret: "SM_PWD".to_string(),
            saml_request: "SAMLRequest".to_string(),
            relay_state: "RelayState".to_string(),
        }
    }
}

impl FieldGlossary {
    /// True if a lowercased field key looks like an identity field
    pub fn is_username_like(&self, key_lower: &str) -> bool {
        self.username_hints.iter().any(|h| key_lower.contains(h.as_str()))
    }

    /// True if a lowercased field key looks like a one-time code field
    pub fn is_code_like(&self, key_lower: &str) -> bool {
        self.code_hints.iter().any(|h| key_lower.contains(h.as_str()))
    }
}
