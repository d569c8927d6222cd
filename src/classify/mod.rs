//! Page classifier
//!
//! Pure functions that look at a parsed page and decide what kind of step in
//! the login flow it is, extracting whatever form metadata the next step
//! needs. Nothing here touches the network.
//!
//! Classification is an ordered list of detectors ([`DETECTORS`]); the first
//! one that recognizes the page wins. Each detector can be exercised on its
//! own.

mod challenge;
mod form;
mod gateway;
mod glossary;
mod login;

pub use challenge::{build_code_payload, challenge_form, find_code_field, is_challenge_page};
pub use form::{find_input_value, forms, set_field, FormInfo, InputField};
pub use gateway::{build_reauth_payload, is_reauth_form, is_saml_redirect, is_sso_gateway};
pub use glossary::FieldGlossary;
pub use login::{
    bind_login_fields, find_login_form, find_login_link, is_login_anchor, looks_like_login_form,
    select_login_form, FieldBindings, LoginForm, LOGIN_FORM_RULES,
};

use crate::dom::{self, selector};
use scraper::Html;
use std::fmt;
use url::Url;

/// What kind of page the portal served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// Authenticated landing page (offers a way to log out)
    HomePage,
    /// Page carrying a username/password form
    LoginForm,
    /// Page without a form but with a link to the login page
    LoginLink,
    /// Hidden-only form forwarding to an authentication server
    SsoGateway,
    /// GET form handing a SAML assertion back to the portal
    SamlRedirect,
    /// Page asking for a one-time code
    TwoFactorChallenge,
    /// Secondary login asking for identity plus a one-time code
    TwoFactorReauth,
    /// Nothing recognized
    Unclassified,
}

impl PageKind {
    /// Pages the post-login follow loop acts on
    pub fn is_hand_off(&self) -> bool {
        matches!(
            self,
            Self::SsoGateway | Self::SamlRedirect | Self::TwoFactorReauth
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HomePage => "home_page",
            Self::LoginForm => "login_form",
            Self::LoginLink => "login_link",
            Self::SsoGateway => "sso_gateway",
            Self::SamlRedirect => "saml_redirect",
            Self::TwoFactorChallenge => "two_factor_challenge",
            Self::TwoFactorReauth => "two_factor_reauth",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of classifying one page
///
/// Produced fresh for every fetched page; never reused for another one.
#[derive(Debug, Clone)]
pub struct PageClassification {
    pub kind: PageKind,
    /// The form the next step submits, if the kind has one
    pub form: Option<FormInfo>,
    /// Field roles within `form`
    pub bindings: FieldBindings,
    /// Target of a login link
    pub link: Option<Url>,
}

impl PageClassification {
    fn of(kind: PageKind) -> Self {
        Self {
            kind,
            form: None,
            bindings: FieldBindings::default(),
            link: None,
        }
    }

    fn with_form(kind: PageKind, form: FormInfo) -> Self {
        Self {
            form: Some(form),
            ..Self::of(kind)
        }
    }
}

/// A page detector: returns a classification when it recognizes the page
pub type Detector = fn(&Html, &Url, &FieldGlossary) -> Option<PageClassification>;

/// Detectors in priority order
///
/// Re-authentication comes first because those pages can also look like
/// gateways; SAML hand-offs come before gateways for the same reason.
pub const DETECTORS: &[(PageKind, Detector)] = &[
    (PageKind::TwoFactorReauth, detect_reauth),
    (PageKind::SamlRedirect, detect_saml_redirect),
    (PageKind::SsoGateway, detect_sso_gateway),
    (PageKind::LoginForm, detect_login_form),
    (PageKind::TwoFactorChallenge, detect_challenge),
    (PageKind::HomePage, detect_home_page),
    (PageKind::LoginLink, detect_login_link),
];

/// Classifies a page by running [`DETECTORS`] in order
pub fn classify(document: &Html, page_url: &Url, glossary: &FieldGlossary) -> PageClassification {
    DETECTORS
        .iter()
        .find_map(|(_, detect)| detect(document, page_url, glossary))
        .unwrap_or_else(|| PageClassification::of(PageKind::Unclassified))
}

fn first_form_where(
    document: &Html,
    glossary: &FieldGlossary,
    predicate: fn(&FormInfo, &FieldGlossary) -> bool,
) -> Option<FormInfo> {
    forms(document).into_iter().find(|f| predicate(f, glossary))
}

pub fn detect_reauth(document: &Html, _: &Url, g: &FieldGlossary) -> Option<PageClassification> {
    let form = first_form_where(document, g, is_reauth_form)?;
    let mut found = PageClassification::with_form(PageKind::TwoFactorReauth, form);
    found.bindings.username = Some(g.reauth_identity.clone());
    found.bindings.code = Some(g.reauth_secret.clone());
    Some(found)
}

pub fn detect_saml_redirect(
    document: &Html,
    _: &Url,
    g: &FieldGlossary,
) -> Option<PageClassification> {
    first_form_where(document, g, is_saml_redirect)
        .map(|f| PageClassification::with_form(PageKind::SamlRedirect, f))
}

pub fn detect_sso_gateway(
    document: &Html,
    _: &Url,
    g: &FieldGlossary,
) -> Option<PageClassification> {
    first_form_where(document, g, is_sso_gateway)
        .map(|f| PageClassification::with_form(PageKind::SsoGateway, f))
}

pub fn detect_login_form(
    document: &Html,
    _: &Url,
    g: &FieldGlossary,
) -> Option<PageClassification> {
    let login = find_login_form(document, g)?;
    let mut found = PageClassification::with_form(PageKind::LoginForm, login.form);
    found.bindings = login.bindings;
    Some(found)
}

pub fn detect_challenge(
    document: &Html,
    page_url: &Url,
    g: &FieldGlossary,
) -> Option<PageClassification> {
    if !is_challenge_page(page_url, document, g) {
        return None;
    }

    let code_field = find_code_field(document, g);
    let form = code_field
        .as_deref()
        .and_then(|field| challenge_form(&forms(document), field));

    let mut found = PageClassification::of(PageKind::TwoFactorChallenge);
    found.form = form;
    found.bindings.code = code_field;
    Some(found)
}

/// Logged-in Moodle pages always carry a logout link
pub fn detect_home_page(
    document: &Html,
    _: &Url,
    _: &FieldGlossary,
) -> Option<PageClassification> {
    document
        .select(&selector("a[href]"))
        .any(|a| dom::attr(a, "href").contains("logout.php"))
        .then(|| PageClassification::of(PageKind::HomePage))
}

pub fn detect_login_link(
    document: &Html,
    page_url: &Url,
    _: &FieldGlossary,
) -> Option<PageClassification> {
    let link = find_login_link(document, page_url)?;
    let mut found = PageClassification::of(PageKind::LoginLink);
    found.link = Some(link);
    Some(found)
}
