//! Login form and login link heuristics
//!
//! Both searches are ordered rule lists: each rule is tried against the whole
//! page before the next, looser rule is consulted.

use crate::classify::form::{find_input_value, set_field, FormInfo};
use crate::classify::glossary::FieldGlossary;
use crate::dom::{self, selector};
use crate::url::{is_navigable_href, resolve_link};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use url::Url;

static LOGIN_REGION_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)login|user|menu|nav|header").expect("invalid regex: login region class")
});

/// Tokens in an href that mark a login link
const LOGIN_HREF_TOKENS: &[&str] = &["login", "signin", "auth"];

/// Tokens in visible text, labels or image alts that mark a login link
const LOGIN_TEXT_TOKENS: &[&str] = &["login", "log in", "ログイン", "サインイン", "sign in"];

/// A named predicate over a form
pub type FormRule = (&'static str, fn(&FormInfo, &FieldGlossary) -> bool);

/// Login form rules, strictest first
pub const LOGIN_FORM_RULES: &[FormRule] = &[
    ("login-id-or-class", has_login_id_or_class),
    ("login-action", has_login_action),
    ("login-shape", looks_like_login_form),
    ("any-password", has_any_password),
    ("fallback-identity", has_fallback_identity),
];

fn has_login_id_or_class(form: &FormInfo, _: &FieldGlossary) -> bool {
    let contains = |v: &Option<String>| {
        v.as_deref()
            .map(|s| s.to_lowercase().contains("login"))
            .unwrap_or(false)
    };
    contains(&form.id) || contains(&form.class)
}

fn has_login_action(form: &FormInfo, _: &FieldGlossary) -> bool {
    form.action_str().to_lowercase().contains("login")
}

/// Password input plus something to identify the account with
///
/// The identity may be a username-like input, the login token, or any
/// free-text input at all.
pub fn looks_like_login_form(form: &FormInfo, glossary: &FieldGlossary) -> bool {
    if !form.has_password() {
        return false;
    }

    let has_user = form
        .inputs
        .iter()
        .any(|i| glossary.is_username_like(&i.key_lower()));
    let has_token = form.has_input_named(&glossary.login_token);
    let has_text = form.inputs.iter().any(|i| i.is_free_text());

    has_user || has_token || has_text
}

fn has_any_password(form: &FormInfo, _: &FieldGlossary) -> bool {
    form.has_password()
}

fn has_fallback_identity(form: &FormInfo, glossary: &FieldGlossary) -> bool {
    form.named_inputs()
        .any(|(n, _)| n.eq_ignore_ascii_case(&glossary.fallback_identity))
}

/// Picks the login form among `forms`
///
/// Returns the name of the rule that matched along with the form.
pub fn select_login_form<'f>(
    forms: &'f [FormInfo],
    glossary: &FieldGlossary,
) -> Option<(&'static str, &'f FormInfo)> {
    LOGIN_FORM_RULES.iter().find_map(|(rule, predicate)| {
        forms
            .iter()
            .find(|f| predicate(f, glossary))
            .map(|f| (*rule, f))
    })
}

/// Field names bound to the roles a submission needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBindings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub code: Option<String>,
}

/// Binds the identity, secret and token fields of a login form
///
/// Hidden inputs are never bound (they are replayed as-is). The last
/// username-like input wins; when none exists, the first free-text input is
/// used instead.
pub fn bind_login_fields(form: &FormInfo, glossary: &FieldGlossary) -> FieldBindings {
    let mut bindings = FieldBindings::default();
    let mut first_text: Option<String> = None;

    for (name, input) in form.named_inputs() {
        if input.is_hidden() {
            if name == glossary.login_token {
                bindings.token = Some(name.to_string());
            }
        } else if input.is_password() {
            bindings.password = Some(name.to_string());
        } else if name == glossary.login_token {
            bindings.token = Some(name.to_string());
        } else if glossary.is_username_like(&name.to_lowercase()) {
            bindings.username = Some(name.to_string());
        } else if input.is_free_text() && first_text.is_none() {
            first_text = Some(name.to_string());
        }
    }

    if bindings.username.is_none() {
        bindings.username = first_text;
    }

    bindings
}

/// A located login form ready to be filled in
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub form: FormInfo,
    pub bindings: FieldBindings,
    /// Value of the page's login token, wherever on the page it sits
    pub token_value: Option<String>,
    /// Rule that selected the form
    pub rule: &'static str,
}

impl LoginForm {
    /// Builds the credential submission
    ///
    /// Hidden inputs are copied verbatim, the bound identity and secret fields
    /// are filled in, and the login token is guaranteed to be present when the
    /// page supplied one.
    pub fn build_payload(
        &self,
        glossary: &FieldGlossary,
        username: &str,
        password: &str,
    ) -> Vec<(String, String)> {
        let mut payload = self.form.hidden_payload();
        let token = self.token_value.as_deref().unwrap_or("");

        if let Some(field) = &self.bindings.token {
            if !self.form.inputs.iter().any(|i| i.is_hidden() && i.name.as_deref() == Some(field)) {
                set_field(&mut payload, field, token);
            }
        }
        if let Some(field) = &self.bindings.username {
            set_field(&mut payload, field, username);
        }
        if let Some(field) = &self.bindings.password {
            set_field(&mut payload, field, password);
        }
        if !token.is_empty() && !payload.iter().any(|(n, _)| *n == glossary.login_token) {
            payload.push((glossary.login_token.clone(), token.to_string()));
        }

        payload
    }
}

/// Finds the login form on a page, if any
pub fn find_login_form(document: &Html, glossary: &FieldGlossary) -> Option<LoginForm> {
    let forms = crate::classify::form::forms(document);
    let (rule, form) = select_login_form(&forms, glossary)?;

    Some(LoginForm {
        form: form.clone(),
        bindings: bind_login_fields(form, glossary),
        token_value: find_input_value(document, &glossary.login_token).filter(|v| !v.is_empty()),
        rule,
    })
}

/// Regions searched for a login link, most specific first
type LinkRegion = for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>;

const LOGIN_LINK_REGIONS: &[(&str, LinkRegion)] = &[
    ("header-nav", header_and_nav),
    ("login-class", login_classed_elements),
    ("anywhere", whole_document),
];

fn header_and_nav(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&selector("header, nav")).take(5).collect()
}

fn login_classed_elements(document: &Html) -> Vec<ElementRef<'_>> {
    dom::all_elements(document)
        .filter(|e| dom::class_matches(*e, &LOGIN_REGION_CLASS))
        .collect()
}

fn whole_document(document: &Html) -> Vec<ElementRef<'_>> {
    vec![document.root_element()]
}

/// True if an anchor looks like it leads to a login page
pub fn is_login_anchor(anchor: ElementRef) -> bool {
    let href = dom::attr(anchor, "href").trim();
    if !is_navigable_href(href) {
        return false;
    }

    let href_lower = href.to_lowercase();
    if LOGIN_HREF_TOKENS.iter().any(|t| href_lower.contains(t)) {
        return true;
    }

    let text = dom::stripped_text(anchor);
    let label = anchor
        .value()
        .attr("aria-label")
        .or_else(|| anchor.value().attr("title"))
        .unwrap_or("")
        .trim()
        .to_string();
    let alt = anchor
        .select(&selector("img"))
        .next()
        .map(|img| {
            img.value()
                .attr("alt")
                .or_else(|| img.value().attr("title"))
                .unwrap_or("")
                .trim()
                .to_string()
        })
        .unwrap_or_default();

    let combined = format!("{} {} {}", text, label, alt).to_lowercase();
    LOGIN_TEXT_TOKENS.iter().any(|t| combined.contains(t))
}

/// Finds a link to the login page
///
/// Header and navigation regions are searched first, then elements whose
/// class suggests a user or login menu, then the whole page.
pub fn find_login_link(document: &Html, page_url: &Url) -> Option<Url> {
    let anchors = selector("a[href]");

    for (region_name, region) in LOGIN_LINK_REGIONS {
        for container in region(document) {
            if let Some(anchor) = container.select(&anchors).find(|a| is_login_anchor(*a)) {
                let url = resolve_link(dom::attr(anchor, "href"), page_url);
                if url.is_some() {
                    tracing::debug!("Login link found in region '{}'", region_name);
                    return url;
                }
            }
        }
    }

    None
}
