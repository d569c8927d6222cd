//! The login state machine
//!
//! [`Authenticator`] drives one login attempt from the portal root to an
//! authenticated session. Each stage fetches a page, classifies it and
//! decides the next request; parsed documents never outlive the stage that
//! parsed them.

use crate::auth::{follow_sso_chain, AuthState, Totp};
use crate::classify::{
    build_code_payload, detect_challenge, find_login_form, find_login_link, forms, is_sso_gateway,
    FieldGlossary, FormInfo, LoginForm,
};
use crate::config::PortalConfig;
use crate::session::{Page, Session};
use crate::url::portal_endpoint;
use crate::{ReminderError, Result};
use url::Url;

/// Maximum hidden-only gateways followed while looking for the login form
pub const PRE_LOGIN_GATEWAY_LIMIT: usize = 5;

/// Conventional Moodle login endpoint, used when nothing better is found
const LOGIN_ENDPOINT: &str = "login/index.php";

/// What a page offers on the way to the login form
#[derive(Debug, Default)]
struct LoginProbe {
    login: Option<LoginForm>,
    link: Option<Url>,
    gateway: Option<FormInfo>,
}

impl LoginProbe {
    fn inspect(page: &Page, glossary: &FieldGlossary) -> Self {
        let document = page.document();
        let login = find_login_form(&document, glossary);
        let link = match login {
            Some(_) => None,
            None => find_login_link(&document, &page.url),
        };
        let gateway = forms(&document)
            .into_iter()
            .find(|f| is_sso_gateway(f, glossary));

        Self {
            login,
            link,
            gateway,
        }
    }
}

/// A two-factor challenge found after submitting credentials
#[derive(Debug)]
struct ChallengeProbe {
    code_field: Option<String>,
    form: Option<FormInfo>,
}

impl ChallengeProbe {
    fn inspect(page: &Page, glossary: &FieldGlossary) -> Option<Self> {
        detect_challenge(&page.document(), &page.url, glossary).map(|found| Self {
            code_field: found.bindings.code,
            form: found.form,
        })
    }
}

/// Drives a single login attempt over a shared session
pub struct Authenticator<'a> {
    session: &'a Session,
    portal: &'a PortalConfig,
    glossary: FieldGlossary,
    state: AuthState,
}

impl<'a> Authenticator<'a> {
    pub fn new(session: &'a Session, portal: &'a PortalConfig) -> Self {
        Self {
            session,
            portal,
            glossary: FieldGlossary::default(),
            state: AuthState::Start,
        }
    }

    /// Current state
    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn glossary(&self) -> &FieldGlossary {
        &self.glossary
    }

    /// Runs the whole login flow
    ///
    /// Returns the page the flow settled on. Any error leaves the machine in
    /// [`AuthState::Failed`].
    pub async fn authenticate(&mut self) -> Result<Page> {
        match self.run().await {
            Ok(page) => Ok(page),
            Err(e) => {
                tracing::error!("Authentication failed in state {}: {}", self.state, e);
                if self.state.can_transition_to(AuthState::Failed) {
                    self.state = AuthState::Failed;
                }
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<Page> {
        let home = self.fetch_home().await?;
        let (login_page, login) = self.locate_login_form(home).await?;
        let response = self.submit_credentials(&login_page, &login).await?;
        let landed = self.resolve_two_factor(response).await?;

        self.advance(AuthState::SsoGatewayFollowing)?;
        let settled = follow_sso_chain(self.session, self.portal, &self.glossary, landed).await?;

        self.advance(AuthState::Authenticated)?;
        tracing::info!("Authenticated; session settled at {}", settled.url);
        Ok(settled)
    }

    fn advance(&mut self, next: AuthState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(ReminderError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Auth state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(portal_endpoint(&self.portal.base_url, path)?)
    }

    async fn fetch_home(&mut self) -> Result<Page> {
        let root = self.endpoint("")?;
        tracing::info!("[1/4] Fetching portal root {}", root);

        let home = self.session.get(&root).await?;
        self.advance(AuthState::HomeFetched)?;
        Ok(home)
    }

    /// Finds the login form: on the home page, behind a login link, or at
    /// the conventional endpoint, following hidden-only gateways in between
    ///
    /// The endpoint is tried at most once. When a gateway chain ends without
    /// a form, the endpoint is still fetched before giving up.
    async fn locate_login_form(&mut self, home: Page) -> Result<(Page, LoginForm)> {
        let mut page = home;
        let mut probe = LoginProbe::inspect(&page, &self.glossary);
        let mut endpoint_tried = false;

        if probe.login.is_some() {
            tracing::info!("[2/4] Login form found on the home page");
        } else {
            if let Some(link) = probe.link.take() {
                tracing::info!("[2/4] Following login link {}", link);
                match self.session.get(&link).await {
                    Ok(linked) => {
                        page = linked;
                        probe = LoginProbe::inspect(&page, &self.glossary);
                    }
                    Err(e) => tracing::warn!("Login link {} could not be fetched: {}", link, e),
                }
            }

            if probe.login.is_none() && probe.gateway.is_none() {
                let fallback = self.endpoint(LOGIN_ENDPOINT)?;
                tracing::info!("[2/4] Trying login endpoint {}", fallback);
                page = self.session.get(&fallback).await?;
                probe = LoginProbe::inspect(&page, &self.glossary);
                endpoint_tried = true;
            }
        }

        let mut hops = 0;
        while probe.login.is_none() {
            if hops < PRE_LOGIN_GATEWAY_LIMIT {
                if let Some(gateway) = probe.gateway.take() {
                    hops += 1;
                    let target = gateway.resolve_action(&page.url);
                    tracing::info!("[2/4] Gateway {} before login form, posting to {}", hops, target);
                    page = self.session.post_form(&target, &gateway.hidden_payload()).await?;
                    probe = LoginProbe::inspect(&page, &self.glossary);
                    continue;
                }
            }

            if endpoint_tried {
                break;
            }
            endpoint_tried = true;

            let fallback = self.endpoint(LOGIN_ENDPOINT)?;
            tracing::info!("[2/4] Gateway chain ended without a form, trying {}", fallback);
            match self.session.get(&fallback).await {
                Ok(fetched) => {
                    page = fetched;
                    probe = LoginProbe::inspect(&page, &self.glossary);
                }
                Err(e) => {
                    tracing::warn!("Login endpoint {} could not be fetched: {}", fallback, e);
                    break;
                }
            }
        }

        let login = probe.login.ok_or_else(|| ReminderError::FormNotFound {
            url: page.url.to_string(),
        })?;

        tracing::debug!("Login form selected by rule '{}'", login.rule);
        self.advance(AuthState::LoginPageLocated)?;
        Ok((page, login))
    }

    async fn submit_credentials(&mut self, page: &Page, login: &LoginForm) -> Result<Page> {
        if login.bindings.username.is_none() {
            tracing::warn!("Login form has no recognizable username field");
        }
        if login.bindings.password.is_none() {
            tracing::warn!("Login form has no password field");
        }

        let target = login.form.resolve_action(&page.url);
        let payload =
            login.build_payload(&self.glossary, &self.portal.username, &self.portal.password);
        tracing::info!("[3/4] Submitting credentials to {}", target);

        let response = self.session.post_form(&target, &payload).await?;
        self.advance(AuthState::CredentialsSubmitted)?;
        Ok(response)
    }

    /// Answers a two-factor challenge if one appeared, otherwise checks that
    /// the credentials were accepted
    async fn resolve_two_factor(&mut self, response: Page) -> Result<Page> {
        let Some(challenge) = ChallengeProbe::inspect(&response, &self.glossary) else {
            if self.looks_rejected(&response) {
                return Err(ReminderError::CredentialsRejected {
                    url: response.url.to_string(),
                });
            }
            tracing::info!("[4/4] No two-factor challenge");
            return Ok(response);
        };

        self.advance(AuthState::TwoFactorChallenge)?;
        tracing::info!("[4/4] Two-factor challenge at {}", response.url);

        let secret = self
            .portal
            .totp_secret
            .as_deref()
            .ok_or(ReminderError::TwoFactorRequired)?;

        let (field, form) = match (challenge.code_field, challenge.form) {
            (Some(field), Some(form)) => (field, form),
            _ => {
                return Err(ReminderError::TwoFactorFieldMissing {
                    url: response.url.to_string(),
                })
            }
        };

        let code = Totp::from_base32(secret)?.now()?;
        let target = form.resolve_action(&response.url);
        tracing::info!("[4/4] Submitting one-time code to {}", target);

        let result = self
            .session
            .post_form(&target, &build_code_payload(&form, &field, &code))
            .await?;
        self.advance(AuthState::TwoFactorSubmitted)?;

        if ChallengeProbe::inspect(&result, &self.glossary).is_some() {
            return Err(ReminderError::TwoFactorRejected {
                url: result.url.to_string(),
            });
        }

        Ok(result)
    }

    /// Back on a login URL that still hands out a login token
    fn looks_rejected(&self, page: &Page) -> bool {
        page.url.as_str().to_lowercase().contains("login")
            && page.body.contains(self.glossary.login_token.as_str())
    }
}
