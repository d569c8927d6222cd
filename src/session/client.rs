use crate::config::HttpConfig;
use crate::session::Page;
use crate::{ReminderError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{redirect::Policy, Client, RequestBuilder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

/// Maximum redirects followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Builds the HTTP client shared by the whole run
///
/// The client keeps cookies between requests, follows redirects (up to 10
/// hops) and applies the configured timeout to every request.
///
/// # Example
///
/// ```
/// use moodle_reminder::config::HttpConfig;
/// use moodle_reminder::session::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ja,en;q=0.9"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(config.request_timeout.min(30)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Cookie-bearing session with request pacing
///
/// Every request, successful or not, is followed by the configured delay so
/// that consecutive requests never hit the portal back to back.
pub struct Session {
    client: Client,
    delay: Duration,
    requests: AtomicUsize,
}

impl Session {
    /// Creates a session from HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = build_http_client(config).map_err(|source| ReminderError::Http {
            url: String::new(),
            source,
        })?;

        Ok(Self::with_client(
            client,
            Duration::from_secs(config.access_interval),
        ))
    }

    /// Wraps an existing client
    pub fn with_client(client: Client, delay: Duration) -> Self {
        Self {
            client,
            delay,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests issued so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// GET a page
    pub async fn get(&self, url: &Url) -> Result<Page> {
        tracing::debug!("GET {}", url);
        self.execute(self.client.get(url.clone()), url).await
    }

    /// GET a page with extra query parameters
    pub async fn get_with_query(&self, url: &Url, params: &[(String, String)]) -> Result<Page> {
        tracing::debug!("GET {} ({} params)", url, params.len());
        self.execute(self.client.get(url.clone()).query(params), url)
            .await
    }

    /// POST url-encoded form fields
    pub async fn post_form(&self, url: &Url, fields: &[(String, String)]) -> Result<Page> {
        tracing::debug!("POST {} ({} fields)", url, fields.len());
        self.execute(self.client.post(url.clone()).form(fields), url)
            .await
    }

    async fn execute(&self, request: RequestBuilder, url: &Url) -> Result<Page> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let result = Self::send(request, url).await;
        self.pace().await;
        result
    }

    async fn send(request: RequestBuilder, url: &Url) -> Result<Page> {
        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(ReminderError::HttpStatus {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&final_url, e))?;

        Ok(Page::new(final_url, body))
    }

    async fn pace(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Maps a reqwest failure onto the transport error family
fn classify_transport_error(url: &Url, error: reqwest::Error) -> ReminderError {
    if error.is_timeout() {
        ReminderError::Timeout {
            url: url.to_string(),
        }
    } else {
        ReminderError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
