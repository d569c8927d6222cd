//! Shared fixtures for the mock-portal tests

use moodle_reminder::config::{Config, HttpConfig, PortalConfig, ReminderConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "s1234567";
pub const PASSWORD: &str = "hunter2";

/// RFC 6238 test seed ("12345678901234567890")
pub const TOTP_SEED: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

/// A Moodle-style login form with a login token
pub const LOGIN_FORM: &str = r#"
    <form id="login" class="loginform" action="/login/index.php" method="post">
      <input type="hidden" name="logintoken" value="tok123">
      <input type="text" name="username" id="username">
      <input type="password" name="password" id="password">
      <button type="submit" id="loginbtn">Log in</button>
    </form>"#;

/// A signed-in page
pub const DASHBOARD: &str = r#"
    <nav><a href="/user/profile.php">Profile</a>
    <a href="/login/logout.php?sesskey=abc">Log out</a></nav>
    <h2>Dashboard</h2>"#;

/// Creates a configuration pointing at the mock server, with pacing off
pub fn test_config(server: &MockServer, totp_secret: Option<&str>) -> Config {
    Config {
        portal: PortalConfig {
            base_url: server.uri(),
            username: USERNAME.to_string(),
            password: PASSWORD.to_string(),
            totp_secret: totp_secret.map(str::to_string),
        },
        http: HttpConfig {
            access_interval: 0,
            request_timeout: 60,
            user_agent: "MoodleReminderTest/1.0".to_string(),
        },
        reminder: ReminderConfig::default(),
    }
}

/// An HTML page response
pub fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><head><title>Portal</title></head><body>{}</body></html>", body))
        .insert_header("content-type", "text/html; charset=utf-8")
}

/// A 303 redirect, as Moodle sends after a form POST
pub fn see_other(location: &str) -> ResponseTemplate {
    ResponseTemplate::new(303).insert_header("location", location)
}

pub async fn mount_get(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn mount_post(server: &MockServer, at: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(at))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Bodies of every POST the server received at `at`, in order
pub async fn posted_bodies(server: &MockServer, at: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.to_string() == "POST" && r.url.path() == at)
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

/// Number of GET requests the server received at `at`
pub async fn get_count(server: &MockServer, at: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.to_string() == "GET" && r.url.path() == at)
        .count()
}

/// Splits a url-encoded body into pairs (values are left encoded)
pub fn form_pairs(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|p| !p.is_empty())
        .map(|p| match p.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (p.to_string(), String::new()),
        })
        .collect()
}
