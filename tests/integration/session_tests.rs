//! Request pacing tests

use moodle_reminder::config::HttpConfig;
use moodle_reminder::session::build_http_client;
use moodle_reminder::{ReminderError, Session};
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DELAY: Duration = Duration::from_millis(200);

fn paced_session() -> Session {
    let client = build_http_client(&HttpConfig::default()).unwrap();
    Session::with_client(client, DELAY)
}

#[tokio::test]
async fn test_every_request_is_followed_by_the_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .mount(&server)
        .await;

    let session = paced_session();
    let root = Url::parse(&format!("{}/", server.uri())).unwrap();

    let started = Instant::now();
    session.get(&root).await.unwrap();
    session.get(&root).await.unwrap();

    assert!(started.elapsed() >= DELAY * 2);
    assert_eq!(session.request_count(), 2);
}

#[tokio::test]
async fn test_failed_request_is_still_paced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let session = paced_session();
    let down = Url::parse(&format!("{}/down", server.uri())).unwrap();

    let started = Instant::now();
    let err = session.get(&down).await.unwrap_err();
    assert!(matches!(err, ReminderError::HttpStatus { status: 500, .. }));
    let err = session.get(&down).await.unwrap_err();
    assert!(err.is_transport());

    assert!(started.elapsed() >= DELAY * 2);
}

#[tokio::test]
async fn test_access_interval_comes_from_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login/index.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>ok</p>"))
        .mount(&server)
        .await;

    let config = HttpConfig {
        access_interval: 1,
        ..HttpConfig::default()
    };
    let session = Session::new(&config).unwrap();
    let target = Url::parse(&format!("{}/login/index.php", server.uri())).unwrap();

    let started = Instant::now();
    session
        .post_form(&target, &[("a".to_string(), "1".to_string())])
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(1));
}
