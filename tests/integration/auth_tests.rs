//! Login flow tests: every path from portal root to a settled session

use crate::support::*;
use moodle_reminder::auth::{AuthState, Authenticator, SSO_FOLLOW_LIMIT};
use moodle_reminder::{ReminderError, Session};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_direct_login_form_on_home_page() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).expect("Failed to build session");
    let mut auth = Authenticator::new(&session, &config.portal);

    let page = auth.authenticate().await.expect("Login should succeed");

    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(page.url.path(), "/my/");

    let bodies = posted_bodies(&server, "/login/index.php").await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(
        form_pairs(&bodies[0]),
        vec![
            ("logintoken".to_string(), "tok123".to_string()),
            ("username".to_string(), USERNAME.to_string()),
            ("password".to_string(), PASSWORD.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_login_link_is_followed() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html(r#"<header><nav><a href="/login/index.php">ログイン</a></nav></header><p>Welcome</p>"#),
    )
    .await;
    mount_get(&server, "/login/index.php", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    auth.authenticate().await.expect("Login should succeed");

    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(get_count(&server, "/login/index.php").await, 1);
    assert_eq!(posted_bodies(&server, "/login/index.php").await.len(), 1);
}

#[tokio::test]
async fn test_login_endpoint_used_when_home_has_nothing() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html("<p>Welcome to the portal</p>")).await;
    mount_get(&server, "/login/index.php", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    auth.authenticate().await.expect("Login should succeed");
    assert_eq!(get_count(&server, "/login/index.php").await, 1);
}

#[tokio::test]
async fn test_pre_login_gateway_replays_hidden_payload() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html(
            r#"<p>Redirecting to the sign-in service</p>
               <form method="post" action="/idp/sso/forward">
                 <input type="hidden" name="entityID" value="sp-01">
                 <input type="hidden" name="target" value="cookie-abc">
                 <noscript><input type="submit" value="Continue"></noscript>
               </form>"#,
        ),
    )
    .await;
    mount_post(&server, "/idp/sso/forward", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    auth.authenticate().await.expect("Login should succeed");

    let forwarded = posted_bodies(&server, "/idp/sso/forward").await;
    assert_eq!(forwarded, vec!["entityID=sp-01&target=cookie-abc".to_string()]);
}

#[tokio::test]
async fn test_post_login_gateway_replays_hidden_payload() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(
        &server,
        "/login/index.php",
        html(
            r#"<body onload="document.forms[0].submit()">
               <form method="post" action="/auth/saml/proxy">
                 <input type="hidden" name="SAMLResponse" value="PHNhbWxwOlJlc3BvbnNlPg">
                 <input type="hidden" name="RelayState" value="ss-mem-1">
               </form>"#,
        ),
    )
    .await;
    mount_post(&server, "/auth/saml/proxy", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let page = auth.authenticate().await.expect("Login should succeed");
    assert_eq!(page.url.path(), "/my/");

    let forwarded = posted_bodies(&server, "/auth/saml/proxy").await;
    assert_eq!(
        forwarded,
        vec!["SAMLResponse=PHNhbWxwOlJlc3BvbnNlPg&RelayState=ss-mem-1".to_string()]
    );
}

#[tokio::test]
async fn test_saml_redirect_followed_with_get() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(
        &server,
        "/login/index.php",
        html(
            r#"<form method="get" action="/SamlIdP/AuthnRequestReceiver">
                 <input type="hidden" name="SAMLRequest" value="req-1">
                 <input type="hidden" name="RelayState" value="rs-1">
               </form>"#,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/SamlIdP/AuthnRequestReceiver"))
        .and(query_param("SAMLRequest", "req-1"))
        .and(query_param("RelayState", "rs-1"))
        .respond_with(see_other("/my/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let page = auth.authenticate().await.expect("Login should succeed");
    assert_eq!(page.url.path(), "/my/");
    assert!(posted_bodies(&server, "/SamlIdP/AuthnRequestReceiver")
        .await
        .is_empty());
}

/// Mounts a portal whose login is followed by a one-time-code page
async fn mount_two_factor_portal(server: &MockServer, code_accepted: bool) {
    let challenge = r#"<form method="post" action="/auth/mfa/verify">
          <input type="hidden" name="state" value="st-9">
          <input type="text" name="otp" autocomplete="one-time-code">
          <button type="submit">Verify</button>
        </form>"#;

    mount_get(server, "/", html(LOGIN_FORM)).await;
    mount_post(server, "/login/index.php", see_other("/auth/mfa/verify")).await;
    mount_get(server, "/auth/mfa/verify", html(challenge)).await;
    if code_accepted {
        mount_post(server, "/auth/mfa/verify", see_other("/my/")).await;
    } else {
        mount_post(server, "/auth/mfa/verify", html(challenge)).await;
    }
    mount_get(server, "/my/", html(DASHBOARD)).await;
}

#[tokio::test]
async fn test_two_factor_code_submitted() {
    let server = MockServer::start().await;
    mount_two_factor_portal(&server, true).await;

    let config = test_config(&server, Some(TOTP_SEED));
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let page = auth.authenticate().await.expect("Login should succeed");
    assert_eq!(page.url.path(), "/my/");
    assert_eq!(auth.state(), AuthState::Authenticated);

    let bodies = posted_bodies(&server, "/auth/mfa/verify").await;
    assert_eq!(bodies.len(), 1);
    let pairs = form_pairs(&bodies[0]);
    assert_eq!(pairs[0], ("state".to_string(), "st-9".to_string()));
    assert_eq!(pairs[1].0, "otp");
    assert_eq!(pairs[1].1.len(), 6);
    assert!(pairs[1].1.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn test_two_factor_without_secret_is_distinct_failure() {
    let server = MockServer::start().await;
    mount_two_factor_portal(&server, true).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(err, ReminderError::TwoFactorRequired));
    assert_eq!(auth.state(), AuthState::Failed);
    assert!(posted_bodies(&server, "/auth/mfa/verify").await.is_empty());
}

#[tokio::test]
async fn test_two_factor_rejected_when_challenge_persists() {
    let server = MockServer::start().await;
    mount_two_factor_portal(&server, false).await;

    let config = test_config(&server, Some(TOTP_SEED));
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(err, ReminderError::TwoFactorRejected { .. }));
    assert_eq!(auth.state(), AuthState::Failed);
}

#[tokio::test]
async fn test_credentials_rejected() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(
        &server,
        "/login/index.php",
        html(&format!(r#"<div class="alert">Invalid login, please try again</div>{}"#, LOGIN_FORM)),
    )
    .await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(err, ReminderError::CredentialsRejected { .. }));
    assert_eq!(auth.state(), AuthState::Failed);
}

#[tokio::test]
async fn test_no_login_form_anywhere() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html("<p>Maintenance</p>")).await;
    mount_get(&server, "/login/index.php", html("<p>Maintenance</p>")).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(err, ReminderError::FormNotFound { .. }));
    assert_eq!(get_count(&server, "/login/index.php").await, 1);
}

#[tokio::test]
async fn test_login_endpoint_tried_after_dead_end_gateway() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html(r#"<form method="post" action="/auth/gw"><input type="hidden" name="ticket" value="T"></form>"#),
    )
    .await;
    mount_post(&server, "/auth/gw", html("<p>Nothing here</p>")).await;
    mount_get(&server, "/login/index.php", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    auth.authenticate().await.unwrap();
    assert_eq!(auth.state(), AuthState::Authenticated);
    assert_eq!(posted_bodies(&server, "/auth/gw").await, vec!["ticket=T".to_string()]);
    assert_eq!(get_count(&server, "/login/index.php").await, 1);
    assert_eq!(posted_bodies(&server, "/login/index.php").await.len(), 1);
}

#[tokio::test]
async fn test_dead_end_gateway_and_endpoint_is_form_not_found() {
    let server = MockServer::start().await;

    mount_get(
        &server,
        "/",
        html(r#"<form method="post" action="/auth/gw"><input type="hidden" name="ticket" value="T"></form>"#),
    )
    .await;
    mount_post(&server, "/auth/gw", html("<p>Nothing here</p>")).await;
    mount_get(&server, "/login/index.php", ResponseTemplate::new(404)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(err, ReminderError::FormNotFound { .. }));
    assert_eq!(get_count(&server, "/login/index.php").await, 1);
}

#[tokio::test]
async fn test_unreachable_root_is_fatal() {
    let server = MockServer::start().await;
    mount_get(&server, "/", ResponseTemplate::new(503)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, ReminderError::HttpStatus { status: 503, .. }));
    assert_eq!(session.request_count(), 1);
}

#[tokio::test]
async fn test_endless_gateway_chain_is_bounded() {
    let server = MockServer::start().await;
    let gateway = r#"<form method="post" action="/auth/loop">
          <input type="hidden" name="hop" value="again">
        </form>"#;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", html(gateway)).await;
    mount_post(&server, "/auth/loop", html(gateway)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);

    let err = auth.authenticate().await.unwrap_err();
    assert!(matches!(
        err,
        ReminderError::GatewayLoopExhausted { limit, .. } if limit == SSO_FOLLOW_LIMIT
    ));
    assert_eq!(posted_bodies(&server, "/auth/loop").await.len(), SSO_FOLLOW_LIMIT);
    assert_eq!(auth.state(), AuthState::Failed);
}
