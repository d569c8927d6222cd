//! Extraction tests: calendar and dashboard over a signed-in mock portal

use crate::support::*;
use chrono::NaiveDate;
use moodle_reminder::auth::Authenticator;
use moodle_reminder::extract::extract_all;
use moodle_reminder::{fetch_assignments, ReminderError, Session};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CALENDAR: &str = r#"
    <select class="custom-select cal_courses_flt" name="course">
      <option value="1">すべての授業科目</option>
      <option value="42">Linear Algebra</option>
    </select>
    <div class="eventlist">
      <div data-courseid="42">
        <div class="event" data-type="event">
          <h3 class="name">第3回 レポート</h3>
          <a href="/mod/assign/view.php?id=7">第3回 レポート</a>
          <div class="date">2025-02-15 23:59</div>
        </div>
      </div>
      <div class="event">
        <a href="/mod/quiz/view.php?id=8">Quiz 2</a>
        <div class="date">2025-02-14 12:00</div>
      </div>
    </div>"#;

const MY_PAGE: &str = r#"
    <nav><a href="/login/logout.php?sesskey=abc">Log out</a></nav>
    <section class="block_timeline">
      <ul>
        <li><a href="/mod/assign/view.php?id=7&amp;action=view">Report 3</a></li>
        <li><a href="/mod/assign/view.php?id=9">Lab notes</a>
            <span>2025-02-20 10:00</span></li>
      </ul>
    </section>"#;

/// Mounts login plus the calendar; the dashboard is left to each test
async fn mount_signed_in_portal(server: &MockServer) {
    mount_get(server, "/", html(LOGIN_FORM)).await;
    mount_post(server, "/login/index.php", see_other("/my/")).await;

    Mock::given(method("GET"))
        .and(path("/calendar/view.php"))
        .and(query_param("view", "upcoming"))
        .respond_with(html(CALENDAR))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_calendar_record_wins_merge() {
    let server = MockServer::start().await;
    mount_signed_in_portal(&server).await;
    mount_get(
        &server,
        "/my/",
        html(
            r#"<nav><a href="/login/logout.php?sesskey=abc">Log out</a></nav>
               <ul><li><a href="/mod/assign/view.php?id=7&amp;action=view">Report 3</a></li></ul>"#,
        ),
    )
    .await;

    let config = test_config(&server, None);
    let assignments = fetch_assignments(&config).await.expect("Run should succeed");

    assert_eq!(assignments.len(), 1);
    let report = &assignments[0];
    assert_eq!(report.title(), "第3回 レポート");
    assert_eq!(report.course_name(), "Linear Algebra");
    assert_eq!(
        report.due_date(),
        NaiveDate::from_ymd_opt(2025, 2, 15).and_then(|d| d.and_hms_opt(23, 59, 0))
    );
    assert_eq!(report.url(), format!("{}/mod/assign/view.php?id=7", server.uri()));
}

#[tokio::test]
async fn test_query_string_variants_collapse_to_first() {
    let server = MockServer::start().await;
    mount_signed_in_portal(&server).await;
    mount_get(&server, "/my/", html(MY_PAGE)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);
    auth.authenticate().await.expect("Login should succeed");

    let outcome = extract_all(&session, &config.portal, auth.glossary()).await;

    assert_eq!(outcome.calendar_count, 1);
    assert_eq!(outcome.dashboard_count, 2);
    assert!(outcome.partial.is_empty());

    // query strings are dropped for identity, so both dashboard links collapse
    // onto the calendar record
    let titles: Vec<_> = outcome.assignments.iter().map(|a| a.title()).collect();
    assert_eq!(titles, vec!["第3回 レポート"]);
}

#[tokio::test]
async fn test_failed_extractor_does_not_discard_the_other() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/calendar/view.php", ResponseTemplate::new(500)).await;
    mount_get(&server, "/my/", html(MY_PAGE)).await;

    let config = test_config(&server, None);
    let session = Session::new(&config.http).unwrap();
    let mut auth = Authenticator::new(&session, &config.portal);
    auth.authenticate().await.expect("Login should succeed");

    let outcome = extract_all(&session, &config.portal, auth.glossary()).await;

    assert_eq!(outcome.calendar_count, 0);
    assert_eq!(outcome.partial.len(), 1);
    assert!(matches!(
        outcome.partial[0],
        ReminderError::ExtractionPartial { extractor: "calendar", .. }
    ));
    assert_eq!(outcome.assignments.len(), 1);
    assert_eq!(outcome.assignments[0].title(), "Report 3");
}

#[tokio::test]
async fn test_empty_portal_is_not_an_error() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(&server, "/calendar/view.php", html("<p>No upcoming events</p>")).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let assignments = fetch_assignments(&config).await.expect("Run should succeed");
    assert!(assignments.is_empty());
}

#[tokio::test]
async fn test_data_pages_follow_gateways() {
    let server = MockServer::start().await;

    mount_get(&server, "/", html(LOGIN_FORM)).await;
    mount_post(&server, "/login/index.php", see_other("/my/")).await;
    mount_get(
        &server,
        "/calendar/view.php",
        html(
            r#"<form method="post" action="/auth/session/refresh">
                 <input type="hidden" name="ticket" value="t-1">
               </form>"#,
        ),
    )
    .await;
    mount_post(&server, "/auth/session/refresh", html(CALENDAR)).await;
    mount_get(&server, "/my/", html(DASHBOARD)).await;

    let config = test_config(&server, None);
    let assignments = fetch_assignments(&config).await.expect("Run should succeed");

    assert_eq!(assignments.len(), 1);
    assert_eq!(
        posted_bodies(&server, "/auth/session/refresh").await,
        vec!["ticket=t-1".to_string()]
    );
}
