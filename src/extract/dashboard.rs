//! Dashboard extractor
//!
//! The dashboard mixes timeline, upcoming-events and course blocks whose
//! markup varies by theme, so every link to an assignment is taken and its
//! surroundings are searched for a deadline and a course.

use crate::assignment::Assignment;
use crate::dom::{self, selector};
use crate::extract::calendar::link_title;
use crate::extract::course_map::{CourseMap, SITE_COURSE_ID};
use crate::extract::dates::{parse_date, parse_timestamp};
use crate::url::resolve_link;
use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use url::Url;

/// Personal dashboard, relative to the portal root
pub const DASHBOARD_PATH: &str = "my/";

static ASSIGN_VIEW_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mod/assign/view\.php").expect("invalid regex: ASSIGN_VIEW_LINK"));
static DATE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"date|time|due|deadline").expect("invalid regex: DATE_CLASS")
});
static DATE_TIME_SHAPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}[-/年]\d{1,2}[-/月]\d{1,2}[^\d]*\d{1,2}:\d{2}")
        .expect("invalid regex: DATE_TIME_SHAPED")
});
static COURSE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"course=(\d+)").expect("invalid regex: COURSE_PARAM"));

const PARENT_TAGS: &[&str] = &["li", "div", "tr", "td"];
const COURSE_ID_ATTRS: &[&str] = &["data-courseid", "data-course-id"];

/// Extracts assignments from a parsed dashboard page
///
/// Each resolved URL is reported once, at its first link.
pub fn parse_dashboard(document: &Html, base: &Url) -> Vec<Assignment> {
    let courses = CourseMap::from_document(document);
    let mut found: Vec<Assignment> = Vec::new();

    for link in document.select(&selector("a[href]")) {
        let href = dom::attr(link, "href");
        if !ASSIGN_VIEW_LINK.is_match(href) {
            continue;
        }
        let Some(url) = resolve_link(href, base) else {
            continue;
        };
        if found.iter().any(|a| a.url() == url.as_str()) {
            continue;
        }

        let parent = dom::ancestors(link).find(|e| dom::is_one_of(*e, PARENT_TAGS));
        let (due, course) = match parent {
            Some(parent) => (parent_due_date(parent), course_near(parent, &courses)),
            None => (None, String::new()),
        };

        found.push(Assignment::new(link_title(link), due, course, url.as_str()));
    }

    tracing::debug!(
        "Dashboard: {} assignments, {} courses mapped",
        found.len(),
        courses.len()
    );
    found
}

fn parent_due_date(parent: ElementRef) -> Option<NaiveDateTime> {
    let from_class = dom::descendants(parent)
        .find(|e| dom::class_matches(*e, &DATE_CLASS))
        .and_then(|e| parse_date(&dom::raw_text(e)));
    if from_class.is_some() {
        return from_class;
    }

    let text = dom::raw_text(parent);
    let from_text = DATE_TIME_SHAPED
        .find_iter(&text)
        .find_map(|m| parse_date(m.as_str()));
    if from_text.is_some() {
        return from_text;
    }

    parent
        .select(&selector("a[data-timestamp]"))
        .next()
        .and_then(|a| parse_timestamp(dom::attr(a, "data-timestamp")))
}

/// Course of the block around an assignment link
///
/// Each ancestor is checked for a course-id attribute, then for a
/// `course=<id>` link inside it.
fn course_near(parent: ElementRef, courses: &CourseMap) -> String {
    let course_links = selector("a[href]");

    for ancestor in dom::ancestors(parent) {
        let id = COURSE_ID_ATTRS
            .iter()
            .find_map(|name| ancestor.value().attr(name));
        if let Some(name) = id
            .filter(|id| *id != SITE_COURSE_ID)
            .and_then(|id| courses.get(id))
        {
            return name.to_string();
        }

        let linked = ancestor
            .select(&course_links)
            .filter_map(|a| COURSE_PARAM.captures(dom::attr(a, "href")))
            .find_map(|caps| caps.get(1).and_then(|id| courses.get(id.as_str())));
        if let Some(name) = linked {
            return name.to_string();
        }
    }

    String::new()
}
