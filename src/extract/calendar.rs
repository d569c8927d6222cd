//! Upcoming-events calendar extractor

use crate::assignment::Assignment;
use crate::dom::{self, selector};
use crate::extract::course_map::{CourseMap, SITE_COURSE_ID};
use crate::extract::dates::{parse_date, parse_timestamp};
use crate::url::resolve_link;
use chrono::NaiveDateTime;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use url::Url;

/// Calendar view listing upcoming events, relative to the portal root
pub const CALENDAR_PATH: &str = "calendar/view.php?view=upcoming";

static EVENT_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)event").expect("invalid regex: EVENT_CLASS"));
static ASSIGN_DATA_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)assign|assignment").expect("invalid regex: ASSIGN_DATA_TYPE")
});
static ROW_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)event|calendar").expect("invalid regex: ROW_CLASS"));
static ASSIGN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"mod/assign|assign/view\.php").expect("invalid regex: ASSIGN_LINK")
});
static DUE_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d{4}[-/年]\d|due|締切|期限").expect("invalid regex: DUE_CELL")
});
static DATE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"date|time|due").expect("invalid regex: DATE_CLASS"));
static DATE_SHAPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\d年/\-月日:\s]+").expect("invalid regex: DATE_SHAPED"));

/// Where event containers are looked for, in order of preference
type ContainerSource = for<'a> fn(&'a Html) -> Vec<ElementRef<'a>>;

const CONTAINER_SOURCES: &[(&str, ContainerSource)] = &[
    ("event-class", event_classed),
    ("assign-data-type", assign_typed_blocks),
];

fn event_classed(document: &Html) -> Vec<ElementRef<'_>> {
    dom::all_elements(document)
        .filter(|e| dom::class_matches(*e, &EVENT_CLASS))
        .collect()
}

fn assign_typed_blocks(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .select(&selector("div[data-type]"))
        .filter(|e| ASSIGN_DATA_TYPE.is_match(dom::attr(*e, "data-type")))
        .collect()
}

/// Extracts assignments from a parsed calendar page
///
/// Links are resolved against `base` (the portal root). Events that do not
/// point at an assignment are skipped; fields that cannot be resolved are
/// left empty rather than dropping the event.
pub fn parse_calendar(document: &Html, base: &Url) -> Vec<Assignment> {
    let courses = CourseMap::from_document(document);

    let Some((source, containers)) = CONTAINER_SOURCES
        .iter()
        .map(|(name, find)| (*name, find(document)))
        .find(|(_, found)| !found.is_empty())
    else {
        tracing::debug!("No event containers on calendar page, trying table rows");
        return parse_calendar_table(document, base);
    };

    tracing::debug!(
        "Calendar: {} containers via '{}', {} courses mapped",
        containers.len(),
        source,
        courses.len()
    );

    containers
        .iter()
        .filter_map(|container| parse_event(*container, &containers, base, &courses))
        .collect()
}

fn contains(outer: ElementRef, inner: ElementRef) -> bool {
    dom::ancestors(inner).any(|a| a.id() == outer.id())
}

/// Builds the assignment for one container
///
/// A container whose link sits inside another, nested container is left to
/// that inner one, so wrappers like `eventlist` never report an event twice.
fn parse_event(
    container: ElementRef,
    all: &[ElementRef],
    base: &Url,
    courses: &CourseMap,
) -> Option<Assignment> {
    let link = dom::descendants(container)
        .filter(|e| e.value().name() == "a")
        .find(|a| ASSIGN_LINK.is_match(dom::attr(*a, "href")))?;

    let shadowed = all.iter().any(|inner| {
        inner.id() != container.id() && contains(container, *inner) && contains(*inner, link)
    });
    if shadowed {
        return None;
    }

    let url = resolve_link(dom::attr(link, "href"), base)?;
    if !url.as_str().contains("mod/assign") {
        return None;
    }

    Some(Assignment::new(
        link_title(link),
        event_due_date(container),
        course_from_ancestors(container, courses),
        url.as_str(),
    ))
}

/// The link's title attribute, else its text
pub(crate) fn link_title(link: ElementRef) -> String {
    match link.value().attr("title").map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => dom::stripped_text(link),
    }
}

fn event_due_date(container: ElementRef) -> Option<NaiveDateTime> {
    let from_class = dom::descendants(container)
        .find(|e| dom::class_matches(*e, &DATE_CLASS))
        .and_then(|e| parse_date(&dom::raw_text(e)));
    if from_class.is_some() {
        return from_class;
    }

    let from_day = dom::ancestors(container)
        .find(|e| dom::is_one_of(*e, &["td", "div"]) && e.value().attr("data-day-timestamp").is_some())
        .and_then(|day| parse_timestamp(dom::attr(day, "data-day-timestamp")));
    if from_day.is_some() {
        return from_day;
    }

    let text = dom::raw_text(container);
    DATE_SHAPED
        .find_iter(&text)
        .find_map(|m| parse_date(m.as_str()))
}

fn course_from_ancestors(container: ElementRef, courses: &CourseMap) -> String {
    dom::ancestors(container)
        .filter_map(|e| e.value().attr("data-courseid"))
        .filter(|id| *id != SITE_COURSE_ID)
        .find_map(|id| courses.get(id))
        .unwrap_or("")
        .to_string()
}

/// Table-layout calendars: one assignment per event row
fn parse_calendar_table(document: &Html, base: &Url) -> Vec<Assignment> {
    let cell = selector("td, th");
    let anchor = selector("a[href]");

    document
        .select(&selector("tr"))
        .filter(|row| dom::class_matches(*row, &ROW_CLASS))
        .filter_map(|row| {
            let cells: Vec<ElementRef> = row.select(&cell).collect();
            if cells.len() < 2 {
                return None;
            }

            let link = row
                .select(&anchor)
                .find(|a| ASSIGN_LINK.is_match(dom::attr(*a, "href")))?;
            let url = resolve_link(dom::attr(link, "href"), base)?;

            let due = cells
                .iter()
                .map(|c| dom::stripped_text(*c))
                .find(|t| DUE_CELL.is_match(t))
                .and_then(|t| parse_date(&t));

            Some(Assignment::new(link_title(link), due, "", url.as_str()))
        })
        .collect()
}
