//! Assignment extraction from the calendar and the dashboard
//!
//! Parsing is split from fetching: `parse_*` functions work on an already
//! parsed page and never touch the network, `fetch_*` functions request the
//! page over a signed-in session first.

mod calendar;
mod coordinator;
mod course_map;
mod dashboard;
mod dates;

pub use calendar::{parse_calendar, CALENDAR_PATH};
pub use coordinator::{
    extract_all, fetch_assignments, fetch_calendar, fetch_dashboard, ExtractionOutcome,
};
pub use course_map::{CourseMap, ALL_COURSES_LABELS, SITE_COURSE_ID};
pub use dashboard::{parse_dashboard, DASHBOARD_PATH};
pub use dates::{parse_date, parse_timestamp, DATE_FORMATS};
