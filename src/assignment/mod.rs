//! Assignment records and the merge step
//!
//! An [`Assignment`] is built once by an extractor and never changed; later
//! stages only filter and reorder lists of them.

mod merge;

pub use merge::{dedup_key, merge_assignments};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Title used when a link carries neither a title attribute nor text
pub const UNTITLED: &str = "(untitled)";

static LESSON_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*(\d+)\s*回").expect("invalid regex: LESSON_PATTERN"));

/// One pending assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    title: String,
    due_date: Option<NaiveDateTime>,
    course_name: String,
    url: String,
    description_preview: String,
}

impl Assignment {
    /// Creates a record; a blank title becomes [`UNTITLED`]
    pub fn new(
        title: impl Into<String>,
        due_date: Option<NaiveDateTime>,
        course_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title.trim().to_string()
        };

        Self {
            title,
            due_date,
            course_name: course_name.into(),
            url: url.into(),
            description_preview: String::new(),
        }
    }

    pub fn with_description(mut self, preview: impl Into<String>) -> Self {
        self.description_preview = preview.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn due_date(&self) -> Option<NaiveDateTime> {
        self.due_date
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn description_preview(&self) -> &str {
        &self.description_preview
    }

    /// True if the due day lies in `today..=today + days`
    ///
    /// Undated assignments are never due.
    pub fn is_due_within_days(&self, days: u32, today: NaiveDate) -> bool {
        let Some(due) = self.due_date else {
            return false;
        };
        let end = today + Duration::days(i64::from(days));
        (today..=end).contains(&due.date())
    }

    /// The `第N回` lesson marker in the title, or an empty string
    pub fn lesson_number(&self) -> &str {
        LESSON_PATTERN
            .find(&self.title)
            .map(|m| m.as_str())
            .unwrap_or("")
    }
}

/// Keeps the assignments due within `days` of `today`, in order
pub fn filter_due_within(assignments: &[Assignment], days: u32, today: NaiveDate) -> Vec<Assignment> {
    assignments
        .iter()
        .filter(|a| a.is_due_within_days(days, today))
        .cloned()
        .collect()
}
