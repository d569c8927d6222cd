//! Course id to name lookup built from the calendar's course filter

use crate::dom::{self, selector};
use regex::Regex;
use scraper::Html;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Site-level course id; never a real course
pub const SITE_COURSE_ID: &str = "1";

/// Filter labels meaning "all courses"
pub const ALL_COURSES_LABELS: &[&str] = &["すべての授業科目", "All courses"];

static FILTER_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cal_courses_flt|calendar.*filter").expect("invalid regex: FILTER_CLASS")
});

/// Course names by id, scoped to one fetched page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseMap {
    names: HashMap<String, String>,
}

impl CourseMap {
    /// Reads the first course-filter `<select>` on the page
    ///
    /// Pages without one give an empty map.
    pub fn from_document(document: &Html) -> Self {
        let mut map = Self::default();

        let Some(filter) = document
            .select(&selector("select"))
            .find(|s| dom::class_matches(*s, &FILTER_CLASS))
        else {
            return map;
        };

        for option in filter.select(&selector("option[value]")) {
            let id = dom::attr(option, "value").trim();
            let name = dom::stripped_text(option);
            map.insert(id, &name);
        }

        map
    }

    /// Adds a course unless the id or label is a sentinel
    pub fn insert(&mut self, id: &str, name: &str) {
        if id.is_empty() || id == SITE_COURSE_ID || name.is_empty() {
            return;
        }
        if ALL_COURSES_LABELS.contains(&name) {
            return;
        }
        self.names.insert(id.to_string(), name.to_string());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
