//! Merging extractor output into one deadline-ordered list

use crate::assignment::Assignment;
use crate::url::strip_query;
use std::collections::HashSet;

/// Identity of an assignment across pages: its URL without the query string
pub fn dedup_key(assignment: &Assignment) -> &str {
    strip_query(assignment.url())
}

/// Deduplicates and orders assignments
///
/// The first record for each [`dedup_key`] is kept, whatever the later ones
/// carry. Survivors are stably sorted by due date with undated records last,
/// so equal deadlines keep their input order.
pub fn merge_assignments<I>(assignments: I) -> Vec<Assignment>
where
    I: IntoIterator<Item = Assignment>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged: Vec<Assignment> = assignments
        .into_iter()
        .filter(|a| seen.insert(dedup_key(a).to_string()))
        .collect();

    merged.sort_by_key(|a| (a.due_date().is_none(), a.due_date()));
    merged
}
