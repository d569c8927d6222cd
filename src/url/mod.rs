//! URL handling module for Moodle Reminder
//!
//! This module provides href resolution against the page that hosted it,
//! portal endpoint construction, and the query-stripping normalization used
//! as the assignment deduplication key.

mod normalize;
mod resolve;

// Re-export main functions
pub use normalize::{portal_endpoint, strip_query, trim_base_url};
pub use resolve::{is_navigable_href, resolve_link};
