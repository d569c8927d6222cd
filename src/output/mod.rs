//! Output module for rendering reminder text
//!
//! This module handles:
//! - Formatting single assignments and whole reminder messages
//! - Splitting long messages for push endpoints with a length cap
//!
//! Delivering the text is left to the caller.

mod reminder;

pub use reminder::{
    absolute_url, format_assignment, format_reminder_message, split_message, NOTHING_DUE,
    PREVIEW_CHARS, PUSH_TEXT_LIMIT,
};
