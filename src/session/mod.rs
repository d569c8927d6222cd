//! HTTP session for talking to the portal
//!
//! This module owns the single cookie-bearing client used for a whole run:
//! - building the client with the configured timeout and user agent
//! - GET, GET-with-query and form POST requests
//! - mapping transport failures onto the crate's error type
//! - pacing: a fixed pause after every request

mod client;
mod page;

pub use client::{build_http_client, Session};
pub use page::Page;
