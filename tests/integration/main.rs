//! Integration tests against mock portals
//!
//! Each test mounts a small wiremock portal and drives the real session,
//! state machine and extractors against it.

mod auth_tests;
mod extract_tests;
mod session_tests;
mod support;
