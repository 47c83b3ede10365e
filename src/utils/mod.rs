//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Hash-derived short code generation
//! - [`unique_token`] - Per-request uniqueness tokens
//! - [`user_agent`] - Caller identity extraction from HTTP headers

pub mod code_generator;
pub mod unique_token;
pub mod user_agent;
