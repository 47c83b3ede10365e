//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`UrlRecord`] - A persisted short code mapping
//! - [`NewUrlRecord`] - Input for creating a record before the store assigns its id

pub mod url_record;

pub use url_record::{NewUrlRecord, UrlRecord};
