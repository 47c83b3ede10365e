//! Domain layer containing business entities and contracts.
//!
//! This module defines the core data model and the interfaces the rest of the
//! application depends on, independent of any concrete storage backend.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Persistent store trait definitions
//! - [`clock`] - Wall-clock capability used for expiry decisions
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Business logic is encapsulated in services (see [`crate::application::services`])

pub mod clock;
pub mod entities;
pub mod repositories;

pub use clock::{Clock, ManualClock, SystemClock};
