//! ep-core: stable foundation for elplan.
//!
//! Contains:
//! - ids (string-backed identifiers for symbols, rooms, boards, circuits, ...)
//! - protection (protective-device roles, requirements, grouping hints)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod protection;

// Re-exports: nice ergonomics for downstream crates
pub use error::{EpError, EpResult};
pub use ids::*;
pub use protection::*;
