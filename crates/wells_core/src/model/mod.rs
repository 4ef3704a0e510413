//! Domain model for typed, time-windowed content wells.
//!
//! # Responsibility
//! - Define canonical well/node data structures used by core logic.
//! - Keep the current-eligibility predicate in one place.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - A `Well` cannot exist without its `WellType`; a `Node` cannot exist
//!   without its owning well and content reference.

pub mod merged;
pub mod node;
pub mod well;
