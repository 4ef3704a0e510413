//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for wells and nodes.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate relation targets before SQL mutations.
//! - Repository APIs return semantic errors (`NotFound`, `UnknownWell`,
//!   `UnknownWellType`) in addition to DB transport errors.

pub mod node_repo;
pub mod well_repo;
