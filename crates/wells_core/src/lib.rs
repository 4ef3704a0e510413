//! Core domain logic for typed content wells.
//! This crate is the single source of truth for selection and ordering invariants.

pub mod content;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use content::{
    ContentId, ContentItem, ContentProvider, ContentRef, ContentRegistry, ContentRegistryError,
    StaticContentProvider,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::merged::{MergedItems, MergedViewError};
pub use model::node::{Node, NodeId};
pub use model::well::{now_epoch_ms, Well, WellId, WellType, WellTypeId, WellValidationError};
pub use repo::node_repo::{NodeRepoError, NodeRepoResult, NodeRepository, SqliteNodeRepository};
pub use repo::well_repo::{
    CurrentQuery, CurrentWells, SqliteWellRepository, WellRepoError, WellRepoResult,
    WellRepository,
};
pub use service::well_service::{WellService, WellServiceError, WellView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
