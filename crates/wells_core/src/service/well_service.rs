//! Well use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for editorial/display callers.
//! - Validate content references against the registry before persistence.
//! - Assemble the merged item view a renderer consumes.
//!
//! # Invariants
//! - Service APIs never bypass repository relation checks.
//! - Content refs that do not resolve are rejected at attach time, so an
//!   invalid cross-type link is never persisted.
//! - `current_*` wrappers snapshot the wall clock once per call.

use crate::content::{ContentItem, ContentRef, ContentRegistry, ContentRegistryError};
use crate::model::merged::MergedItems;
use crate::model::node::Node;
use crate::model::well::{now_epoch_ms, Well, WellId, WellType};
use crate::repo::node_repo::{NodeRepoError, NodeRepository};
use crate::repo::well_repo::{CurrentQuery, CurrentWells, WellRepoError, WellRepository};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for well use-cases.
#[derive(Debug)]
pub enum WellServiceError {
    /// Persistence-layer failure from the well repository.
    Repo(WellRepoError),
    /// Persistence-layer failure from the node repository.
    Node(NodeRepoError),
    /// Target well does not exist.
    WellNotFound(WellId),
    /// Content reference does not resolve through the registry.
    BadContentRef(ContentRegistryError),
}

impl Display for WellServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Node(err) => write!(f, "{err}"),
            Self::WellNotFound(id) => write!(f, "well not found: {id}"),
            Self::BadContentRef(err) => write!(f, "content reference rejected: {err}"),
        }
    }
}

impl Error for WellServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Node(err) => Some(err),
            Self::WellNotFound(_) => None,
            Self::BadContentRef(err) => Some(err),
        }
    }
}

impl From<WellRepoError> for WellServiceError {
    fn from(value: WellRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<NodeRepoError> for WellServiceError {
    fn from(value: NodeRepoError) -> Self {
        Self::Node(value)
    }
}

/// Read model a renderer consumes: the well, its ordered nodes and the
/// resolved (optionally merged) item sequence.
#[derive(Debug, Clone)]
pub struct WellView {
    /// The well itself.
    pub well: Well,
    /// Membership rows in well order.
    pub nodes: Vec<Node>,
    items: MergedItems,
}

impl WellView {
    /// Combined item view: node items first, merged extras after.
    pub fn items(&self) -> &MergedItems {
        &self.items
    }

    /// Attaches an external item sequence to this view (request-scoped,
    /// never persisted) and returns the combined view.
    pub fn merge_with(&mut self, extra: impl IntoIterator<Item = ContentItem>) -> &MergedItems {
        self.items.merge_with(extra);
        &self.items
    }
}

/// Service facade over well/node repositories and the content registry.
pub struct WellService<W: WellRepository, N: NodeRepository> {
    wells: W,
    nodes: N,
    registry: ContentRegistry,
}

impl<W: WellRepository, N: NodeRepository> WellService<W, N> {
    /// Creates a service using the provided repositories and registry.
    pub fn new(wells: W, nodes: N, registry: ContentRegistry) -> Self {
        Self {
            wells,
            nodes,
            registry,
        }
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    /// Creates and persists one well type.
    pub fn create_well_type(
        &self,
        title: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<WellType, WellServiceError> {
        let well_type = WellType::new(title, slug).map_err(WellRepoError::from)?;
        self.wells.create_well_type(&well_type)?;
        Ok(well_type)
    }

    /// Persists one well; its type must already be persisted.
    pub fn create_well(&self, well: &Well) -> Result<WellId, WellServiceError> {
        Ok(self.wells.create_well(well)?)
    }

    /// Validates a content reference against the registry and persists a
    /// node for it.
    pub fn attach_content(
        &self,
        well: &Well,
        content: ContentRef,
        sort_order: i64,
    ) -> Result<Node, WellServiceError> {
        self.registry
            .resolve(&content)
            .map_err(WellServiceError::BadContentRef)?;

        let node = Node::new(well.uuid, content, sort_order);
        self.nodes.create_node(&node)?;
        Ok(node)
    }

    /// Loads a well with its ordered nodes and resolved items.
    pub fn view(&self, well_uuid: WellId) -> Result<WellView, WellServiceError> {
        let well = self
            .wells
            .get_well(well_uuid)?
            .ok_or(WellServiceError::WellNotFound(well_uuid))?;
        let nodes = self.nodes.list_nodes(well_uuid)?;

        let mut items = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let item = self
                .registry
                .resolve(&node.content)
                .map_err(WellServiceError::BadContentRef)?;
            items.push(item);
        }

        Ok(WellView {
            well,
            nodes,
            items: MergedItems::new(items),
        })
    }

    /// Selects the current well for one type title, as of now.
    pub fn current_by_title(&self, title: &str) -> Result<Well, WellServiceError> {
        Ok(self.wells.get_current_by_title(title, now_epoch_ms())?)
    }

    /// Selects the current well for one type slug, as of now.
    pub fn current_by_slug(&self, slug: &str) -> Result<Well, WellServiceError> {
        Ok(self.wells.get_current_by_slug(slug, now_epoch_ms())?)
    }

    /// Selects the current well for each title independently, as of now.
    pub fn current_by_titles(
        &self,
        titles: &[String],
    ) -> Result<BTreeMap<String, Well>, WellServiceError> {
        Ok(self.wells.get_current_by_titles(titles, now_epoch_ms())?)
    }

    /// Compatibility dispatcher mirroring the historical selector surface.
    pub fn current(&self, query: &CurrentQuery) -> Result<CurrentWells, WellServiceError> {
        Ok(self.wells.get_current(query, now_epoch_ms())?)
    }
}
