//! In-process content registry for the polymorphic node slot.
//!
//! # Responsibility
//! - Define the `(kind, id)` reference shape nodes store.
//! - Resolve references through explicitly registered providers.
//!
//! # Invariants
//! - Kinds are registered at most once and validated on registration.
//! - Resolution never fabricates items: an unknown kind or id is an error,
//!   so invalid cross-type links are caught before they are persisted.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

static CONTENT_KIND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("valid content kind regex"));

/// Stable identifier of one externally-defined content object.
pub type ContentId = Uuid;

/// Reference to one content object, as stored on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// Registered content kind, e.g. `story`.
    pub kind: String,
    /// Stable id within that kind.
    pub uuid: ContentId,
}

impl ContentRef {
    pub fn new(kind: impl Into<String>, uuid: ContentId) -> Self {
        Self {
            kind: kind.into(),
            uuid,
        }
    }
}

/// Minimal read model the wells core needs from a content object.
///
/// Deduplication in merged views compares `uuid` only; `title` exists for
/// labeling and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable id of the underlying object.
    pub uuid: ContentId,
    /// Registered kind the object belongs to.
    pub kind: String,
    /// Display title.
    pub title: String,
}

impl ContentItem {
    pub fn new(uuid: ContentId, kind: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid,
            kind: kind.into(),
            title: title.into(),
        }
    }
}

/// Content registration/resolution errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRegistryError {
    InvalidKind(String),
    DuplicateKind(String),
    KindNotRegistered(String),
    ObjectNotFound { kind: String, uuid: ContentId },
}

impl Display for ContentRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKind(value) => write!(f, "content kind is invalid: {value}"),
            Self::DuplicateKind(value) => write!(f, "content kind already registered: {value}"),
            Self::KindNotRegistered(value) => write!(f, "content kind not registered: {value}"),
            Self::ObjectNotFound { kind, uuid } => {
                write!(f, "content object not found: {kind}/{uuid}")
            }
        }
    }
}

impl Error for ContentRegistryError {}

/// Adapter trait for one externally-owned content collection.
pub trait ContentProvider {
    /// Registered kind handled by this provider.
    fn kind(&self) -> &str;
    /// Loads one item by stable id.
    fn get(&self, uuid: ContentId) -> Option<ContentItem>;
    /// Lists all items of this kind in a deterministic order.
    fn list(&self) -> Vec<ContentItem>;
}

/// Runtime registry of content providers, keyed by kind.
#[derive(Default)]
pub struct ContentRegistry {
    providers: BTreeMap<String, Arc<dyn ContentProvider>>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one content provider.
    pub fn register(
        &mut self,
        provider: Arc<dyn ContentProvider>,
    ) -> Result<(), ContentRegistryError> {
        let kind = provider.kind().trim().to_string();
        if !CONTENT_KIND_RE.is_match(&kind) {
            return Err(ContentRegistryError::InvalidKind(kind));
        }
        if self.providers.contains_key(kind.as_str()) {
            return Err(ContentRegistryError::DuplicateKind(kind));
        }

        self.providers.insert(kind, provider);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns sorted registered kinds.
    pub fn kinds(&self) -> Vec<String> {
        self.providers.keys().cloned().collect()
    }

    /// Returns one provider by kind.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn ContentProvider>> {
        self.providers.get(kind.trim()).cloned()
    }

    /// Resolves one reference to its content item.
    pub fn resolve(&self, content: &ContentRef) -> Result<ContentItem, ContentRegistryError> {
        let provider = self
            .get(content.kind.as_str())
            .ok_or_else(|| ContentRegistryError::KindNotRegistered(content.kind.clone()))?;
        provider
            .get(content.uuid)
            .ok_or(ContentRegistryError::ObjectNotFound {
                kind: content.kind.clone(),
                uuid: content.uuid,
            })
    }

    /// Lists all items of one registered kind.
    pub fn list(&self, kind: &str) -> Result<Vec<ContentItem>, ContentRegistryError> {
        let provider = self
            .get(kind)
            .ok_or_else(|| ContentRegistryError::KindNotRegistered(kind.to_string()))?;
        Ok(provider.list())
    }
}

/// Fixed in-memory content provider.
///
/// Useful for fixtures and deployments whose content set is known up front.
/// `list()` returns items in insertion order.
pub struct StaticContentProvider {
    kind: String,
    order: Vec<ContentId>,
    items: BTreeMap<ContentId, ContentItem>,
}

impl StaticContentProvider {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            order: Vec::new(),
            items: BTreeMap::new(),
        }
    }

    /// Adds one item, replacing any previous item with the same id.
    pub fn insert(&mut self, item: ContentItem) {
        if !self.items.contains_key(&item.uuid) {
            self.order.push(item.uuid);
        }
        self.items.insert(item.uuid, item);
    }

    pub fn with_items(kind: impl Into<String>, items: Vec<ContentItem>) -> Self {
        let mut provider = Self::new(kind);
        for item in items {
            provider.insert(item);
        }
        provider
    }
}

impl ContentProvider for StaticContentProvider {
    fn kind(&self) -> &str {
        self.kind.as_str()
    }

    fn get(&self, uuid: ContentId) -> Option<ContentItem> {
        self.items.get(&uuid).cloned()
    }

    fn list(&self) -> Vec<ContentItem> {
        self.order
            .iter()
            .filter_map(|uuid| self.items.get(uuid).cloned())
            .collect()
    }
}
