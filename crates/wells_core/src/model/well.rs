//! Well and well type domain records.
//!
//! # Responsibility
//! - Define `WellType` and `Well` with validation at construction.
//! - Provide the current-eligibility predicate used by selection queries.
//!
//! # Invariants
//! - `WellType.title` and `.slug` are non-empty; slugs are lowercase
//!   alphanumerics and hyphens.
//! - A `Well` embeds its type, so the type relation can never be absent.
//! - All timestamps are epoch milliseconds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Stable identifier for a well type.
pub type WellTypeId = Uuid;

/// Stable identifier for a well.
pub type WellId = Uuid;

/// Returns the current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Shape errors detected before any persistence is attempted.
///
/// Time-window nonsense (e.g. already-expired wells) is deliberately NOT a
/// validation error: editorial tooling creates such rows and selection
/// simply never returns them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WellValidationError {
    EmptyTitle,
    InvalidSlug(String),
}

impl Display for WellValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "well type title cannot be empty"),
            Self::InvalidSlug(value) => write!(
                f,
                "well type slug `{value}` is invalid; expected lowercase alphanumerics and hyphens"
            ),
        }
    }
}

impl Error for WellValidationError {}

/// Category a well instances, addressable by unique title or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellType {
    /// Stable id.
    pub uuid: WellTypeId,
    /// Unique display string.
    pub title: String,
    /// Unique URL-safe identifier.
    pub slug: String,
}

impl WellType {
    /// Creates a well type with a generated stable id.
    pub fn new(
        title: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<Self, WellValidationError> {
        Self::with_id(Uuid::new_v4(), title, slug)
    }

    /// Creates a well type with a caller-provided stable id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        uuid: WellTypeId,
        title: impl Into<String>,
        slug: impl Into<String>,
    ) -> Result<Self, WellValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(WellValidationError::EmptyTitle);
        }
        let slug = slug.into();
        if !SLUG_RE.is_match(&slug) {
            return Err(WellValidationError::InvalidSlug(slug));
        }
        Ok(Self { uuid, title, slug })
    }
}

impl Display for WellType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Named, time-windowed container of ordered content references.
///
/// The type relation is required by construction; there is no way to build
/// a well without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Well {
    /// Stable id.
    pub uuid: WellId,
    /// Owning category. Serialized as `type` to match external naming.
    #[serde(rename = "type")]
    pub well_type: WellType,
    /// Publish timestamp, epoch ms. Defaults to creation time.
    pub pub_date: i64,
    /// Optional expiry timestamp, epoch ms.
    pub expires: Option<i64>,
    /// Inactive wells are never selected as current.
    pub active: bool,
}

impl Well {
    /// Creates a well publishing now, active, never expiring.
    pub fn new(well_type: WellType) -> Self {
        Self::with_id(Uuid::new_v4(), well_type)
    }

    /// Creates a well with a caller-provided stable id.
    pub fn with_id(uuid: WellId, well_type: WellType) -> Self {
        Self {
            uuid,
            well_type,
            pub_date: now_epoch_ms(),
            expires: None,
            active: true,
        }
    }

    /// Derived display title: the owning type's title.
    pub fn title(&self) -> &str {
        self.well_type.title.as_str()
    }

    /// Current-eligibility predicate at timestamp `now_ms`.
    ///
    /// A well is current when it is active, already published and either
    /// never expires or expires strictly after `now_ms`. Mirrored exactly
    /// by the repository SQL.
    pub fn is_current_at(&self, now_ms: i64) -> bool {
        self.active
            && self.pub_date <= now_ms
            && self.expires.map_or(true, |expires| expires > now_ms)
    }
}

impl Display for Well {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} - ", self.title(), self.pub_date)?;
        match self.expires {
            Some(expires) => write!(f, "{expires})"),
            None => write!(f, "Never)"),
        }
    }
}
