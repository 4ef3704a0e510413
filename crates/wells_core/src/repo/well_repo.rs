//! Well repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for well types and wells.
//! - Own the current-well selection policy (`get_current` family).
//!
//! # Invariants
//! - Selection SQL mirrors `Well::is_current_at` exactly: active, already
//!   published, not yet expired at the caller-supplied snapshot.
//! - Bulk selection is keyed by title; a title with no eligible well is
//!   absent from the result, never an error.
//! - Ties on maximal `pub_date` break on greatest well uuid.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::well::{Well, WellId, WellType, WellTypeId, WellValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const WELL_SELECT_SQL: &str = "SELECT
    w.uuid AS well_uuid,
    w.pub_date AS pub_date,
    w.expires AS expires,
    w.active AS active,
    t.uuid AS type_uuid,
    t.title AS type_title,
    t.slug AS type_slug
 FROM wells w
 JOIN well_types t ON t.uuid = w.type_uuid";

/// Result type used by well repository operations.
pub type WellRepoResult<T> = Result<T, WellRepoError>;

/// Errors from well repository operations.
#[derive(Debug)]
pub enum WellRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Record shape rejected before persistence.
    Validation(WellValidationError),
    /// No eligible well exists for the described selector. Also raised
    /// when no selector is supplied at all (historical contract).
    NotFound(String),
    /// Referenced well type is not persisted.
    UnknownWellType(WellTypeId),
    /// Unique title already taken.
    DuplicateTitle(String),
    /// Unique slug already taken.
    DuplicateSlug(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for WellRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(selector) => write!(f, "no current well: {selector}"),
            Self::UnknownWellType(id) => write!(f, "well type not found: {id}"),
            Self::DuplicateTitle(title) => write!(f, "well type title already taken: {title}"),
            Self::DuplicateSlug(slug) => write!(f, "well type slug already taken: {slug}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "well repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted well data: {message}"),
        }
    }
}

impl Error for WellRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for WellRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for WellRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<WellValidationError> for WellRepoError {
    fn from(value: WellValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Selector options for the compatibility `get_current` entry point.
///
/// Exactly one selector is expected; precedence when several are set is
/// `titles`, then `title`, then `slug`, matching the historical surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentQuery {
    /// Bulk selection keyed by type title.
    pub titles: Vec<String>,
    /// Single selection by type title.
    pub title: Option<String>,
    /// Single selection by type slug.
    pub slug: Option<String>,
}

/// Result shape of the compatibility `get_current` entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrentWells {
    /// Single-title or single-slug selection.
    Single(Well),
    /// Bulk selection; titles with no eligible well are absent.
    ByTitle(BTreeMap<String, Well>),
}

/// Repository interface for well type and well persistence plus selection.
pub trait WellRepository {
    /// Persists one well type.
    fn create_well_type(&self, well_type: &WellType) -> WellRepoResult<WellTypeId>;
    /// Loads one well type by slug.
    fn get_well_type_by_slug(&self, slug: &str) -> WellRepoResult<Option<WellType>>;
    /// Persists one well; its type must already be persisted.
    fn create_well(&self, well: &Well) -> WellRepoResult<WellId>;
    /// Loads one well by id.
    fn get_well(&self, well_uuid: WellId) -> WellRepoResult<Option<Well>>;
    /// Selects the current well for one type title at snapshot `now_ms`.
    fn get_current_by_title(&self, title: &str, now_ms: i64) -> WellRepoResult<Well>;
    /// Selects the current well for one type slug at snapshot `now_ms`.
    fn get_current_by_slug(&self, slug: &str, now_ms: i64) -> WellRepoResult<Well>;
    /// Selects the current well for each title independently.
    fn get_current_by_titles(
        &self,
        titles: &[String],
        now_ms: i64,
    ) -> WellRepoResult<BTreeMap<String, Well>>;
    /// Compatibility dispatcher over `CurrentQuery`.
    fn get_current(&self, query: &CurrentQuery, now_ms: i64) -> WellRepoResult<CurrentWells>;
}

/// SQLite-backed well repository.
#[derive(Debug)]
pub struct SqliteWellRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWellRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> WellRepoResult<Self> {
        ensure_wells_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WellRepository for SqliteWellRepository<'_> {
    fn create_well_type(&self, well_type: &WellType) -> WellRepoResult<WellTypeId> {
        if column_value_exists(self.conn, "title", &well_type.title)? {
            return Err(WellRepoError::DuplicateTitle(well_type.title.clone()));
        }
        if column_value_exists(self.conn, "slug", &well_type.slug)? {
            return Err(WellRepoError::DuplicateSlug(well_type.slug.clone()));
        }

        self.conn.execute(
            "INSERT INTO well_types (uuid, title, slug) VALUES (?1, ?2, ?3);",
            params![
                well_type.uuid.to_string(),
                well_type.title.as_str(),
                well_type.slug.as_str(),
            ],
        )?;

        Ok(well_type.uuid)
    }

    fn get_well_type_by_slug(&self, slug: &str) -> WellRepoResult<Option<WellType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, title, slug FROM well_types WHERE slug = ?1;")?;
        let mut rows = stmt.query([slug])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_well_type_columns(
                row.get::<_, String>("uuid")?,
                row.get("title")?,
                row.get("slug")?,
            )?));
        }
        Ok(None)
    }

    fn create_well(&self, well: &Well) -> WellRepoResult<WellId> {
        let type_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM well_types WHERE uuid = ?1);",
            [well.well_type.uuid.to_string()],
            |row| row.get(0),
        )?;
        if type_exists == 0 {
            return Err(WellRepoError::UnknownWellType(well.well_type.uuid));
        }

        self.conn.execute(
            "INSERT INTO wells (uuid, type_uuid, pub_date, expires, active)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                well.uuid.to_string(),
                well.well_type.uuid.to_string(),
                well.pub_date,
                well.expires,
                bool_to_int(well.active),
            ],
        )?;

        Ok(well.uuid)
    }

    fn get_well(&self, well_uuid: WellId) -> WellRepoResult<Option<Well>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WELL_SELECT_SQL} WHERE w.uuid = ?1;"))?;
        let mut rows = stmt.query([well_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_well_row(row)?));
        }
        Ok(None)
    }

    fn get_current_by_title(&self, title: &str, now_ms: i64) -> WellRepoResult<Well> {
        self.get_current_single("t.title", title, now_ms)
            .and_then(|well| {
                well.ok_or_else(|| WellRepoError::NotFound(format!("title `{title}`")))
            })
    }

    fn get_current_by_slug(&self, slug: &str, now_ms: i64) -> WellRepoResult<Well> {
        self.get_current_single("t.slug", slug, now_ms)
            .and_then(|well| well.ok_or_else(|| WellRepoError::NotFound(format!("slug `{slug}`"))))
    }

    fn get_current_by_titles(
        &self,
        titles: &[String],
        now_ms: i64,
    ) -> WellRepoResult<BTreeMap<String, Well>> {
        if titles.is_empty() {
            return Ok(BTreeMap::new());
        }

        let placeholders = vec!["?"; titles.len()].join(", ");
        let sql = format!(
            "{WELL_SELECT_SQL}
             WHERE t.title IN ({placeholders})
               AND w.active = 1
               AND w.pub_date <= ?
               AND (w.expires IS NULL OR w.expires > ?)
             ORDER BY t.title ASC, w.pub_date DESC, w.uuid DESC;"
        );

        let mut bind_values: Vec<Value> = titles
            .iter()
            .map(|title| Value::Text(title.clone()))
            .collect();
        bind_values.push(Value::Integer(now_ms));
        bind_values.push(Value::Integer(now_ms));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut current: BTreeMap<String, Well> = BTreeMap::new();

        while let Some(row) = rows.next()? {
            let well = parse_well_row(row)?;
            // Rows arrive best-first per title; only the first row for a
            // title wins and later rows must never overwrite it.
            current
                .entry(well.well_type.title.clone())
                .or_insert(well);
        }

        Ok(current)
    }

    fn get_current(&self, query: &CurrentQuery, now_ms: i64) -> WellRepoResult<CurrentWells> {
        if !query.titles.is_empty() {
            return Ok(CurrentWells::ByTitle(
                self.get_current_by_titles(&query.titles, now_ms)?,
            ));
        }
        if let Some(title) = query.title.as_deref() {
            return Ok(CurrentWells::Single(
                self.get_current_by_title(title, now_ms)?,
            ));
        }
        if let Some(slug) = query.slug.as_deref() {
            return Ok(CurrentWells::Single(
                self.get_current_by_slug(slug, now_ms)?,
            ));
        }
        // Historical contract: an empty query is a not-found condition,
        // not an invalid-argument one.
        Err(WellRepoError::NotFound("no selector supplied".to_string()))
    }
}

impl SqliteWellRepository<'_> {
    fn get_current_single(
        &self,
        column: &str,
        value: &str,
        now_ms: i64,
    ) -> WellRepoResult<Option<Well>> {
        let sql = format!(
            "{WELL_SELECT_SQL}
             WHERE {column} = ?1
               AND w.active = 1
               AND w.pub_date <= ?2
               AND (w.expires IS NULL OR w.expires > ?2)
             ORDER BY w.pub_date DESC, w.uuid DESC
             LIMIT 1;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![value, now_ms])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_well_row(row)?));
        }
        Ok(None)
    }
}

fn ensure_wells_connection_ready(conn: &Connection) -> WellRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(WellRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn column_value_exists(conn: &Connection, column: &str, value: &str) -> WellRepoResult<bool> {
    let exists: i64 = conn.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM well_types WHERE {column} = ?1);"),
        [value],
        |row| row.get(0),
    )?;
    Ok(exists != 0)
}

fn parse_well_row(row: &Row<'_>) -> WellRepoResult<Well> {
    let well_type = parse_well_type_columns(
        row.get::<_, String>("type_uuid")?,
        row.get("type_title")?,
        row.get("type_slug")?,
    )?;

    let uuid_text: String = row.get("well_uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        WellRepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in wells.uuid"))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(WellRepoError::InvalidData(format!(
                "invalid active value `{other}` in wells.active"
            )));
        }
    };

    Ok(Well {
        uuid,
        well_type,
        pub_date: row.get("pub_date")?,
        expires: row.get("expires")?,
        active,
    })
}

fn parse_well_type_columns(
    uuid_text: String,
    title: String,
    slug: String,
) -> WellRepoResult<WellType> {
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        WellRepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in well_types.uuid"
        ))
    })?;
    WellType::with_id(uuid, title, slug).map_err(|err| {
        WellRepoError::InvalidData(format!("invalid persisted well type: {err}"))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
