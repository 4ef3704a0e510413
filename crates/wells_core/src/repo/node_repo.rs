//! Node repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist node membership rows and list them in well order.
//! - Validate the well relation target before any insert.
//!
//! # Invariants
//! - Listing is deterministic: `sort_order ASC`, ties in insertion order
//!   (`rowid ASC`).
//! - A node is never persisted against a well that does not exist.

use crate::content::ContentRef;
use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::node::{Node, NodeId};
use crate::model::well::WellId;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NODE_SELECT_SQL: &str = "SELECT
    uuid,
    well_uuid,
    content_kind,
    content_uuid,
    sort_order
 FROM nodes";

/// Result type used by node repository operations.
pub type NodeRepoResult<T> = Result<T, NodeRepoError>;

/// Errors from node repository operations.
#[derive(Debug)]
pub enum NodeRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Referenced well is not persisted.
    UnknownWell(WellId),
    /// Target node does not exist.
    NotFound(NodeId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for NodeRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownWell(id) => write!(f, "well not found: {id}"),
            Self::NotFound(id) => write!(f, "node not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "node repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted node data: {message}"),
        }
    }
}

impl Error for NodeRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for NodeRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for NodeRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for node persistence.
pub trait NodeRepository {
    /// Persists one node; its well must already be persisted.
    fn create_node(&self, node: &Node) -> NodeRepoResult<NodeId>;
    /// Loads one node by id.
    fn get_node(&self, node_uuid: NodeId) -> NodeRepoResult<Option<Node>>;
    /// Lists a well's nodes in well order.
    fn list_nodes(&self, well_uuid: WellId) -> NodeRepoResult<Vec<Node>>;
    /// Counts a well's nodes.
    fn count_nodes(&self, well_uuid: WellId) -> NodeRepoResult<u64>;
}

/// SQLite-backed node repository.
#[derive(Debug)]
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> NodeRepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(NodeRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl NodeRepository for SqliteNodeRepository<'_> {
    fn create_node(&self, node: &Node) -> NodeRepoResult<NodeId> {
        let well_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM wells WHERE uuid = ?1);",
            [node.well_uuid.to_string()],
            |row| row.get(0),
        )?;
        if well_exists == 0 {
            return Err(NodeRepoError::UnknownWell(node.well_uuid));
        }

        self.conn.execute(
            "INSERT INTO nodes (uuid, well_uuid, content_kind, content_uuid, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                node.uuid.to_string(),
                node.well_uuid.to_string(),
                node.content.kind.as_str(),
                node.content.uuid.to_string(),
                node.sort_order,
            ],
        )?;

        Ok(node.uuid)
    }

    fn get_node(&self, node_uuid: NodeId) -> NodeRepoResult<Option<Node>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NODE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([node_uuid.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_node_row(row)?));
        }
        Ok(None)
    }

    fn list_nodes(&self, well_uuid: WellId) -> NodeRepoResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NODE_SELECT_SQL}
             WHERE well_uuid = ?1
             ORDER BY sort_order ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([well_uuid.to_string()])?;
        let mut nodes = Vec::new();

        while let Some(row) = rows.next()? {
            nodes.push(parse_node_row(row)?);
        }

        Ok(nodes)
    }

    fn count_nodes(&self, well_uuid: WellId) -> NodeRepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM nodes WHERE well_uuid = ?1;",
            [well_uuid.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn parse_node_row(row: &Row<'_>) -> NodeRepoResult<Node> {
    let uuid = parse_uuid_column(row, "uuid")?;
    let well_uuid = parse_uuid_column(row, "well_uuid")?;
    let content_uuid = parse_uuid_column(row, "content_uuid")?;
    let content_kind: String = row.get("content_kind")?;

    Ok(Node {
        uuid,
        well_uuid,
        content: ContentRef::new(content_kind, content_uuid),
        sort_order: row.get("sort_order")?,
    })
}

fn parse_uuid_column(row: &Row<'_>, column: &'static str) -> NodeRepoResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text).map_err(|_| {
        NodeRepoError::InvalidData(format!("invalid uuid value `{text}` in nodes.{column}"))
    })
}
