//! Parent repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Parent names are non-blank; they are not required to be unique.
//! - A parent that still owns entities cannot be deleted.

use crate::db::ensure_connection_ready;
use crate::model::entity::{normalize_name, Parent, ParentId};
use crate::model::relation::Table;
use crate::repo::cascade::{delete_row, DeleteReport};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const PARENT_SELECT_SQL: &str = "SELECT uuid, name, created_at, updated_at FROM parents";

/// Repository interface for parent records.
pub trait ParentRepository {
    fn create_parent(&self, name: &str) -> RepoResult<Parent>;
    fn get_parent(&self, id: ParentId) -> RepoResult<Option<Parent>>;
    /// Lists parents ordered by `created_at ASC, uuid ASC`.
    fn list_parents(&self) -> RepoResult<Vec<Parent>>;
    fn delete_parent(&self, id: ParentId) -> RepoResult<DeleteReport>;
}

/// SQLite-backed parent repository.
pub struct SqliteParentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteParentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["parents"])?;
        Ok(Self { conn })
    }
}

impl ParentRepository for SqliteParentRepository<'_> {
    fn create_parent(&self, name: &str) -> RepoResult<Parent> {
        let name = normalize_name(name)?;
        let uuid = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO parents (uuid, name) VALUES (?1, ?2);",
            params![uuid.to_string(), name],
        )?;
        load_parent(self.conn, uuid)?.ok_or(RepoError::NotFound {
            table: Table::Parents,
            id: uuid,
        })
    }

    fn get_parent(&self, id: ParentId) -> RepoResult<Option<Parent>> {
        load_parent(self.conn, id)
    }

    fn list_parents(&self) -> RepoResult<Vec<Parent>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PARENT_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut parents = Vec::new();
        while let Some(row) = rows.next()? {
            parents.push(parse_parent_row(row)?);
        }
        Ok(parents)
    }

    fn delete_parent(&self, id: ParentId) -> RepoResult<DeleteReport> {
        delete_row(self.conn, Table::Parents, id)
    }
}

fn load_parent(conn: &Connection, id: ParentId) -> RepoResult<Option<Parent>> {
    let mut stmt = conn.prepare(&format!("{PARENT_SELECT_SQL} WHERE uuid = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_parent_row(row)?));
    }
    Ok(None)
}

fn parse_parent_row(row: &Row<'_>) -> RepoResult<Parent> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Parent {
        uuid: parse_uuid(&uuid_text, "parents.uuid")?,
        name: row.get("name")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
