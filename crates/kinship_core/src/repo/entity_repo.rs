//! Entity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, rename, read and delete named entities.
//! - Compute the pass-through grandchild view at call time.
//!
//! # Invariants
//! - `entities.name` is guarded by a `UNIQUE` constraint; a violation is
//!   reported as `ValidationError::NameTaken`, never as a DB error.
//! - A missing parent is reported as `ValidationError::ParentNotFound`.
//! - Deletes follow `plan_delete(Table::Entities)`: references restrict,
//!   children (and their grandchildren) cascade.

use crate::db::{constraint_kind, ensure_connection_ready, ConstraintKind};
use crate::model::entity::{
    normalize_name, Entity, EntityId, Grandchild, ParentId, ValidationError,
};
use crate::model::relation::{resolve, Table};
use crate::repo::cascade::{delete_row, ensure_row_exists, scope_sql, DeleteReport};
use crate::repo::collection_repo::parse_grandchild_row;
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

const ENTITY_SELECT_SQL: &str = "SELECT
    uuid,
    parent_uuid,
    name,
    created_at,
    updated_at
FROM entities";

/// Repository interface for entity records.
pub trait EntityRepository {
    /// Persists a new entity under `parent_uuid`.
    fn create_entity(&self, parent_uuid: ParentId, name: &str) -> RepoResult<Entity>;
    fn get_entity(&self, id: EntityId) -> RepoResult<Option<Entity>>;
    /// Exact, case-sensitive lookup on the normalized name.
    fn find_entity_by_name(&self, name: &str) -> RepoResult<Option<Entity>>;
    /// Lists entities ordered by name, optionally limited to one parent.
    fn list_entities(&self, parent_uuid: Option<ParentId>) -> RepoResult<Vec<Entity>>;
    /// Renames an entity; the entity's own row never counts as a conflict.
    fn rename_entity(&self, id: EntityId, name: &str) -> RepoResult<Entity>;
    /// Deletes an entity with its children and grandchildren, or nothing.
    fn delete_entity(&self, id: EntityId) -> RepoResult<DeleteReport>;
    /// Every grandchild reachable through the entity's children.
    fn list_grandchildren(&self, id: EntityId) -> RepoResult<Vec<Grandchild>>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEntityRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["parents", "entities", "children", "grandchildren", "entity_refs"],
        )?;
        Ok(Self { conn })
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn create_entity(&self, parent_uuid: ParentId, name: &str) -> RepoResult<Entity> {
        let name = normalize_name(name)?;
        let uuid = Uuid::new_v4();

        self.conn
            .execute(
                "INSERT INTO entities (uuid, parent_uuid, name) VALUES (?1, ?2, ?3);",
                params![uuid.to_string(), parent_uuid.to_string(), name.as_str()],
            )
            .map_err(|err| map_write_error(err, &name, parent_uuid))?;

        load_required_entity(self.conn, uuid)
    }

    fn get_entity(&self, id: EntityId) -> RepoResult<Option<Entity>> {
        load_entity(self.conn, "uuid", id.to_string())
    }

    fn find_entity_by_name(&self, name: &str) -> RepoResult<Option<Entity>> {
        let name = normalize_name(name)?;
        load_entity(self.conn, "name", name)
    }

    fn list_entities(&self, parent_uuid: Option<ParentId>) -> RepoResult<Vec<Entity>> {
        let mut sql = format!("{ENTITY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(parent_uuid) = parent_uuid {
            sql.push_str(" AND parent_uuid = ?");
            bind_values.push(Value::Text(parent_uuid.to_string()));
        }
        sql.push_str(" ORDER BY name ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(parse_entity_row(row)?);
        }
        Ok(entities)
    }

    fn rename_entity(&self, id: EntityId, name: &str) -> RepoResult<Entity> {
        let name = normalize_name(name)?;

        let changed = self
            .conn
            .execute(
                "UPDATE entities
                 SET name = ?2,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![id.to_string(), name.as_str()],
            )
            .map_err(|err| match constraint_kind(&err) {
                Some(ConstraintKind::Unique) => ValidationError::NameTaken(name.clone()).into(),
                _ => RepoError::from(err),
            })?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                table: Table::Entities,
                id,
            });
        }

        load_required_entity(self.conn, id)
    }

    fn delete_entity(&self, id: EntityId) -> RepoResult<DeleteReport> {
        delete_row(self.conn, Table::Entities, id)
    }

    fn list_grandchildren(&self, id: EntityId) -> RepoResult<Vec<Grandchild>> {
        ensure_row_exists(self.conn, Table::Entities, id)?;
        let scope = resolve(Table::Entities, "grandchildren").ok_or_else(|| {
            RepoError::InvalidData("relation `entities.grandchildren` is not declared".to_string())
        })?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid, child_uuid, label, created_at, updated_at
             FROM grandchildren
             WHERE uuid IN ({})
             ORDER BY created_at ASC, uuid ASC;",
            scope_sql(&scope)
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_grandchild_row(row)?);
        }
        Ok(items)
    }
}

fn map_write_error(err: rusqlite::Error, name: &str, parent_uuid: ParentId) -> RepoError {
    match constraint_kind(&err) {
        Some(ConstraintKind::Unique) => ValidationError::NameTaken(name.to_string()).into(),
        Some(ConstraintKind::ForeignKey) => ValidationError::ParentNotFound(parent_uuid).into(),
        _ => err.into(),
    }
}

fn load_entity(conn: &Connection, column: &str, value: String) -> RepoResult<Option<Entity>> {
    let mut stmt = conn.prepare(&format!("{ENTITY_SELECT_SQL} WHERE {column} = ?1;"))?;
    let mut rows = stmt.query([value])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_entity_row(row)?));
    }
    Ok(None)
}

fn load_required_entity(conn: &Connection, id: EntityId) -> RepoResult<Entity> {
    load_entity(conn, "uuid", id.to_string())?.ok_or(RepoError::NotFound {
        table: Table::Entities,
        id,
    })
}

fn parse_entity_row(row: &Row<'_>) -> RepoResult<Entity> {
    let uuid_text: String = row.get("uuid")?;
    let parent_text: String = row.get("parent_uuid")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank name in entities.name for {uuid_text}"
        )));
    }

    Ok(Entity {
        uuid: parse_uuid(&uuid_text, "entities.uuid")?,
        parent_uuid: parse_uuid(&parent_text, "entities.parent_uuid")?,
        name,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
