//! Owned collection repository: children, grandchildren and references.
//!
//! # Responsibility
//! - Add, list and remove rows of the collections hanging off an entity.
//! - Route removals through the delete planner so each collection keeps its
//!   own policy (removing a child cascades to its grandchildren).
//!
//! # Invariants
//! - Adding to a missing owner fails with `NotFound` for the owner table.
//! - Listings are ordered by `created_at ASC, uuid ASC`.

use crate::db::{constraint_kind, ensure_connection_ready, ConstraintKind};
use crate::model::entity::{
    normalize_label, Child, ChildId, EntityId, Grandchild, GrandchildId, Reference, ReferenceId,
};
use crate::model::relation::Table;
use crate::repo::cascade::{delete_row, ensure_row_exists, DeleteReport};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for the collections owned by entities and children.
pub trait CollectionRepository {
    fn add_child(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Child>;
    fn list_children(&self, entity_uuid: EntityId) -> RepoResult<Vec<Child>>;
    /// Removes one child together with its grandchildren.
    fn remove_child(&self, child_uuid: ChildId) -> RepoResult<DeleteReport>;
    fn add_grandchild(&self, child_uuid: ChildId, label: &str) -> RepoResult<Grandchild>;
    fn list_grandchildren_of(&self, child_uuid: ChildId) -> RepoResult<Vec<Grandchild>>;
    fn remove_grandchild(&self, grandchild_uuid: GrandchildId) -> RepoResult<DeleteReport>;
    fn add_reference(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Reference>;
    fn list_references(&self, entity_uuid: EntityId) -> RepoResult<Vec<Reference>>;
    fn remove_reference(&self, reference_uuid: ReferenceId) -> RepoResult<DeleteReport>;
}

/// SQLite-backed collection repository.
pub struct SqliteCollectionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCollectionRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["children", "grandchildren", "entity_refs"])?;
        Ok(Self { conn })
    }
}

impl CollectionRepository for SqliteCollectionRepository<'_> {
    fn add_child(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Child> {
        let uuid = insert_owned(
            self.conn,
            Table::Children,
            "entity_uuid",
            (Table::Entities, entity_uuid),
            label,
        )?;
        load_one(self.conn, Table::Children, uuid, parse_child_row)
    }

    fn list_children(&self, entity_uuid: EntityId) -> RepoResult<Vec<Child>> {
        ensure_row_exists(self.conn, Table::Entities, entity_uuid)?;
        list_owned(
            self.conn,
            Table::Children,
            "entity_uuid",
            entity_uuid,
            parse_child_row,
        )
    }

    fn remove_child(&self, child_uuid: ChildId) -> RepoResult<DeleteReport> {
        delete_row(self.conn, Table::Children, child_uuid)
    }

    fn add_grandchild(&self, child_uuid: ChildId, label: &str) -> RepoResult<Grandchild> {
        let uuid = insert_owned(
            self.conn,
            Table::Grandchildren,
            "child_uuid",
            (Table::Children, child_uuid),
            label,
        )?;
        load_one(self.conn, Table::Grandchildren, uuid, parse_grandchild_row)
    }

    fn list_grandchildren_of(&self, child_uuid: ChildId) -> RepoResult<Vec<Grandchild>> {
        ensure_row_exists(self.conn, Table::Children, child_uuid)?;
        list_owned(
            self.conn,
            Table::Grandchildren,
            "child_uuid",
            child_uuid,
            parse_grandchild_row,
        )
    }

    fn remove_grandchild(&self, grandchild_uuid: GrandchildId) -> RepoResult<DeleteReport> {
        delete_row(self.conn, Table::Grandchildren, grandchild_uuid)
    }

    fn add_reference(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Reference> {
        let uuid = insert_owned(
            self.conn,
            Table::EntityRefs,
            "entity_uuid",
            (Table::Entities, entity_uuid),
            label,
        )?;
        load_one(self.conn, Table::EntityRefs, uuid, parse_reference_row)
    }

    fn list_references(&self, entity_uuid: EntityId) -> RepoResult<Vec<Reference>> {
        ensure_row_exists(self.conn, Table::Entities, entity_uuid)?;
        list_owned(
            self.conn,
            Table::EntityRefs,
            "entity_uuid",
            entity_uuid,
            parse_reference_row,
        )
    }

    fn remove_reference(&self, reference_uuid: ReferenceId) -> RepoResult<DeleteReport> {
        delete_row(self.conn, Table::EntityRefs, reference_uuid)
    }
}

fn insert_owned(
    conn: &Connection,
    table: Table,
    owner_column: &str,
    (owner_table, owner_uuid): (Table, Uuid),
    label: &str,
) -> RepoResult<Uuid> {
    let label = normalize_label(label)?;
    let uuid = Uuid::new_v4();
    conn.execute(
        &format!(
            "INSERT INTO {} (uuid, {owner_column}, label) VALUES (?1, ?2, ?3);",
            table.as_str()
        ),
        params![uuid.to_string(), owner_uuid.to_string(), label],
    )
    .map_err(|err| match constraint_kind(&err) {
        Some(ConstraintKind::ForeignKey) => RepoError::NotFound {
            table: owner_table,
            id: owner_uuid,
        },
        _ => RepoError::from(err),
    })?;
    Ok(uuid)
}

fn load_one<T>(
    conn: &Connection,
    table: Table,
    uuid: Uuid,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} WHERE uuid = ?1;",
        table.as_str()
    ))?;
    let mut rows = stmt.query([uuid.to_string()])?;
    match rows.next()? {
        Some(row) => parse(row),
        None => Err(RepoError::NotFound { table, id: uuid }),
    }
}

fn list_owned<T>(
    conn: &Connection,
    table: Table,
    owner_column: &str,
    owner_uuid: Uuid,
    parse: fn(&Row<'_>) -> RepoResult<T>,
) -> RepoResult<Vec<T>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT * FROM {} WHERE {owner_column} = ?1 ORDER BY created_at ASC, uuid ASC;",
        table.as_str()
    ))?;
    let mut rows = stmt.query([owner_uuid.to_string()])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse(row)?);
    }
    Ok(items)
}

fn parse_child_row(row: &Row<'_>) -> RepoResult<Child> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("entity_uuid")?;
    Ok(Child {
        uuid: parse_uuid(&uuid_text, "children.uuid")?,
        entity_uuid: parse_uuid(&owner_text, "children.entity_uuid")?,
        label: row.get("label")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn parse_grandchild_row(row: &Row<'_>) -> RepoResult<Grandchild> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("child_uuid")?;
    Ok(Grandchild {
        uuid: parse_uuid(&uuid_text, "grandchildren.uuid")?,
        child_uuid: parse_uuid(&owner_text, "grandchildren.child_uuid")?,
        label: row.get("label")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_reference_row(row: &Row<'_>) -> RepoResult<Reference> {
    let uuid_text: String = row.get("uuid")?;
    let owner_text: String = row.get("entity_uuid")?;
    Ok(Reference {
        uuid: parse_uuid(&uuid_text, "entity_refs.uuid")?,
        entity_uuid: parse_uuid(&owner_text, "entity_refs.entity_uuid")?,
        label: row.get("label")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
