//! Entity graph records and input validation.
//!
//! # Responsibility
//! - Define the canonical read models shared by repositories and services.
//! - Normalize and validate user-provided names and labels.
//!
//! # Invariants
//! - `Entity::name` is trimmed and non-empty once persisted.
//! - Child, grandchild and reference labels are trimmed and non-empty.
//! - Uniqueness of `Entity::name` is enforced by storage, not here.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Stable identifier of a parent record.
pub type ParentId = Uuid;
/// Stable identifier of an entity record.
pub type EntityId = Uuid;
/// Stable identifier of a child owned by an entity.
pub type ChildId = Uuid;
/// Stable identifier of a grandchild owned by a child.
pub type GrandchildId = Uuid;
/// Stable identifier of a reference blocking entity deletion.
pub type ReferenceId = Uuid;

/// Validation failures reported before (or instead of) persistence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be blank")]
    BlankName,
    #[error("name has already been taken: {0}")]
    NameTaken(String),
    #[error("label must not be blank")]
    BlankLabel,
    #[error("parent must exist: {0}")]
    ParentNotFound(ParentId),
}

/// Owner of entities. Cannot be deleted while entities point at it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parent {
    pub uuid: ParentId,
    pub name: String,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

/// Named record owned by exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub uuid: EntityId,
    pub parent_uuid: ParentId,
    /// Globally unique, case-sensitive.
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row of the cascading collection owned by an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub uuid: ChildId,
    pub entity_uuid: EntityId,
    pub label: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row owned by a child; reachable from the entity only through its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grandchild {
    pub uuid: GrandchildId,
    pub child_uuid: ChildId,
    pub label: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row whose existence forbids deleting the entity it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub uuid: ReferenceId,
    pub entity_uuid: EntityId,
    pub label: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Trims `value` and rejects it when nothing is left.
pub fn normalize_name(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

/// Label counterpart of [`normalize_name`].
pub fn normalize_label(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankLabel);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{normalize_label, normalize_name, ValidationError};

    #[test]
    fn normalize_name_trims_surrounding_whitespace() {
        assert_eq!(normalize_name("  alpha \n").unwrap(), "alpha");
    }

    #[test]
    fn normalize_name_rejects_empty_and_whitespace_only() {
        for value in ["", " ", "\t\n"] {
            assert_eq!(normalize_name(value), Err(ValidationError::BlankName));
        }
    }

    #[test]
    fn normalize_label_reports_label_specific_error() {
        assert_eq!(normalize_label("  "), Err(ValidationError::BlankLabel));
        assert_eq!(normalize_label(" x ").unwrap(), "x");
    }
}
