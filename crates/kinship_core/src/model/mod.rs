//! Domain model for the entity graph.
//!
//! # Responsibility
//! - Define the records persisted by core (`Parent`, `Entity`, `Child`,
//!   `Grandchild`, `Reference`).
//! - Declare how records relate and what deleting an owner does to them.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Entity names are non-blank and unique across all entities.
//! - Deletion is a hard delete planned from `relation::RELATIONS`.

pub mod entity;
pub mod relation;
