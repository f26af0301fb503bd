//! Parent and entity use-case service.
//!
//! # Invariants
//! - Entity names are validated for presence and uniqueness on create and
//!   rename; violations surface as `RepoError::Validation`.
//! - Deleting an entity either removes it with all children and grandchildren
//!   or leaves everything untouched.

use super::logged;
use crate::model::entity::{Entity, EntityId, Grandchild, Parent, ParentId};
use crate::repo::cascade::DeleteReport;
use crate::repo::entity_repo::EntityRepository;
use crate::repo::parent_repo::ParentRepository;
use crate::repo::RepoResult;

/// Use-case service over parents and the entities they own.
pub struct EntityService<E: EntityRepository, P: ParentRepository> {
    entities: E,
    parents: P,
}

impl<E: EntityRepository, P: ParentRepository> EntityService<E, P> {
    pub fn new(entities: E, parents: P) -> Self {
        Self { entities, parents }
    }

    pub fn create_parent(&self, name: &str) -> RepoResult<Parent> {
        logged("parent_create", || self.parents.create_parent(name))
    }

    pub fn list_parents(&self) -> RepoResult<Vec<Parent>> {
        logged("parent_list", || self.parents.list_parents())
    }

    /// Deletes a parent that no longer owns entities.
    pub fn delete_parent(&self, id: ParentId) -> RepoResult<DeleteReport> {
        logged("parent_delete", || self.parents.delete_parent(id))
    }

    /// Creates an entity under an existing parent.
    ///
    /// # Errors
    /// - `ValidationError::BlankName` for blank names.
    /// - `ValidationError::NameTaken` when another entity already has the name.
    /// - `ValidationError::ParentNotFound` when `parent_uuid` does not exist.
    pub fn create_entity(&self, parent_uuid: ParentId, name: &str) -> RepoResult<Entity> {
        logged("entity_create", || {
            self.entities.create_entity(parent_uuid, name)
        })
    }

    pub fn rename_entity(&self, id: EntityId, name: &str) -> RepoResult<Entity> {
        logged("entity_rename", || self.entities.rename_entity(id, name))
    }

    /// Deletes an entity, cascading through its children.
    ///
    /// Fails with `RepoError::RestrictedDeletion` while references exist.
    pub fn delete_entity(&self, id: EntityId) -> RepoResult<DeleteReport> {
        logged("entity_delete", || self.entities.delete_entity(id))
    }

    pub fn get_entity(&self, id: EntityId) -> RepoResult<Option<Entity>> {
        logged("entity_get", || self.entities.get_entity(id))
    }

    pub fn find_entity_by_name(&self, name: &str) -> RepoResult<Option<Entity>> {
        logged("entity_find", || self.entities.find_entity_by_name(name))
    }

    pub fn list_entities(&self, parent_uuid: Option<ParentId>) -> RepoResult<Vec<Entity>> {
        logged("entity_list", || self.entities.list_entities(parent_uuid))
    }

    /// Grandchildren reachable through the entity's children, read at call time.
    pub fn list_grandchildren(&self, id: EntityId) -> RepoResult<Vec<Grandchild>> {
        logged("entity_grandchildren", || {
            self.entities.list_grandchildren(id)
        })
    }
}
