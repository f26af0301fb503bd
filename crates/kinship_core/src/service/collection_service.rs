//! Collection use-case service.

use super::logged;
use crate::model::entity::{
    Child, ChildId, EntityId, Grandchild, GrandchildId, Reference, ReferenceId,
};
use crate::repo::cascade::DeleteReport;
use crate::repo::collection_repo::CollectionRepository;
use crate::repo::RepoResult;

/// Use-case service over children, grandchildren and references.
pub struct CollectionService<R: CollectionRepository> {
    repo: R,
}

impl<R: CollectionRepository> CollectionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn add_child(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Child> {
        logged("child_add", || self.repo.add_child(entity_uuid, label))
    }

    pub fn list_children(&self, entity_uuid: EntityId) -> RepoResult<Vec<Child>> {
        logged("child_list", || self.repo.list_children(entity_uuid))
    }

    /// Removes a child and every grandchild it owns.
    pub fn remove_child(&self, child_uuid: ChildId) -> RepoResult<DeleteReport> {
        logged("child_remove", || self.repo.remove_child(child_uuid))
    }

    pub fn add_grandchild(&self, child_uuid: ChildId, label: &str) -> RepoResult<Grandchild> {
        logged("grandchild_add", || self.repo.add_grandchild(child_uuid, label))
    }

    pub fn list_grandchildren_of(&self, child_uuid: ChildId) -> RepoResult<Vec<Grandchild>> {
        logged("grandchild_list", || {
            self.repo.list_grandchildren_of(child_uuid)
        })
    }

    pub fn remove_grandchild(&self, grandchild_uuid: GrandchildId) -> RepoResult<DeleteReport> {
        logged("grandchild_remove", || {
            self.repo.remove_grandchild(grandchild_uuid)
        })
    }

    /// Adds a reference; the entity cannot be deleted until it is removed.
    pub fn add_reference(&self, entity_uuid: EntityId, label: &str) -> RepoResult<Reference> {
        logged("reference_add", || self.repo.add_reference(entity_uuid, label))
    }

    pub fn list_references(&self, entity_uuid: EntityId) -> RepoResult<Vec<Reference>> {
        logged("reference_list", || self.repo.list_references(entity_uuid))
    }

    pub fn remove_reference(&self, reference_uuid: ReferenceId) -> RepoResult<DeleteReport> {
        logged("reference_remove", || {
            self.repo.remove_reference(reference_uuid)
        })
    }
}
