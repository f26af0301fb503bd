//! Core domain logic for kinship.
//! This crate is the single source of truth for the entity graph invariants:
//! unique entity names, cascading children, and restricting references.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{BootstrapError, CoreConfig, DbLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::entity::{
    Child, ChildId, Entity, EntityId, Grandchild, GrandchildId, Parent, ParentId, Reference,
    ReferenceId, ValidationError,
};
pub use model::relation::{plan_delete, DeletePlan, DeletePolicy, Table};
pub use repo::cascade::{DeleteReport, DeletedRows};
pub use repo::collection_repo::{CollectionRepository, SqliteCollectionRepository};
pub use repo::entity_repo::{EntityRepository, SqliteEntityRepository};
pub use repo::parent_repo::{ParentRepository, SqliteParentRepository};
pub use repo::{RepoError, RepoResult};
pub use service::collection_service::CollectionService;
pub use service::entity_service::EntityService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
