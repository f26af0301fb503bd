use kinship_core::db::open_db_in_memory;
use kinship_core::{
    EntityRepository, EntityService, ParentRepository, RepoError, SqliteEntityRepository,
    SqliteParentRepository, Table, ValidationError,
};
use rusqlite::Connection;
use uuid::Uuid;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(
    conn: &Connection,
) -> EntityService<SqliteEntityRepository<'_>, SqliteParentRepository<'_>> {
    EntityService::new(
        SqliteEntityRepository::try_new(conn).unwrap(),
        SqliteParentRepository::try_new(conn).unwrap(),
    )
}

fn entity_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM entities;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn create_entity_persists_under_parent() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();

    let entity = service.create_entity(parent.uuid, "  alpha  ").unwrap();
    assert_eq!(entity.name, "alpha");
    assert_eq!(entity.parent_uuid, parent.uuid);

    let loaded = service.get_entity(entity.uuid).unwrap().unwrap();
    assert_eq!(loaded, entity);
}

#[test]
fn create_entity_rejects_blank_names() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();

    for name in ["", "   ", "\n\t"] {
        let err = service.create_entity(parent.uuid, name).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::BlankName)
        ));
    }
    assert_eq!(entity_count(&conn), 0);
}

#[test]
fn create_entity_rejects_duplicate_name_without_second_row() {
    let conn = setup();
    let service = service(&conn);
    let first_parent = service.create_parent("First").unwrap();
    let second_parent = service.create_parent("Second").unwrap();

    service.create_entity(first_parent.uuid, "alpha").unwrap();
    let err = service
        .create_entity(second_parent.uuid, "alpha")
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NameTaken(ref name)) if name == "alpha"
    ));
    assert_eq!(entity_count(&conn), 1);
}

#[test]
fn duplicate_check_applies_to_normalized_name() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();

    service.create_entity(parent.uuid, "alpha").unwrap();
    let err = service.create_entity(parent.uuid, " alpha ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NameTaken(_))
    ));
}

#[test]
fn names_are_case_sensitive() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();

    service.create_entity(parent.uuid, "alpha").unwrap();
    service.create_entity(parent.uuid, "Alpha").unwrap();
    assert_eq!(entity_count(&conn), 2);
}

#[test]
fn create_entity_requires_existing_parent() {
    let conn = setup();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    let err = service.create_entity(missing, "orphan").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::ParentNotFound(id)) if id == missing
    ));
    assert_eq!(entity_count(&conn), 0);
}

#[test]
fn rename_to_own_name_succeeds() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();
    let entity = service.create_entity(parent.uuid, "alpha").unwrap();

    let renamed = service.rename_entity(entity.uuid, "alpha").unwrap();
    assert_eq!(renamed.uuid, entity.uuid);
    assert_eq!(renamed.name, "alpha");
}

#[test]
fn rename_rejects_name_of_another_entity() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();
    let alpha = service.create_entity(parent.uuid, "alpha").unwrap();
    service.create_entity(parent.uuid, "beta").unwrap();

    let err = service.rename_entity(alpha.uuid, "beta").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NameTaken(ref name)) if name == "beta"
    ));

    let unchanged = service.get_entity(alpha.uuid).unwrap().unwrap();
    assert_eq!(unchanged.name, "alpha");
}

#[test]
fn rename_rejects_blank_name_and_keeps_row() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();
    let entity = service.create_entity(parent.uuid, "alpha").unwrap();

    let err = service.rename_entity(entity.uuid, " ").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::BlankName)
    ));
    assert_eq!(
        service.get_entity(entity.uuid).unwrap().unwrap().name,
        "alpha"
    );
}

#[test]
fn rename_frees_the_old_name() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();
    let entity = service.create_entity(parent.uuid, "alpha").unwrap();

    service.rename_entity(entity.uuid, "gamma").unwrap();
    service.create_entity(parent.uuid, "alpha").unwrap();

    assert_eq!(
        service
            .find_entity_by_name("gamma")
            .unwrap()
            .map(|found| found.uuid),
        Some(entity.uuid)
    );
}

#[test]
fn rename_missing_entity_returns_not_found() {
    let conn = setup();
    let service = service(&conn);
    let missing = Uuid::new_v4();

    let err = service.rename_entity(missing, "alpha").unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { table: Table::Entities, id } if id == missing
    ));
}

#[test]
fn list_entities_filters_by_parent_and_orders_by_name() {
    let conn = setup();
    let service = service(&conn);
    let first = service.create_parent("First").unwrap();
    let second = service.create_parent("Second").unwrap();

    service.create_entity(first.uuid, "charlie").unwrap();
    service.create_entity(second.uuid, "bravo").unwrap();
    service.create_entity(first.uuid, "alpha").unwrap();

    let all: Vec<String> = service
        .list_entities(None)
        .unwrap()
        .into_iter()
        .map(|entity| entity.name)
        .collect();
    assert_eq!(all, vec!["alpha", "bravo", "charlie"]);

    let first_only: Vec<String> = service
        .list_entities(Some(first.uuid))
        .unwrap()
        .into_iter()
        .map(|entity| entity.name)
        .collect();
    assert_eq!(first_only, vec!["alpha", "charlie"]);
}

#[test]
fn unique_constraint_holds_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kinship.db");
    let conn_a = kinship_core::db::open_db(&path).unwrap();
    let conn_b = kinship_core::db::open_db(&path).unwrap();

    let parent = SqliteParentRepository::try_new(&conn_a)
        .unwrap()
        .create_parent("Parent")
        .unwrap();
    let repo_a = SqliteEntityRepository::try_new(&conn_a).unwrap();
    let repo_b = SqliteEntityRepository::try_new(&conn_b).unwrap();

    repo_a.create_entity(parent.uuid, "shared").unwrap();
    let err = repo_b.create_entity(parent.uuid, "shared").unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::NameTaken(_))
    ));
}

#[test]
fn parent_with_entities_cannot_be_deleted() {
    let conn = setup();
    let service = service(&conn);
    let parent = service.create_parent("Parent").unwrap();
    let entity = service.create_entity(parent.uuid, "alpha").unwrap();

    let err = service.delete_parent(parent.uuid).unwrap_err();
    assert!(matches!(
        err,
        RepoError::RestrictedDeletion {
            table: Table::Parents,
            relation: "entities",
            count: 1,
            ..
        }
    ));

    service.delete_entity(entity.uuid).unwrap();
    let report = service.delete_parent(parent.uuid).unwrap();
    assert_eq!(report.count(Table::Parents), 1);
    assert!(service.list_parents().unwrap().is_empty());
}
