//! Migration runner against the real migration list.

use sea_orm::Database;

use novelhub::db::DbPool;
use novelhub::migration::{self, migrations, rollback, run_migrations, status};
use novelhub::rbac::PolicyEnforcer;

#[actix_rt::test]
async fn test_fresh_database_is_fully_migrated_once() {
    let conn = Database::connect("sqlite::memory:").await.unwrap();

    let first = run_migrations(&conn).await.unwrap();
    assert_eq!(first.applied.len(), migrations().len());
    assert_eq!(first.applied[0], "m0001_create_users");

    let second = run_migrations(&conn).await.unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(second.skipped, first.applied);

    let statuses = status(&conn, &migrations()).await.unwrap();
    assert!(statuses.iter().all(|s| s.applied.is_some()));
}

#[actix_rt::test]
async fn test_seeded_roles_drive_the_enforcer() {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    run_migrations(&conn).await.unwrap();
    let pool = DbPool::from_connection(conn);

    let enforcer = PolicyEnforcer::new();
    assert!(enforcer.reload(&pool).await.unwrap() > 0);

    let roles = |r: &str| vec![r.to_string()];
    assert!(enforcer.enforce(&roles("admin"), "roles", "delete"));
    assert!(enforcer.enforce(&roles("author"), "chapters", "create"));
    assert!(!enforcer.enforce(&roles("author"), "genres", "create"));
    assert!(enforcer.enforce(&roles("reader"), "tags", "read"));
    assert!(!enforcer.enforce(&roles("reader"), "novels", "update"));
}

#[actix_rt::test]
async fn test_rolling_back_the_seed_removes_roles() {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    run_migrations(&conn).await.unwrap();
    let pool = DbPool::from_connection(conn.clone());

    rollback(&conn, &migrations(), "m0008_seed_default_roles")
        .await
        .unwrap();
    let enforcer = PolicyEnforcer::new();
    assert_eq!(enforcer.reload(&pool).await.unwrap(), 0);

    let pending: Vec<&str> = status(&conn, &migrations())
        .await
        .unwrap()
        .into_iter()
        .filter(|s| s.applied.is_none())
        .map(|s| s.id)
        .collect();
    assert_eq!(pending, vec!["m0008_seed_default_roles"]);

    let report = run_migrations(&conn).await.unwrap();
    assert_eq!(report.applied, vec!["m0008_seed_default_roles"]);
    assert!(enforcer.reload(&pool).await.unwrap() > 0);

    assert!(matches!(
        rollback(&conn, &migrations(), "m9999_missing").await,
        Err(migration::MigrationError::Unknown(_))
    ));
}
