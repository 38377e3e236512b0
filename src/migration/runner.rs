//! Applies migrations exactly once each, tracked in `migration_histories`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Schema, Set,
};
use sea_orm_migration::SchemaManager;
use tracing::{info, warn};

use super::{Migration, history, migrations};

/// Migration runner errors. Every variant is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Failed to prepare migration history table: {0}")]
    Setup(#[source] DbErr),

    #[error("Failed to check history for migration {id}: {source}")]
    Lookup {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("Migration {id} failed: {source}")]
    Apply {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("Migration {id} was applied but could not be recorded: {source}")]
    Record {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("Rollback of migration {id} failed: {source}")]
    Revert {
        id: String,
        #[source]
        source: DbErr,
    },

    #[error("Unknown migration: {0}")]
    Unknown(String),

    #[error("Migration {0} has not been applied")]
    NotApplied(String),
}

impl MigrationError {
    /// Id of the migration that failed, if the failure was tied to one.
    pub fn migration_id(&self) -> Option<&str> {
        match self {
            Self::Setup(_) => None,
            Self::Lookup { id, .. }
            | Self::Apply { id, .. }
            | Self::Record { id, .. }
            | Self::Revert { id, .. } => Some(id),
            Self::Unknown(id) | Self::NotApplied(id) => Some(id),
        }
    }
}

/// Outcome of a forward run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// Applied state of a single migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    pub id: &'static str,
    pub description: &'static str,
    pub applied: Option<AppliedMigration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub applied_at: DateTime<Utc>,
}

/// Apply the crate's migration list.
pub async fn run_migrations(db: &DatabaseConnection) -> Result<MigrationReport, MigrationError> {
    run(db, &migrations()).await
}

/// Apply `migrations` in the given order, skipping those already recorded.
///
/// Stops at the first failure. Migrations before the failing one stay applied
/// and recorded; later ones are not attempted.
pub async fn run(
    db: &DatabaseConnection,
    migrations: &[Box<dyn Migration>],
) -> Result<MigrationReport, MigrationError> {
    let manager = SchemaManager::new(db);
    ensure_history_table(&manager)
        .await
        .map_err(MigrationError::Setup)?;

    let mut report = MigrationReport::default();

    for migration in migrations {
        let id = migration.id();

        let recorded = history::Entity::find()
            .filter(history::Column::MigrationId.eq(id))
            .count(db)
            .await
            .map_err(|source| MigrationError::Lookup {
                id: id.to_string(),
                source,
            })?;

        if recorded > 0 {
            info!("Migration {} already applied, skipping", id);
            report.skipped.push(id.to_string());
            continue;
        }

        info!("Applying migration {}: {}", id, migration.description());

        migration
            .up(&manager)
            .await
            .map_err(|source| MigrationError::Apply {
                id: id.to_string(),
                source,
            })?;

        history::ActiveModel {
            migration_id: Set(id.to_string()),
            applied_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|source| MigrationError::Record {
            id: id.to_string(),
            source,
        })?;

        report.applied.push(id.to_string());
    }

    info!(
        "Migrations complete: {} applied, {} already applied",
        report.applied.len(),
        report.skipped.len()
    );

    Ok(report)
}

/// Report which of `migrations` have been applied.
pub async fn status(
    db: &DatabaseConnection,
    migrations: &[Box<dyn Migration>],
) -> Result<Vec<MigrationStatus>, MigrationError> {
    let manager = SchemaManager::new(db);
    ensure_history_table(&manager)
        .await
        .map_err(MigrationError::Setup)?;

    let mut statuses = Vec::with_capacity(migrations.len());
    for migration in migrations {
        let id = migration.id();
        let entry = find_entry(db, id).await?;
        statuses.push(MigrationStatus {
            id,
            description: migration.description(),
            applied: entry.map(|e| AppliedMigration {
                applied_at: e.applied_at,
            }),
        });
    }

    Ok(statuses)
}

/// Revert one applied migration and forget its history entry.
///
/// Only the named migration is reverted; migrations applied after it are left
/// alone, so the operator must roll back in reverse order.
pub async fn rollback(
    db: &DatabaseConnection,
    migrations: &[Box<dyn Migration>],
    id: &str,
) -> Result<(), MigrationError> {
    let migration = migrations
        .iter()
        .find(|m| m.id() == id)
        .ok_or_else(|| MigrationError::Unknown(id.to_string()))?;

    let manager = SchemaManager::new(db);
    ensure_history_table(&manager)
        .await
        .map_err(MigrationError::Setup)?;

    let entry = find_entry(db, id)
        .await?
        .ok_or_else(|| MigrationError::NotApplied(id.to_string()))?;

    warn!("Rolling back migration {}: {}", id, migration.description());

    migration
        .down(&manager)
        .await
        .map_err(|source| MigrationError::Revert {
            id: id.to_string(),
            source,
        })?;

    entry
        .delete(db)
        .await
        .map_err(|source| MigrationError::Record {
            id: id.to_string(),
            source,
        })?;

    info!("Migration {} rolled back", id);
    Ok(())
}

async fn find_entry(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<history::Model>, MigrationError> {
    history::Entity::find()
        .filter(history::Column::MigrationId.eq(id))
        .one(db)
        .await
        .map_err(|source| MigrationError::Lookup {
            id: id.to_string(),
            source,
        })
}

async fn ensure_history_table(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());
    let mut table = schema.create_table_from_entity(history::Entity);
    manager.create_table(table.if_not_exists().to_owned()).await
}
