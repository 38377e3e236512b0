//! Versioned schema migrations.
//!
//! Each migration is identified by a stable id and recorded in
//! `migration_histories` once applied. [`run_migrations`] applies every
//! migration in [`migrations`] that has no history row, in order, and stops at
//! the first failure.

mod history;
mod runner;

mod m0001_create_users;
mod m0002_create_roles_and_permissions;
mod m0003_create_api_keys;
mod m0004_create_genres_and_tags;
mod m0005_create_media;
mod m0006_create_novels;
mod m0007_create_chapters;
mod m0008_seed_default_roles;

use sea_orm_migration::prelude::*;

pub use runner::{
    AppliedMigration, MigrationError, MigrationReport, MigrationStatus, rollback, run,
    run_migrations, status,
};

/// A single forward/backward schema step.
#[async_trait::async_trait]
pub trait Migration: Send + Sync {
    /// Stable identifier, recorded in `migration_histories`. Never reuse one.
    fn id(&self) -> &'static str;

    fn description(&self) -> &'static str;

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr>;

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr>;
}

/// All migrations, in application order.
pub fn migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(m0001_create_users::CreateUsers),
        Box::new(m0002_create_roles_and_permissions::CreateRolesAndPermissions),
        Box::new(m0003_create_api_keys::CreateApiKeys),
        Box::new(m0004_create_genres_and_tags::CreateGenresAndTags),
        Box::new(m0005_create_media::CreateMedia),
        Box::new(m0006_create_novels::CreateNovels),
        Box::new(m0007_create_chapters::CreateChapters),
        Box::new(m0008_seed_default_roles::SeedDefaultRoles),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_migration_ids_are_unique_and_ordered() {
        let all = migrations();
        let ids: Vec<&str> = all.iter().map(|m| m.id()).collect();

        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
