//! Migration: Seed the default roles and their permissions.
//!
//! - `admin`: every action on every resource
//! - `author`: reads everything public, writes novels, chapters and media
//! - `reader`: reads novels, chapters, genres, tags and media

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm_migration::prelude::*;

use super::Migration;
use crate::entity::{permission, role, role_permission};

pub struct SeedDefaultRoles;

const READ_RESOURCES: &[&str] = &["novels", "chapters", "genres", "tags", "media"];
const AUTHOR_WRITE_RESOURCES: &[&str] = &["novels", "chapters", "media"];
const WRITE_ACTIONS: &[&str] = &["create", "update", "delete"];

/// `(role, description, [(resource, action)])`
fn default_roles() -> Vec<(&'static str, &'static str, Vec<(&'static str, &'static str)>)> {
    let reader: Vec<_> = READ_RESOURCES.iter().map(|r| (*r, "read")).collect();

    let mut author = reader.clone();
    author.push(("users", "read"));
    for resource in AUTHOR_WRITE_RESOURCES {
        for action in WRITE_ACTIONS {
            author.push((*resource, *action));
        }
    }

    vec![
        ("admin", "Full access to every resource", vec![("*", "*")]),
        ("author", "Publishes novels, chapters and media", author),
        ("reader", "Reads published content", reader),
    ]
}

#[async_trait::async_trait]
impl Migration for SeedDefaultRoles {
    fn id(&self) -> &'static str {
        "m0008_seed_default_roles"
    }

    fn description(&self) -> &'static str {
        "Seed admin, author and reader roles"
    }

    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let now = Utc::now();

        for (name, description, grants) in default_roles() {
            let role = role::ActiveModel {
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;

            for (resource, action) in grants {
                let existing = permission::Entity::find()
                    .filter(permission::Column::Resource.eq(resource))
                    .filter(permission::Column::Action.eq(action))
                    .one(db)
                    .await?;

                let permission = match existing {
                    Some(p) => p,
                    None => {
                        permission::ActiveModel {
                            resource: Set(resource.to_string()),
                            action: Set(action.to_string()),
                            description: Set(None),
                            ..Default::default()
                        }
                        .insert(db)
                        .await?
                    }
                };

                role_permission::Entity::insert(role_permission::ActiveModel {
                    role_id: Set(role.id),
                    permission_id: Set(permission.id),
                })
                .exec_without_returning(db)
                .await?;
            }
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let names: Vec<&str> = default_roles().into_iter().map(|(name, _, _)| name).collect();

        let roles = role::Entity::find()
            .filter(role::Column::Name.is_in(names))
            .all(db)
            .await?;
        let role_ids: Vec<i32> = roles.iter().map(|r| r.id).collect();

        role_permission::Entity::delete_many()
            .filter(role_permission::Column::RoleId.is_in(role_ids.clone()))
            .exec(db)
            .await?;
        role::Entity::delete_many()
            .filter(role::Column::Id.is_in(role_ids))
            .exec(db)
            .await?;

        Ok(())
    }
}
