//! Database operations for API keys using SeaORM.

use chrono::{DateTime, Utc};
use sea_orm::*;

use crate::error::AppResult;
use crate::models::ApiKey;

/// Insert a new API key.
pub async fn insert_api_key(
    db: &DatabaseConnection,
    user_id: i32,
    key_hash: &str,
    key_prefix: &str,
    name: &str,
    expires_at: Option<DateTime<Utc>>,
) -> AppResult<ApiKey> {
    let model = crate::entity::api_key::ActiveModel {
        user_id: Set(user_id),
        key_hash: Set(key_hash.to_string()),
        key_prefix: Set(key_prefix.to_string()),
        name: Set(name.to_string()),
        expires_at: Set(expires_at),
        last_used_at: Set(None),
        created_at: Set(Utc::now()),
        revoked_at: Set(None),
        ..Default::default()
    };

    let inserted = model.insert(db).await?;
    Ok(model_to_api_key(inserted))
}

/// Find an API key by its hash.
pub async fn find_by_hash(db: &DatabaseConnection, key_hash: &str) -> AppResult<Option<ApiKey>> {
    let result = crate::entity::api_key::Entity::find()
        .filter(crate::entity::api_key::Column::KeyHash.eq(key_hash))
        .one(db)
        .await?;

    Ok(result.map(model_to_api_key))
}

/// Find an API key by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> AppResult<Option<ApiKey>> {
    let result = crate::entity::api_key::Entity::find_by_id(id)
        .one(db)
        .await?;

    Ok(result.map(model_to_api_key))
}

/// Update last used timestamp.
pub async fn update_last_used(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let model = crate::entity::api_key::Entity::find_by_id(id)
        .one(db)
        .await?;

    if let Some(m) = model {
        let mut active: crate::entity::api_key::ActiveModel = m.into();
        active.last_used_at = Set(Some(Utc::now()));
        active.update(db).await?;
    }

    Ok(())
}

/// List a user's API keys (including revoked), newest first.
pub async fn list_for_user(db: &DatabaseConnection, user_id: i32) -> AppResult<Vec<ApiKey>> {
    let results = crate::entity::api_key::Entity::find()
        .filter(crate::entity::api_key::Column::UserId.eq(user_id))
        .order_by_desc(crate::entity::api_key::Column::Id)
        .all(db)
        .await?;

    Ok(results.into_iter().map(model_to_api_key).collect())
}

/// Revoke an API key. Returns false if missing or already revoked.
pub async fn revoke(db: &DatabaseConnection, id: i32) -> AppResult<bool> {
    let model = crate::entity::api_key::Entity::find_by_id(id)
        .one(db)
        .await?;

    if let Some(m) = model {
        if m.revoked_at.is_some() {
            return Ok(false); // Already revoked
        }
        let mut active: crate::entity::api_key::ActiveModel = m.into();
        active.revoked_at = Set(Some(Utc::now()));
        active.update(db).await?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn model_to_api_key(m: crate::entity::api_key::Model) -> ApiKey {
    ApiKey {
        id: m.id,
        user_id: m.user_id,
        key_hash: m.key_hash,
        key_prefix: m.key_prefix,
        name: m.name,
        expires_at: m.expires_at,
        last_used_at: m.last_used_at,
        created_at: m.created_at,
        revoked_at: m.revoked_at,
    }
}
