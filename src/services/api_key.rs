//! API key service for generation, verification, and management.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::db::{DbPool, api_keys as db};
use crate::error::{AppError, AppResult};
use crate::models::{ApiKey, AuthenticatedCaller};

/// API key prefix.
pub const KEY_PREFIX: &str = "nh_";
/// Random bytes in a key; hex encoded they double in length.
const KEY_RANDOM_BYTES: usize = 32;
/// Length of the key prefix stored for identification.
const KEY_PREFIX_LENGTH: usize = 8;

/// Freshly generated key material, before it is stored.
#[derive(Debug)]
pub struct GeneratedKey {
    /// Full key, shown to the user once
    pub key: String,
    pub key_hash: String,
    pub key_prefix: String,
}

/// Generate a new random API key.
pub fn generate_key() -> GeneratedKey {
    let random_part = hex::encode(rand::random::<[u8; KEY_RANDOM_BYTES]>());
    let key = format!("{}{}", KEY_PREFIX, random_part);

    // Hash the key for storage
    let key_hash = hash_key(&key);

    // Extract prefix for identification (first 8 chars of full key)
    let key_prefix = key.chars().take(KEY_PREFIX_LENGTH).collect::<String>();

    GeneratedKey {
        key,
        key_hash,
        key_prefix,
    }
}

/// Hash an API key using SHA-256.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a duration string like "365d", "30d", "1y", "6m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim().to_lowercase();

    let duration = if let Some(days) = s.strip_suffix('d') {
        days.parse::<i64>().ok().and_then(Duration::try_days)
    } else if let Some(years) = s.strip_suffix('y') {
        years
            .parse::<i64>()
            .ok()
            .and_then(|y| y.checked_mul(365))
            .and_then(Duration::try_days)
    } else if let Some(months) = s.strip_suffix('m') {
        months
            .parse::<i64>()
            .ok()
            .and_then(|m| m.checked_mul(30))
            .and_then(Duration::try_days)
    } else if let Some(weeks) = s.strip_suffix('w') {
        weeks.parse::<i64>().ok().and_then(Duration::try_weeks)
    } else {
        // Try parsing as days by default
        s.parse::<i64>().ok().and_then(Duration::try_days)
    };

    duration.filter(|d| *d > Duration::zero())
}

/// Expiry instant `raw` after `now`. Durations past the representable date
/// range are rejected like malformed ones.
pub fn expiry_from(now: DateTime<Utc>, raw: &str) -> AppResult<DateTime<Utc>> {
    parse_duration(raw)
        .and_then(|d| now.checked_add_signed(d))
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid expires_in '{}'", raw)))
}

/// Verify an API key and return the authenticated caller.
pub async fn verify_key(pool: &DbPool, key: &str) -> AppResult<AuthenticatedCaller> {
    let key_hash = hash_key(key);
    let conn = pool.connection();

    // Look up by hash
    let api_key = db::find_by_hash(conn, &key_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid API key".to_string()))?;

    if api_key.is_revoked() {
        return Err(AppError::Unauthorized(
            "API key has been revoked".to_string(),
        ));
    }

    if api_key.is_expired() {
        return Err(AppError::Unauthorized("API key has expired".to_string()));
    }

    // Keys of deleted users stop working
    if !crate::db::users::exists(conn, api_key.user_id).await? {
        return Err(AppError::Unauthorized(
            "API key owner no longer exists".to_string(),
        ));
    }

    if let Err(e) = db::update_last_used(conn, api_key.id).await {
        warn!("Failed to update last_used_at for key {}: {}", api_key.key_prefix, e);
    }

    let roles = crate::db::roles::roles_for_user(conn, api_key.user_id)
        .await?
        .into_iter()
        .map(|r| r.name)
        .collect();

    Ok(AuthenticatedCaller {
        user_id: Some(api_key.user_id),
        name: api_key.name,
        key_prefix: api_key.key_prefix,
        roles,
        is_bootstrap: false,
    })
}

/// Create a new API key for a user and store it in the database.
///
/// Returns the full key (to be shown once) and the stored record.
pub async fn create_key(
    pool: &DbPool,
    user_id: i32,
    name: &str,
    expires_in: Option<&str>,
) -> AppResult<(String, ApiKey)> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("Key name is required".to_string()));
    }

    let expires_at = match expires_in {
        Some(raw) => Some(expiry_from(Utc::now(), raw)?),
        None => None,
    };

    let conn = pool.connection();
    if !crate::db::users::exists(conn, user_id).await? {
        return Err(AppError::NotFound(format!("User {}", user_id)));
    }

    let generated = generate_key();
    let api_key = db::insert_api_key(
        conn,
        user_id,
        &generated.key_hash,
        &generated.key_prefix,
        name,
        expires_at,
    )
    .await?;

    Ok((generated.key, api_key))
}

/// List a user's API keys.
pub async fn list_keys(pool: &DbPool, user_id: i32) -> AppResult<Vec<ApiKey>> {
    let conn = pool.connection();
    db::list_for_user(conn, user_id).await
}

/// Revoke an API key by ID.
pub async fn revoke_key(pool: &DbPool, id: i32) -> AppResult<bool> {
    let conn = pool.connection();
    db::revoke(conn, id).await
}

/// Get an API key by ID.
pub async fn get_key(pool: &DbPool, id: i32) -> AppResult<Option<ApiKey>> {
    let conn = pool.connection();
    db::find_by_id(conn, id).await
}
