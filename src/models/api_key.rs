//! API key model for authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API key stored in database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: i32,
    /// Owning user
    pub user_id: i32,
    /// SHA-256 hash of the full key
    pub key_hash: String,
    /// First 8 characters of the key for identification
    pub key_prefix: String,
    /// Human-readable name (e.g., "CI - nightly import")
    pub name: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl ApiKey {
    /// Check if the key is revoked.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Check if the key is expired.
    pub fn is_expired(&self) -> bool {
        if let Some(expires_at) = self.expires_at {
            Utc::now() > expires_at
        } else {
            false
        }
    }
}

/// Response when creating a new API key (includes the full key).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyCreateResponse {
    pub id: i32,
    pub user_id: i32,
    /// Full key - only shown once
    pub key: String,
    pub key_prefix: String,
    pub name: String,
    pub expires_at: Option<String>,
    pub created_at: String,
}

/// Response for listing API keys (key masked).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyListItem {
    pub id: i32,
    pub user_id: i32,
    pub key_prefix: String,
    pub name: String,
    pub expires_at: Option<String>,
    pub last_used_at: Option<String>,
    pub created_at: String,
    pub is_revoked: bool,
}

impl From<ApiKey> for ApiKeyListItem {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            user_id: key.user_id,
            key_prefix: key.key_prefix,
            name: key.name,
            expires_at: key.expires_at.map(|d| d.to_rfc3339()),
            last_used_at: key.last_used_at.map(|d| d.to_rfc3339()),
            created_at: key.created_at.to_rfc3339(),
            is_revoked: key.revoked_at.is_some(),
        }
    }
}

/// Request to create a new API key.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    pub name: String,
    /// Expiration duration (e.g., "365d", "30d", "1y")
    #[serde(default)]
    pub expires_in: Option<String>,
}

/// Authenticated caller resolved from the request headers.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
    /// `None` for the bootstrap admin key, which has no user row.
    pub user_id: Option<i32>,
    pub name: String,
    pub key_prefix: String,
    pub roles: Vec<String>,
    pub is_bootstrap: bool,
}

impl AuthenticatedCaller {
    /// Caller authenticated with the configured admin key.
    pub fn bootstrap() -> Self {
        Self {
            user_id: None,
            name: "bootstrap-admin".to_string(),
            key_prefix: "admin".to_string(),
            roles: Vec::new(),
            is_bootstrap: true,
        }
    }

    /// Check if the caller is the given user.
    pub fn is_user(&self, user_id: i32) -> bool {
        self.user_id == Some(user_id)
    }
}
