//! Role based access control.
//!
//! Permissions live in the `roles`, `permissions` and `role_permissions`
//! tables. [`PolicyEnforcer`] keeps an in-memory copy of the resulting
//! `(role, resource, action)` rules and answers authorization checks without
//! touching the database. Call [`PolicyEnforcer::reload`] after any change to
//! roles or their grants.

use std::collections::HashSet;
use std::sync::RwLock;

use tracing::{debug, info};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::AuthenticatedCaller;

/// Matches any resource or action.
pub const WILDCARD: &str = "*";

pub mod resources {
    pub const USERS: &str = "users";
    pub const ROLES: &str = "roles";
    pub const API_KEYS: &str = "api_keys";
    pub const NOVELS: &str = "novels";
    pub const CHAPTERS: &str = "chapters";
    pub const MEDIA: &str = "media";
    pub const GENRES: &str = "genres";
    pub const TAGS: &str = "tags";
}

pub mod actions {
    pub const READ: &str = "read";
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    /// Act on rows owned by other users.
    pub const MANAGE: &str = "manage";
}

/// A single grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl Rule {
    pub fn new(role: impl Into<String>, resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }

    fn allows(&self, resource: &str, action: &str) -> bool {
        (self.resource == WILDCARD || self.resource == resource)
            && (self.action == WILDCARD || self.action == action)
    }
}

/// In-memory rule set shared by all workers.
#[derive(Debug, Default)]
pub struct PolicyEnforcer {
    rules: RwLock<HashSet<Rule>>,
}

impl PolicyEnforcer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: RwLock::new(rules.into_iter().collect()),
        }
    }

    /// Whether any of `roles` may perform `action` on `resource`.
    pub fn enforce(&self, roles: &[String], resource: &str, action: &str) -> bool {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        rules
            .iter()
            .any(|rule| roles.contains(&rule.role) && rule.allows(resource, action))
    }

    /// Swap the whole rule set.
    pub fn replace(&self, rules: impl IntoIterator<Item = Rule>) {
        let fresh: HashSet<Rule> = rules.into_iter().collect();
        let mut guard = self.rules.write().unwrap_or_else(|e| e.into_inner());
        *guard = fresh;
    }

    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rebuild the rule set from the database. Returns the number of rules loaded.
    pub async fn reload(&self, pool: &DbPool) -> AppResult<usize> {
        let grants = crate::db::roles::all_grants(pool.connection()).await?;
        let rules: Vec<Rule> = grants
            .into_iter()
            .map(|g| Rule::new(g.role, g.resource, g.action))
            .collect();

        let count = rules.len();
        self.replace(rules);
        info!("Policy rules reloaded: {} rules", count);
        Ok(count)
    }
}

/// Fail with `Forbidden` unless the caller may perform `action` on `resource`.
///
/// The bootstrap admin key bypasses the rule set.
pub fn require(
    enforcer: &PolicyEnforcer,
    caller: &AuthenticatedCaller,
    resource: &str,
    action: &str,
) -> AppResult<()> {
    if caller.is_bootstrap || enforcer.enforce(&caller.roles, resource, action) {
        return Ok(());
    }

    debug!(
        "Denied {} {} for {} (roles: {:?})",
        action, resource, caller.key_prefix, caller.roles
    );
    Err(AppError::Forbidden(format!(
        "Missing permission '{}' on '{}'",
        action, resource
    )))
}

/// Whether the caller may act on rows of `resource` owned by someone else.
pub fn can_manage(enforcer: &PolicyEnforcer, caller: &AuthenticatedCaller, resource: &str) -> bool {
    caller.is_bootstrap || enforcer.enforce(&caller.roles, resource, actions::MANAGE)
}

/// Like [`require`], but also demands ownership of the row unless the caller
/// may manage the resource.
pub fn require_owner(
    enforcer: &PolicyEnforcer,
    caller: &AuthenticatedCaller,
    resource: &str,
    action: &str,
    owner_id: i32,
) -> AppResult<()> {
    require(enforcer, caller, resource, action)?;

    if caller.is_user(owner_id) || can_manage(enforcer, caller, resource) {
        return Ok(());
    }

    Err(AppError::Forbidden(format!(
        "Only the owner may {} this {}",
        action,
        resource.trim_end_matches('s')
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(user_id: i32, roles: &[&str]) -> AuthenticatedCaller {
        AuthenticatedCaller {
            user_id: Some(user_id),
            name: "test".to_string(),
            key_prefix: "nh_test0".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            is_bootstrap: false,
        }
    }

    fn enforcer() -> PolicyEnforcer {
        PolicyEnforcer::with_rules([
            Rule::new("admin", WILDCARD, WILDCARD),
            Rule::new("author", "novels", "read"),
            Rule::new("author", "novels", "update"),
            Rule::new("reader", "novels", "read"),
            Rule::new("moderator", "novels", WILDCARD),
        ])
    }

    #[test]
    fn test_enforce_exact_and_wildcards() {
        let e = enforcer();
        let roles = |r: &[&str]| r.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert!(e.enforce(&roles(&["reader"]), "novels", "read"));
        assert!(!e.enforce(&roles(&["reader"]), "novels", "update"));
        assert!(e.enforce(&roles(&["admin"]), "roles", "delete"));
        assert!(e.enforce(&roles(&["moderator"]), "novels", "manage"));
        assert!(!e.enforce(&roles(&["moderator"]), "chapters", "read"));
        assert!(e.enforce(&roles(&["reader", "author"]), "novels", "update"));
        assert!(!e.enforce(&[], "novels", "read"));
        assert!(!e.enforce(&roles(&["ghost"]), "novels", "read"));
    }

    #[test]
    fn test_replace_swaps_rules() {
        let e = enforcer();
        assert_eq!(e.len(), 5);

        e.replace([Rule::new("reader", "tags", "read")]);
        assert_eq!(e.len(), 1);
        assert!(!e.enforce(&["reader".to_string()], "novels", "read"));
        assert!(e.enforce(&["reader".to_string()], "tags", "read"));
    }

    #[test]
    fn test_require() {
        let e = enforcer();
        assert!(require(&e, &caller(1, &["reader"]), "novels", "read").is_ok());

        let err = require(&e, &caller(1, &["reader"]), "novels", "delete").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(require(&e, &AuthenticatedCaller::bootstrap(), "roles", "delete").is_ok());
    }

    #[test]
    fn test_require_owner() {
        let e = enforcer();

        assert!(require_owner(&e, &caller(7, &["author"]), "novels", "update", 7).is_ok());
        assert!(matches!(
            require_owner(&e, &caller(8, &["author"]), "novels", "update", 7),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_owner(&e, &caller(8, &["moderator"]), "novels", "update", 7).is_ok());
        assert!(require_owner(&e, &caller(8, &["admin"]), "novels", "delete", 7).is_ok());
        // Ownership alone is not enough without the action itself.
        assert!(require_owner(&e, &caller(7, &["reader"]), "novels", "update", 7).is_err());
    }
}
