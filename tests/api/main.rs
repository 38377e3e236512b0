//! HTTP API test suite.
//!
//! Every test builds the full application over a fresh in-memory SQLite
//! database migrated by the real migration runner.
//!
//! Run with: cargo test --test api

mod helpers;

mod test_authz;
mod test_health;
mod test_migrations;
mod test_novels;
mod test_pagination;
