//! Novelhub server library.
//!
//! Core functionality for the novel publishing backend: schema migrations,
//! cursor pagination, authentication, role based access control and the
//! HTTP API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod pagination;
pub mod rbac;
pub mod services;
