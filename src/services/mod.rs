//! Business logic services.

pub mod api_key;
pub mod chapters;
pub mod media;
pub mod novels;
pub mod roles;
pub mod taxonomy;
pub mod users;
