//! SeaORM entity definitions.

pub mod api_key;
pub mod chapter;
pub mod genre;
pub mod media;
pub mod novel;
pub mod novel_genre;
pub mod novel_tag;
pub mod permission;
pub mod role;
pub mod role_permission;
pub mod tag;
pub mod user;
pub mod user_role;
