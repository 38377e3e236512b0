//! API endpoint modules.

pub mod api_keys;
pub mod chapters;
pub mod health;
pub mod media;
pub mod novels;
pub mod openapi;
pub mod roles;
pub mod taxonomy;
pub mod users;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// Register every `/api/v1` route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(users::configure_routes)
        .configure(roles::configure_routes)
        .configure(api_keys::configure_routes)
        .configure(taxonomy::configure_routes)
        .configure(novels::configure_routes)
        .configure(chapters::configure_routes)
        .configure(media::configure_routes);
}
