//! Novelhub server - main entry point.
//!
//! Applies pending migrations, loads the access rules and starts the
//! Actix-web server.

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use novelhub::api::{self, ApiDoc};
use novelhub::auth::AdminKey;
use novelhub::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, Config};
use novelhub::db::DbPool;
use novelhub::middleware::RequestLogger;
use novelhub::migration;
use novelhub::rbac::PolicyEnforcer;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Novelhub Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
        info!("Using development defaults for DATABASE_URL and NOVELHUB_ADMIN_KEY");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    // The server must not start against a partially migrated schema.
    if let Err(e) = migration::run_migrations(pool.connection()).await {
        error!("Database migration failed: {}", e);
        std::process::exit(1);
    }

    let enforcer = web::Data::new(PolicyEnforcer::new());
    if let Err(e) = enforcer.reload(&pool).await {
        error!("Failed to load access rules: {}", e);
        std::process::exit(1);
    }

    let admin_key = AdminKey::new(config.admin_key.clone());
    if !admin_key.is_configured() {
        info!("No admin key configured; bootstrap access disabled");
    }

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let openapi = ApiDoc::openapi();
    let config = web::Data::new(config);

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        let allowed_headers = vec![
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
            header::HeaderName::from_static("x-admin-key"),
        ];

        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(allowed_headers)
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(enforcer.clone())
            .app_data(web::Data::new(admin_key.clone()))
            .app_data(config.clone())
            .service(web::scope("/api/v1").configure(api::configure_routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    });

    info!(
        "Authentication headers: {} (user keys), {} (bootstrap)",
        API_KEY_HEADER, ADMIN_KEY_HEADER
    );

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
