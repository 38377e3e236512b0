//! Shared helpers for the API test suite.

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use sea_orm::Database;
use secrecy::SecretString;
use serde_json::{Value, json};

use novelhub::auth::AdminKey;
use novelhub::config::{ADMIN_KEY_HEADER, API_KEY_HEADER, Config, Environment};
use novelhub::db::DbPool;
use novelhub::migration::run_migrations;
use novelhub::rbac::PolicyEnforcer;

/// Admin key used in tests.
pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Fresh in-memory database with every migration applied.
pub async fn create_test_pool() -> DbPool {
    let conn = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    run_migrations(&conn)
        .await
        .expect("Failed to run migrations");
    DbPool::from_connection(conn)
}

pub fn test_config() -> Config {
    Config {
        environment: Environment::Development,
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        admin_key: Some(SecretString::from(TEST_ADMIN_KEY.to_string())),
        max_db_connections: 1,
        default_role: "reader".to_string(),
    }
}

/// Create the application with the same routes and state as the server.
pub async fn create_test_app(
    pool: &DbPool,
) -> impl Service<Request, Response = ServiceResponse, Error = actix_web::Error> {
    let enforcer = PolicyEnforcer::new();
    enforcer
        .reload(pool)
        .await
        .expect("Failed to load access rules");
    let config = test_config();
    let admin_key = AdminKey::new(config.admin_key.clone());

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(enforcer))
            .app_data(web::Data::new(admin_key))
            .app_data(web::Data::new(config))
            .service(web::scope("/api/v1").configure(novelhub::api::configure_routes)),
    )
    .await
}

/// Send a request and decode the JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: TestRequest) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, value)
}

pub fn as_admin(req: TestRequest) -> TestRequest {
    req.insert_header((ADMIN_KEY_HEADER, TEST_ADMIN_KEY))
}

pub fn with_key(req: TestRequest, key: &str) -> TestRequest {
    req.insert_header((API_KEY_HEADER, key.to_string()))
}

/// Create a user with the admin key. New users get the `reader` role.
pub async fn create_user<S>(app: &S, username: &str) -> i32
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        as_admin(TestRequest::post().uri("/api/v1/users")).set_json(json!({
            "username": username,
            "email": format!("{}@example.com", username),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create user: {}", body);
    body["id"].as_i64().expect("user id") as i32
}

/// Issue an API key for a user with the admin key.
pub async fn issue_key<S>(app: &S, user_id: i32) -> (i32, String)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        as_admin(TestRequest::post().uri(&format!("/api/v1/users/{}/api-keys", user_id)))
            .set_json(json!({ "name": "test key" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "issue key: {}", body);
    (
        body["id"].as_i64().expect("key id") as i32,
        body["key"].as_str().expect("key").to_string(),
    )
}

pub async fn role_id<S>(app: &S, name: &str) -> i32
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(app, as_admin(TestRequest::get().uri("/api/v1/roles?limit=100"))).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]
        .as_array()
        .expect("roles")
        .iter()
        .find(|r| r["name"] == name)
        .and_then(|r| r["id"].as_i64())
        .unwrap_or_else(|| panic!("role {} not seeded", name)) as i32
}

/// Create a user holding `role` in addition to the default role and return
/// its id and API key.
pub async fn user_with_role<S>(app: &S, username: &str, role: &str) -> (i32, String)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let user_id = create_user(app, username).await;
    if role != "reader" {
        let role_id = role_id(app, role).await;
        let (status, body) = send(
            app,
            as_admin(TestRequest::put().uri(&format!(
                "/api/v1/users/{}/roles/{}",
                user_id, role_id
            ))),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT, "assign role: {}", body);
    }
    let (_, key) = issue_key(app, user_id).await;
    (user_id, key)
}

/// Ids of the items in a list response, in order.
pub fn ids(body: &Value) -> Vec<i64> {
    body["data"]
        .as_array()
        .expect("data array")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}
