//! Health and readiness endpoints.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;

use super::helpers::*;

#[actix_rt::test]
async fn test_health_needs_no_credentials() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[actix_rt::test]
async fn test_ready_pings_database() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/ready")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}
