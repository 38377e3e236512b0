//! Authentication and role based authorization over HTTP.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

use super::helpers::*;

#[actix_rt::test]
async fn test_missing_and_invalid_credentials() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(&app, TestRequest::get().uri("/api/v1/novels")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = send(
        &app,
        with_key(TestRequest::get().uri("/api/v1/novels"), "nh_not-a-real-key"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        TestRequest::get()
            .uri("/api/v1/novels")
            .insert_header(("X-Admin-Key", "wrong-admin-key")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_reader_can_read_but_not_write() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, key) = user_with_role(&app, "rita", "reader").await;

    let (status, body) = send(&app, with_key(TestRequest::get().uri("/api/v1/genres"), &key)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/genres"), &key)
            .set_json(json!({ "name": "Fantasy" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Not Allowed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_users_can_read_themselves_only() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (rita, key) = user_with_role(&app, "rita", "reader").await;
    let other = create_user(&app, "oscar").await;

    let (status, body) = send(
        &app,
        with_key(TestRequest::get().uri(&format!("/api/v1/users/{}", rita)), &key),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "rita");
    assert_eq!(body["roles"], json!(["reader"]));
    assert!(!body["permissions"].as_array().unwrap().is_empty());

    let (status, _) = send(
        &app,
        with_key(TestRequest::get().uri(&format!("/api/v1/users/{}", other)), &key),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_revoked_key_is_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let user_id = create_user(&app, "rita").await;
    let (key_id, key) = issue_key(&app, user_id).await;

    let (status, _) = send(&app, with_key(TestRequest::get().uri("/api/v1/novels"), &key)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        with_key(TestRequest::delete().uri(&format!("/api/v1/api-keys/{}", key_id)), &key),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, with_key(TestRequest::get().uri("/api/v1/novels"), &key)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_key_expiry_must_be_a_reachable_date() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let user_id = create_user(&app, "rita").await;
    let uri = format!("/api/v1/users/{}/api-keys", user_id);

    for expires_in in ["100000000d", "30000000000000000y", "0d", "soon"] {
        let (status, body) = send(
            &app,
            as_admin(TestRequest::post().uri(&uri))
                .set_json(json!({ "name": "far", "expires_in": expires_in })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}: {}", expires_in, body);
        assert_eq!(body["error"], "INVALID_INPUT");
    }

    let (status, body) = send(
        &app,
        as_admin(TestRequest::post().uri(&uri))
            .set_json(json!({ "name": "month", "expires_in": "30d" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["expires_at"].is_string());
}

#[actix_rt::test]
async fn test_granted_permission_takes_effect_immediately() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, key) = user_with_role(&app, "rita", "reader").await;
    let reader = role_id(&app, "reader").await;

    let create_tag = || {
        with_key(TestRequest::post().uri("/api/v1/tags"), &key)
            .set_json(json!({ "name": "Slow Burn" }))
    };

    let (status, _) = send(&app, create_tag()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        as_admin(TestRequest::post().uri(&format!("/api/v1/roles/{}/permissions", reader)))
            .set_json(json!({ "resource": "tags", "action": "create" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (status, body) = send(&app, create_tag()).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["slug"], "slow-burn");
}

#[actix_rt::test]
async fn test_only_owner_or_manager_edits_a_novel() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, alice) = user_with_role(&app, "alice", "author").await;
    let (_, bob) = user_with_role(&app, "bob", "author").await;
    let (_, admin) = user_with_role(&app, "ada", "admin").await;

    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &alice)
            .set_json(json!({ "title": "Alice's Story" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let novel_id = body["novel"]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/novels/{}", novel_id);

    let (status, _) = send(
        &app,
        with_key(TestRequest::put().uri(&uri), &bob).set_json(json!({ "title": "Stolen" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        with_key(TestRequest::put().uri(&uri), &alice).set_json(json!({ "status": "ongoing" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ongoing");

    let (status, _) = send(&app, with_key(TestRequest::delete().uri(&uri), &admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
