//! Novel, chapter and media flows.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

use super::helpers::*;

async fn create_genre<S>(app: &S, name: &str) -> i64
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = send(
        app,
        as_admin(TestRequest::post().uri("/api/v1/genres")).set_json(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["id"].as_i64().unwrap()
}

#[actix_rt::test]
async fn test_create_and_classify_novel() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (author_id, key) = user_with_role(&app, "alice", "author").await;
    let fantasy = create_genre(&app, "Fantasy").await;
    let romance = create_genre(&app, "Romance").await;

    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key).set_json(json!({
            "title": "The Glass Tower",
            "synopsis": "A tower, made of glass.",
            "genre_ids": [fantasy, fantasy],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["novel"]["slug"], "the-glass-tower");
    assert_eq!(body["novel"]["status"], "draft");
    assert_eq!(body["novel"]["author_id"], author_id);
    assert_eq!(body["genres"].as_array().unwrap().len(), 1);
    let novel_id = body["novel"]["id"].as_i64().unwrap();

    // Same slug, different punctuation
    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "The Glass-Tower!" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Other", "status": "abandoned" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Other", "genre_ids": [9999] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("9999"));

    let (status, body) = send(
        &app,
        with_key(
            TestRequest::put().uri(&format!("/api/v1/novels/{}/genres", novel_id)),
            &key,
        )
        .set_json(json!({ "ids": [romance] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["genres"][0]["slug"], "romance");

    let (_, body) = send(
        &app,
        with_key(
            TestRequest::get().uri(&format!("/api/v1/novels?genre_id={}", romance)),
            &key,
        ),
    )
    .await;
    assert_eq!(ids(&body), vec![novel_id]);

    let (_, body) = send(
        &app,
        with_key(
            TestRequest::get().uri(&format!("/api/v1/novels?genre_id={}", fantasy)),
            &key,
        ),
    )
    .await;
    assert!(ids(&body).is_empty());
}

#[actix_rt::test]
async fn test_list_filters_combine() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (alice_id, alice) = user_with_role(&app, "alice", "author").await;
    let (_, bob) = user_with_role(&app, "bob", "author").await;

    for (key, title, status) in [
        (&alice, "First", "draft"),
        (&alice, "Second", "ongoing"),
        (&bob, "Third", "ongoing"),
    ] {
        let (code, body) = send(
            &app,
            with_key(TestRequest::post().uri("/api/v1/novels"), key)
                .set_json(json!({ "title": title, "status": status })),
        )
        .await;
        assert_eq!(code, StatusCode::CREATED, "{}", body);
    }

    let (_, body) = send(
        &app,
        with_key(
            TestRequest::get().uri(&format!(
                "/api/v1/novels?author_id={}&status=ongoing",
                alice_id
            )),
            &alice,
        ),
    )
    .await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second"]);

    let (status, _) = send(
        &app,
        with_key(TestRequest::get().uri("/api/v1/novels?status=lost"), &alice),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_chapter_lifecycle() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, key) = user_with_role(&app, "alice", "author").await;
    let (_, reader) = user_with_role(&app, "rita", "reader").await;

    let (_, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Chapters Galore" })),
    )
    .await;
    let novel_id = body["novel"]["id"].as_i64().unwrap();
    let chapters = format!("/api/v1/novels/{}/chapters", novel_id);

    let (status, first) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "title": "Opening", "content": "It was a dark and stormy night." })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    assert_eq!(first["number"], 1);
    assert_eq!(first["word_count"], 7);
    assert!(first["published_at"].is_null());

    let (_, second) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "title": "Rising", "content": "More words here." })),
    )
    .await;
    assert_eq!(second["number"], 2);

    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "number": 2, "title": "Dup", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &reader)
            .set_json(json!({ "title": "Nope", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let first_uri = format!("{}/{}", chapters, first["id"]);
    let (status, updated) = send(
        &app,
        with_key(TestRequest::put().uri(&first_uri), &key)
            .set_json(json!({ "content": "Short now." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["word_count"], 2);
    assert_eq!(updated["title"], "Opening");

    let publish_uri = format!("{}/publish", first_uri);
    let (status, published) = send(&app, with_key(TestRequest::post().uri(&publish_uri), &key)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(published["published_at"].is_string());

    let (_, again) = send(&app, with_key(TestRequest::post().uri(&publish_uri), &key)).await;
    assert_eq!(again["published_at"], published["published_at"]);

    let (status, page) = send(
        &app,
        with_key(TestRequest::get().uri(&format!("{}?sort_order=asc", chapters)), &reader),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["metadata"]["count"], 2);
    assert_eq!(page["data"][0]["number"], 1);

    let (status, _) = send(&app, with_key(TestRequest::delete().uri(&first_uri), &key)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, with_key(TestRequest::get().uri(&first_uri), &reader)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_chapter_numbers_run_out_at_the_top_of_the_range() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, key) = user_with_role(&app, "alice", "author").await;

    let (_, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Endless" })),
    )
    .await;
    let chapters = format!("/api/v1/novels/{}/chapters", body["novel"]["id"]);

    let (status, last) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "title": "Last", "content": "x", "number": i32::MAX })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", last);
    assert_eq!(last["number"], i32::MAX);

    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "title": "After", "content": "y" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{}", body);

    // Explicit numbers below the top are still accepted.
    let (status, body) = send(
        &app,
        with_key(TestRequest::post().uri(&chapters), &key)
            .set_json(json!({ "title": "First", "content": "z", "number": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[actix_rt::test]
async fn test_deleted_novel_disappears() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (_, key) = user_with_role(&app, "alice", "author").await;

    let (_, body) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Short Lived" })),
    )
    .await;
    let uri = format!("/api/v1/novels/{}", body["novel"]["id"]);

    let (status, _) = send(&app, with_key(TestRequest::delete().uri(&uri), &key)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, with_key(TestRequest::get().uri(&uri), &key)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let (_, body) = send(&app, with_key(TestRequest::get().uri("/api/v1/novels"), &key)).await;
    assert!(ids(&body).is_empty());

    // Slugs stay reserved after deletion.
    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Short Lived" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn test_media_registration_and_cover() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    let (author_id, key) = user_with_role(&app, "alice", "author").await;

    let (status, media) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/media"), &key).set_json(json!({
            "file_name": "cover.png",
            "content_type": "image/png",
            "size_bytes": 2048,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", media);
    assert_eq!(media["uploader_id"], author_id);
    assert!(
        media["storage_key"]
            .as_str()
            .unwrap()
            .starts_with(&format!("media/{}/", author_id))
    );

    let (status, _) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/media"), &key).set_json(json!({
            "file_name": "huge.mp4",
            "content_type": "video/mp4",
            "size_bytes": 60 * 1024 * 1024,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, novel) = send(
        &app,
        with_key(TestRequest::post().uri("/api/v1/novels"), &key)
            .set_json(json!({ "title": "Covered", "cover_media_id": media["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", novel);
    assert_eq!(novel["novel"]["cover_media_id"], media["id"]);

    let (status, _) = send(
        &app,
        with_key(
            TestRequest::delete().uri(&format!("/api/v1/media/{}", media["id"])),
            &key,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, detail) = send(
        &app,
        with_key(
            TestRequest::get().uri(&format!("/api/v1/novels/{}", novel["novel"]["id"])),
            &key,
        ),
    )
    .await;
    assert!(detail["novel"]["cover_media_id"].is_null());
}
