//! Cursor pagination over the list endpoints.

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use serde_json::json;

use novelhub::pagination::encode_id;

use super::helpers::*;

async fn seed_genres<S>(app: &S, count: usize)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    for i in 1..=count {
        let (status, body) = send(
            app,
            as_admin(TestRequest::post().uri("/api/v1/genres"))
                .set_json(json!({ "name": format!("Genre {:02}", i) })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
    }
}

#[actix_rt::test]
async fn test_walks_every_page_in_ascending_order() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_genres(&app, 25).await;

    let (status, first) = send(
        &app,
        as_admin(TestRequest::get().uri("/api/v1/genres?limit=10&sort_order=asc")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["metadata"]["count"], 10);
    assert_eq!(first["metadata"]["limit"], 10);
    assert_eq!(first["metadata"]["sort_order"], "asc");
    assert_eq!(first["page_info"]["has_next_page"], true);
    assert_eq!(first["page_info"]["has_previous_page"], false);
    assert!(first["page_info"].get("previous_cursor").is_none());
    assert_eq!(
        first["page_info"]["next_cursor"],
        first["page_info"]["end_cursor"]
    );

    let mut seen = ids(&first);
    let mut cursor = first["page_info"]["next_cursor"].as_str().unwrap().to_string();
    let mut pages = 1;

    loop {
        let (status, page) = send(
            &app,
            as_admin(TestRequest::get().uri(&format!(
                "/api/v1/genres?limit=10&sort_order=asc&cursor={}",
                cursor
            ))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["page_info"]["has_previous_page"], true);
        seen.extend(ids(&page));
        pages += 1;

        match page["page_info"]["next_cursor"].as_str() {
            Some(next) => cursor = next.to_string(),
            None => {
                assert_eq!(page["page_info"]["has_next_page"], false);
                assert_eq!(page["metadata"]["count"], 5);
                break;
            }
        }
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 25);
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "ids not ascending: {:?}", seen);
}

#[actix_rt::test]
async fn test_defaults_to_descending() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_genres(&app, 5).await;

    for uri in ["/api/v1/genres", "/api/v1/genres?sort_order=sideways"] {
        let (status, body) = send(&app, as_admin(TestRequest::get().uri(uri))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["sort_order"], "desc");
        let page = ids(&body);
        assert_eq!(page.len(), 5);
        assert!(page.windows(2).all(|w| w[0] > w[1]));
    }
}

#[actix_rt::test]
async fn test_descending_cursor_reaches_the_oldest_row() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_genres(&app, 21).await;

    let (status, first) = send(&app, as_admin(TestRequest::get().uri("/api/v1/genres?limit=20"))).await;
    assert_eq!(status, StatusCode::OK);
    let first_ids = ids(&first);
    assert_eq!(first_ids.len(), 20);
    assert!(first_ids.windows(2).all(|w| w[0] > w[1]), "{:?}", first_ids);
    assert_eq!(first["page_info"]["has_next_page"], true);

    let last_id = first_ids[19];
    let next = first["page_info"]["next_cursor"].as_str().unwrap().to_string();
    assert_eq!(next, encode_id(last_id as u64));

    let (status, second) = send(
        &app,
        as_admin(TestRequest::get().uri(&format!("/api/v1/genres?limit=20&cursor={}", next))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_ids = ids(&second);
    assert_eq!(second_ids.len(), 1);
    assert!(second_ids[0] < last_id);
    assert_eq!(second["page_info"]["has_next_page"], false);
    assert_eq!(second["page_info"]["has_previous_page"], true);
    assert!(second["page_info"].get("next_cursor").is_none());
}

#[actix_rt::test]
async fn test_exact_page_has_no_next_cursor() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;
    seed_genres(&app, 20).await;

    let (_, body) = send(&app, as_admin(TestRequest::get().uri("/api/v1/genres?limit=20"))).await;
    assert_eq!(body["metadata"]["count"], 20);
    assert_eq!(body["page_info"]["has_next_page"], false);
    assert!(body["page_info"].get("next_cursor").is_none());
}

#[actix_rt::test]
async fn test_limit_is_clamped() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    for (query, expected) in [("limit=500", 100), ("limit=0", 20), ("limit=-3", 20), ("limit=abc", 20)] {
        let (status, body) = send(
            &app,
            as_admin(TestRequest::get().uri(&format!("/api/v1/tags?{}", query))),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", query);
        assert_eq!(body["metadata"]["limit"], expected, "{}", query);
    }
}

#[actix_rt::test]
async fn test_empty_table() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(&app, as_admin(TestRequest::get().uri("/api/v1/tags"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["metadata"]["count"], 0);
    assert_eq!(body["page_info"]["has_next_page"], false);
    assert!(body["page_info"].get("start_cursor").is_none());
    assert!(body["page_info"].get("end_cursor").is_none());
}

#[actix_rt::test]
async fn test_garbage_cursor_is_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool).await;

    let (status, body) = send(
        &app,
        as_admin(TestRequest::get().uri("/api/v1/genres?cursor=%21%21garbage%21%21")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}
