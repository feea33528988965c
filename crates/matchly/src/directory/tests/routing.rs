use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use base64::Engine as _;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::directory::router::{directory_router, FILE_NAME_HEADER};
use crate::directory::store::MemoryStore;

fn app() -> (Router, MemoryStore) {
    let (service, store, _blobs) = build_service();
    (directory_router(Arc::new(service)), store)
}

fn onboarding_body(content_type: &str, bytes: &[u8]) -> Value {
    json!({
        "name": "Jane",
        "niche": "Beauty",
        "platform": "Instagram",
        "followers": 25000,
        "media_kit": {
            "file_name": "kit.pdf",
            "content_type": content_type,
            "data": base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn onboarding_returns_created_profile() {
    let (app, store) = app();

    let response = app
        .oneshot(post_json(
            "/api/v1/creators",
            &onboarding_body("application/pdf", b"%PDF-1.7 jane"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .expect("location header");

    let payload = read_json_body(response).await;
    assert_eq!(payload["name"], "Jane");
    assert_eq!(payload["platform"], "Instagram");
    assert_eq!(payload["completeness"], 100);
    assert!(payload["media_kit_preview_url"].is_string());
    let id = payload["id"].as_str().expect("id");
    assert_eq!(location, format!("/api/v1/creators/{id}"));
    assert_eq!(stored_creators(&store).len(), 1);
}

#[tokio::test]
async fn invalid_submission_returns_every_message() {
    let (app, store) = app();

    let response = app
        .oneshot(post_json("/api/v1/creators", &json!({ "name": "Jane" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["errors"],
        json!([
            "Niche is required",
            "Platform is required",
            "Follower count is required",
            "Media kit (PDF) is required",
        ])
    );
    assert!(store.raw("creators").is_none());
}

#[tokio::test]
async fn non_pdf_upload_returns_single_error() {
    let (app, _store) = app();

    let response = app
        .oneshot(post_json(
            "/api/v1/creators",
            &onboarding_body("image/png", b"\x89PNG"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"], json!(["Media kit must be a PDF file"]));
}

#[tokio::test]
async fn undecodable_upload_is_rejected() {
    let (app, _store) = app();
    let mut body = onboarding_body("application/pdf", b"%PDF");
    body["media_kit"]["data"] = json!("***");

    let response = app
        .oneshot(post_json("/api/v1/creators", &body))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn listing_applies_filters_and_saved_first_order() {
    let (app, store) = app();
    seed_creators(
        &store,
        &[
            creator("a", 5_000, Some(1)),
            creator("b", 50_000, Some(2)),
            creator("c", 500_000, Some(3)),
        ],
    );

    let toggle = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/shortlist/a/toggle")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(toggle.status(), StatusCode::OK);
    let outcome = read_json_body(toggle).await;
    assert_eq!(outcome["saved"], true);
    assert_eq!(outcome["saved_count"], 1);

    let response = app
        .clone()
        .oneshot(get("/api/v1/creators?sort=most&min_followers=1000"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let order: Vec<&str> = payload["creators"]
        .as_array()
        .expect("creators array")
        .iter()
        .filter_map(|card| card["id"].as_str())
        .collect();
    assert_eq!(order, vec!["a", "c", "b"]);
    assert_eq!(payload["creators"][0]["saved"], true);
    assert_eq!(payload["sort"], "most");

    let response = app
        .oneshot(get("/api/v1/creators?niche=nothing-matches"))
        .await
        .expect("response");
    let payload = read_json_body(response).await;
    assert_eq!(payload["empty_state"], "no_matches");
    assert_eq!(payload["total"], 3);
}

#[tokio::test]
async fn unknown_creator_is_not_found() {
    let (app, _store) = app();

    let response = app
        .clone()
        .oneshot(get("/api/v1/creators/ghost"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert_eq!(payload["creator_id"], "ghost");

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/creators/ghost")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_returns_no_content() {
    let (app, store) = app();
    seed_creators(&store, &[creator("a", 1, Some(1))]);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/creators/a")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(stored_creators(&store).is_empty());
}

#[tokio::test]
async fn media_kit_can_be_replaced_and_previewed() {
    let (app, store) = app();
    seed_creators(&store, &[creator("a", 1, Some(1))]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/creators/a/media-kit")
                .header(header::CONTENT_TYPE, "application/pdf")
                .header(FILE_NAME_HEADER, "kit.pdf")
                .body(Body::from(b"%PDF-1.7 a".to_vec()))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["completeness"], 100);
    let preview_url = payload["media_kit_preview_url"]
        .as_str()
        .map(str::to_string)
        .expect("preview url");

    let response = app
        .oneshot(get(&preview_url))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some(&b"application/pdf"[..])
    );
    let body = axum::body::to_bytes(response.into_body(), 1024)
        .await
        .expect("body");
    assert_eq!(&body[..], b"%PDF-1.7 a");
}

#[tokio::test]
async fn replacing_with_non_pdf_is_unprocessable() {
    let (app, store) = app();
    seed_creators(&store, &[creator("a", 1, Some(1))]);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/v1/creators/a/media-kit")
                .header(header::CONTENT_TYPE, "image/png")
                .body(Body::from(b"\x89PNG".to_vec()))
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["errors"], json!(["Media kit must be a PDF file"]));
}

#[tokio::test]
async fn current_profile_requires_a_record() {
    let (app, store) = app();

    let response = app
        .clone()
        .oneshot(get("/api/v1/profile/current"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    seed_creators(&store, &[creator("old", 1, Some(1)), creator("new", 1, Some(2))]);
    let response = app
        .oneshot(get("/api/v1/profile/current"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["profile"]["id"], "new");
    assert_eq!(payload["completeness"]["score"], 80);
    assert_eq!(payload["completeness"]["missing"], json!(["media_kit"]));
}

#[tokio::test]
async fn shortlist_lists_saved_ids() {
    let (app, _store) = app();

    for id in ["b", "a"] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/v1/shortlist/{id}/toggle"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get("/api/v1/shortlist")).await.expect("response");
    let payload = read_json_body(response).await;
    assert_eq!(payload["saved_count"], 2);
    assert_eq!(payload["creator_ids"], json!(["a", "b"]));
}

#[tokio::test]
async fn corrupted_collection_rejects_onboarding_with_server_error() {
    let (app, store) = app();
    store.insert_raw("creators", "[{");

    let response = app
        .oneshot(post_json(
            "/api/v1/creators",
            &onboarding_body("application/pdf", b"%PDF-1.7 jane"),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_reads_and_onboardings_keep_every_record() {
    let (app, store) = app();
    seed_creators(&store, &[creator("legacy", 10, None)]);

    let mut requests = Vec::new();
    for _ in 0..8 {
        let onboarding = app.clone();
        requests.push(tokio::spawn(async move {
            onboarding
                .oneshot(post_json(
                    "/api/v1/creators",
                    &onboarding_body("application/pdf", b"%PDF-1.7 jane"),
                ))
                .await
                .expect("response")
                .status()
        }));
        let listing = app.clone();
        requests.push(tokio::spawn(async move {
            listing
                .oneshot(get("/api/v1/creators"))
                .await
                .expect("response")
                .status()
        }));
    }

    for request in requests {
        let status = request.await.expect("request task");
        assert!(status == StatusCode::CREATED || status == StatusCode::OK);
    }

    let stored = stored_creators(&store);
    assert_eq!(stored.len(), 9);
    assert_eq!(stored[0].id.as_str(), "legacy");
    assert!(stored.iter().all(|record| record.created_at.is_some()));
}
