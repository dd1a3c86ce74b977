// tests/upload.rs

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use futures::TryStreamExt;
use object_store::{memory::InMemory, path::Path as ObjectPath, ObjectStore};
use tower::ServiceExt;

use catalog_backend::{routes::create_router, services::upload_service::MAX_UPLOAD_BYTES};

const BOUNDARY: &str = "----catalog-test-boundary";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
const PDF: &[u8] = b"%PDF-1.7\n%\xE2\xE3";

enum Part<'a> {
    Text(&'a str, &'a str),
    File { file_name: &'a str, content_type: &'a str, data: &'a [u8] },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { file_name, content_type, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/upload-brand-image")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn stored_keys(store: &InMemory) -> Vec<String> {
    let mut keys: Vec<String> = store
        .list(None)
        .map_ok(|meta| meta.location.to_string())
        .try_collect()
        .await
        .unwrap();
    keys.sort();
    keys
}

#[tokio::test]
async fn uploads_every_file_in_request_order() {
    let store = Arc::new(InMemory::new());
    let state = common::lazy_state(store.clone());
    let token = common::access_token(&state, &["catalog:create"]);
    let app = create_router(state);

    let response = app
        .oneshot(upload_request(
            &token,
            &[
                Part::Text("bucket", "brands"),
                Part::File { file_name: "logo.PNG", content_type: "image/png", data: PNG },
                Part::File { file_name: "catalogo.pdf", content_type: "application/pdf", data: PDF },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let data = body["data"].as_array().unwrap();
    let first_key = data[0]["key"].as_str().unwrap();
    let second_key = data[1]["key"].as_str().unwrap();
    assert!(first_key.starts_with("brands/") && first_key.ends_with(".png"));
    assert!(second_key.starts_with("brands/") && second_key.ends_with(".pdf"));
    assert_ne!(first_key, second_key);
    assert_eq!(
        data[0]["url"].as_str().unwrap(),
        format!("{}/{}", common::PUBLIC_BASE_URL, first_key)
    );

    let stored = store.get(&ObjectPath::from(first_key)).await.unwrap().bytes().await.unwrap();
    assert_eq!(stored.as_ref(), PNG);
    assert_eq!(stored_keys(&store).await.len(), 2);
}

#[tokio::test]
async fn one_disallowed_file_rejects_the_whole_batch() {
    let store = Arc::new(InMemory::new());
    let state = common::lazy_state(store.clone());
    let token = common::access_token(&state, &["catalog:create"]);
    let app = create_router(state);

    let response = app
        .oneshot(upload_request(
            &token,
            &[
                Part::Text("bucket", "brands"),
                Part::File { file_name: "logo.png", content_type: "image/png", data: PNG },
                Part::File { file_name: "pagina.html", content_type: "text/html", data: b"<html></html>" },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = common::body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("pagina.html"));
    assert!(stored_keys(&store).await.is_empty());
}

#[tokio::test]
async fn missing_bucket_is_a_bad_request() {
    let store = Arc::new(InMemory::new());
    let state = common::lazy_state(store.clone());
    let token = common::access_token(&state, &["catalog:create"]);
    let app = create_router(state);

    let response = app
        .oneshot(upload_request(
            &token,
            &[Part::File { file_name: "logo.png", content_type: "image/png", data: PNG }],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stored_keys(&store).await.is_empty());
}

#[tokio::test]
async fn upload_requires_create_scope() {
    let store = Arc::new(InMemory::new());
    let state = common::lazy_state(store.clone());
    let token = common::access_token(&state, &["catalog:update"]);
    let app = create_router(state);

    let response = app
        .oneshot(upload_request(
            &token,
            &[
                Part::Text("bucket", "brands"),
                Part::File { file_name: "logo.png", content_type: "image/png", data: PNG },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn body_over_the_limit_is_payload_too_large() {
    let store = Arc::new(InMemory::new());
    let state = common::lazy_state(store.clone());
    let token = common::access_token(&state, &["catalog:create"]);
    let app = create_router(state);

    let oversized = vec![0u8; MAX_UPLOAD_BYTES + 1];
    let response = app
        .oneshot(upload_request(
            &token,
            &[
                Part::Text("bucket", "brands"),
                Part::File { file_name: "enorme.png", content_type: "image/png", data: &oversized },
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(stored_keys(&store).await.is_empty());
}
