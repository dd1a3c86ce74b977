// tests/guard.rs
//
// Rotas protegidas rejeitam antes de qualquer acesso ao banco, então o pool
// aqui é preguiçoso e nunca conecta.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::Duration;
use object_store::memory::InMemory;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use catalog_backend::{models::auth::TokenType, routes::create_router};

fn create_brand_request(token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/v1/create-brand")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn health_check_is_public() {
    let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
    let response = app
        .oneshot(create_brand_request(None, json!({ "name": "Acme", "slug": "acme" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Missing authentication token.");
}

#[tokio::test]
async fn error_messages_follow_accept_language() {
    let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
    let mut request = create_brand_request(None, json!({}));
    request
        .headers_mut()
        .insert(header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9".parse().unwrap());

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Token de autenticação ausente.");
}

#[tokio::test]
async fn token_without_scope_is_forbidden() {
    let state = common::lazy_state(Arc::new(InMemory::new()));
    let token = common::access_token(&state, &["catalog:update"]);
    let app = create_router(state);

    let response = app
        .oneshot(create_brand_request(Some(&token), json!({ "name": "Acme", "slug": "acme" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "Forbidden: missing scope 'catalog:create'.");
}

#[tokio::test]
async fn refresh_token_cannot_be_used_as_access_token() {
    let state = common::lazy_state(Arc::new(InMemory::new()));
    let refresh = state.token_service.issue_refresh(Uuid::new_v4()).unwrap().token;
    let app = create_router(state);

    let response = app
        .oneshot(create_brand_request(Some(&refresh), json!({ "name": "Acme", "slug": "acme" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_access_token_is_unauthorized() {
    let state = common::lazy_state(Arc::new(InMemory::new()));
    let expired = state
        .token_service
        .issue(Uuid::new_v4(), None, TokenType::Access, Duration::seconds(-30))
        .unwrap()
        .token;
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {expired}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_auth_scheme_is_unauthorized() {
    let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/auth/logout")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn scoped_request_reaches_validation() {
    let state = common::lazy_state(Arc::new(InMemory::new()));
    let token = common::access_token(&state, &["catalog:create"]);
    let app = create_router(state);

    let response = app
        .oneshot(create_brand_request(Some(&token), json!({ "name": "", "slug": "Not A Slug" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["details"]["name"].is_array());
    assert!(body["details"]["slug"].is_array());
}

#[tokio::test]
async fn nested_variant_errors_carry_their_path() {
    let state = common::lazy_state(Arc::new(InMemory::new()));
    let token = common::access_token(&state, &["catalog:update"]);
    let app = create_router(state);

    let payload = json!({
        "options": [{ "name": "Color", "values": ["Red"] }],
        "variants": [
            { "sku": "P-RED", "price": 10, "option_values": ["Red"] },
            { "sku": "", "price": -1 }
        ]
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/add-product-variants/{}", Uuid::new_v4()))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["details"]["variants[1].sku"].is_array());
    assert!(body["details"]["variants[1].price"].is_array());
    assert!(body["details"].get("variants[0].sku").is_none());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
    let response = app
        .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert!(body["paths"]["/v1/add-product-variants/{id}"].is_object());
    assert!(body["components"]["securitySchemes"]["api_jwt"].is_object());
}

#[tokio::test]
async fn out_of_range_page_is_a_bad_request() {
    for uri in [
        "/v1/get-all-products?page=9223372036854775807&limit=100",
        "/v1/get-all-brands?page=9223372036854775807&limit=100",
    ] {
        let app = create_router(common::lazy_state(Arc::new(InMemory::new())));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}
