// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::auth_guard,
    services::upload_service::MAX_UPLOAD_BYTES,
};

/// Monta o router completo da API (usado pelo main e pelos testes de integração).
pub fn create_router(app_state: AppState) -> Router {
    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password));

    // Sessão do usuário (protegidas pelo middleware)
    let session_routes = Router::new()
        .route("/logout", post(handlers::auth::logout))
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Catálogo: leitura pública
    let catalog_public = Router::new()
        .route("/get-brand/{id}", get(handlers::brand::get_brand))
        .route("/get-all-brands", get(handlers::brand::get_all_brands))
        .route("/get-category/{id}", get(handlers::category::get_category))
        .route("/get-all-category", get(handlers::category::get_all_categories))
        .route("/get-product/id/{id}", get(handlers::product::get_product_by_id))
        .route("/get-product/slug/{slug}", get(handlers::product::get_product_by_slug))
        .route("/get-all-products", get(handlers::product::get_all_products))
        .route("/get-product-attribute/{id}", get(handlers::product::get_product_attributes))
        .route("/get-product-media/{id}", get(handlers::product::get_product_media))
        .route("/get-product-variants/{id}", get(handlers::product::get_product_variants))
        .route("/get-product-seo/{id}", get(handlers::product::get_product_seo));

    // Catálogo: escrita (token + escopo checado em cada handler)
    let catalog_protected = Router::new()
        .route(
            "/upload-brand-image",
            post(handlers::upload::upload_brand_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/create-brand", post(handlers::brand::create_brand))
        .route("/update-brand/{id}", patch(handlers::brand::update_brand))
        .route("/delete-brand/{id}", delete(handlers::brand::delete_brand))
        .route("/create-category", post(handlers::category::create_category))
        .route("/update-category/{id}", patch(handlers::category::update_category))
        .route("/delete-category/{id}", delete(handlers::category::delete_category))
        .route("/create-product", post(handlers::product::create_product))
        .route("/update-product/{id}", patch(handlers::product::update_product))
        .route("/delete-product/{id}", delete(handlers::product::delete_product))
        .route("/add-product-attribute", post(handlers::product::add_product_attributes))
        .route("/add-product-variants/{id}", post(handlers::product::add_product_variants))
        .route("/add-product-media/{id}", post(handlers::product::add_product_media))
        .route("/add-product-seo/{id}", post(handlers::product::add_product_seo))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let v1 = Router::new()
        .nest("/auth", auth_routes.merge(session_routes))
        .merge(catalog_public)
        .merge(catalog_protected);

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/v1", v1)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
