// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::forgot_password,
        handlers::auth::reset_password,
        handlers::auth::get_me,

        // --- Brands ---
        handlers::brand::create_brand,
        handlers::brand::update_brand,
        handlers::brand::delete_brand,
        handlers::brand::get_brand,
        handlers::brand::get_all_brands,

        // --- Categories ---
        handlers::category::create_category,
        handlers::category::update_category,
        handlers::category::delete_category,
        handlers::category::get_category,
        handlers::category::get_all_categories,

        // --- Products ---
        handlers::product::create_product,
        handlers::product::update_product,
        handlers::product::delete_product,
        handlers::product::get_product_by_id,
        handlers::product::get_product_by_slug,
        handlers::product::get_all_products,
        handlers::product::add_product_attributes,
        handlers::product::get_product_attributes,
        handlers::product::add_product_variants,
        handlers::product::get_product_variants,
        handlers::product::add_product_media,
        handlers::product::get_product_media,
        handlers::product::add_product_seo,
        handlers::product::get_product_seo,

        // --- Uploads ---
        handlers::upload::upload_brand_image,
    ),
    components(
        schemas(
            // --- Comum ---
            models::common::GenericResponse,

            // --- Auth ---
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::RefreshTokenPayload,
            models::auth::ForgotPasswordPayload,
            models::auth::ResetPasswordPayload,
            models::auth::UserInfo,
            models::auth::AuthResponse,
            models::auth::RegisterResponse,

            // --- Brands ---
            models::brand::Brand,
            models::brand::CreateBrandPayload,
            models::brand::UpdateBrandPayload,
            models::brand::BrandListResponse,

            // --- Categories ---
            models::category::Category,
            models::category::CreateCategoryPayload,
            models::category::UpdateCategoryPayload,
            models::category::CategoryListResponse,

            // --- Products ---
            models::product::ProductStatus,
            models::product::MediaType,
            models::product::Product,
            models::product::ProductListItem,
            models::product::ProductListResponse,
            models::product::CreateProductPayload,
            models::product::UpdateProductPayload,
            models::product::AttributeEntry,
            models::product::ProductAttributesPayload,
            models::product::ProductAttributesResponse,
            models::product::OptionInput,
            models::product::VariantInput,
            models::product::VariantSyncPayload,
            models::product::SyncedVariant,
            models::product::VariantSyncResponse,
            models::product::OptionView,
            models::product::VariantView,
            models::product::ProductVariantsResponse,
            models::product::ProductMedia,
            models::product::MediaInput,
            models::product::ProductSeoPayload,
            models::product::ProductSeo,

            // --- Uploads ---
            models::upload::UploadForm,
            models::upload::UploadResult,
            models::upload::UploadResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação, sessões e redefinição de senha"),
        (name = "Brands", description = "Marcas do catálogo"),
        (name = "Categories", description = "Árvore de categorias"),
        (name = "Products", description = "Produtos, atributos, variantes, mídia e SEO"),
        (name = "Uploads", description = "Envio de imagens e documentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
