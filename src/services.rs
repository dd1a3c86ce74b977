pub mod auth;
pub use auth::AuthService;
pub mod brand_service;
pub use brand_service::BrandService;
pub mod category_service;
pub use category_service::CategoryService;
pub mod notifier;
pub mod password;
pub mod product_service;
pub use product_service::ProductService;
pub mod token;
pub use token::TokenService;
pub mod upload_service;
pub use upload_service::UploadService;
pub mod variant_sync;
pub use variant_sync::VariantSyncEngine;
