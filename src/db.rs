pub mod user_repo;
pub use user_repo::UserRepository;
pub mod session_repo;
pub use session_repo::RefreshTokenRepository;
pub mod brand_repo;
pub use brand_repo::BrandRepository;
pub mod category_repo;
pub use category_repo::CategoryRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod variant_repo;
pub use variant_repo::VariantRepository;
