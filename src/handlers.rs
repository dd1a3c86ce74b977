pub mod auth;
pub mod brand;
pub mod category;
pub mod product;
pub mod upload;
