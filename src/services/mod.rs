pub mod auth_service;
pub mod comment_service;
pub mod company_service;
pub mod product_service;
pub mod suggestion_service;
