pub mod auth;
pub mod comments;
pub mod companies;
pub mod health;
pub mod products;
pub mod suggestions;
pub mod swagger;
