pub mod api;
pub mod config;
pub mod database;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;

use crate::utils::error::AppError;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            AppError::InvalidRequest(format!("Invalid JSON body: {}", err)).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("Invalid query string: {}", err)).into()
    })
}

/// Registers every route of the service.
///
/// Expects `web::Data<dyn FeedbackStore>` and `web::Data<AuthSettings>` to be
/// present in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(api::health::health_check))
        .service(
            web::scope("/api")
                .wrap(middleware::AuthMiddleware)
                .route("/register", web::post().to(api::auth::register))
                .route("/login", web::post().to(api::auth::login))
                .route("/logout", web::post().to(api::auth::logout))
                .route("/me", web::get().to(api::auth::get_me))
                .service(
                    web::resource("/company")
                        .route(web::post().to(api::companies::create_company))
                        .route(web::get().to(api::companies::list_companies))
                        .route(web::patch().to(api::companies::update_company))
                        .route(web::delete().to(api::companies::delete_company)),
                )
                .service(
                    web::resource("/product")
                        .route(web::post().to(api::products::create_product))
                        .route(web::get().to(api::products::list_products)),
                )
                .route("/suggestion/vote", web::post().to(api::suggestions::vote_suggestion))
                .service(
                    web::resource("/suggestion")
                        .route(web::post().to(api::suggestions::create_suggestion))
                        .route(web::patch().to(api::suggestions::update_suggestion))
                        .route(web::get().to(api::suggestions::list_suggestions))
                        .route(web::delete().to(api::suggestions::delete_suggestion)),
                )
                .route("/comment/like", web::post().to(api::comments::like_comment))
                .service(
                    web::resource("/comment")
                        .route(web::post().to(api::comments::create_comment))
                        .route(web::get().to(api::comments::list_comments))
                        .route(web::patch().to(api::comments::update_comment))
                        .route(web::delete().to(api::comments::delete_comment)),
                ),
        );
}
