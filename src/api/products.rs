use actix_web::{web, HttpResponse, ResponseError};

use crate::database::FeedbackStore;
use crate::models::{CreateProductRequest, Product, ProductQuery};
use crate::services::product_service;

#[utoipa::path(
    post,
    path = "/api/product",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Missing fields or unknown company"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn create_product(
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CreateProductRequest>,
) -> HttpResponse {
    log::info!("📦 POST /api/product - company {:?}", request.company_id);

    match product_service::create_product(db.get_ref(), request.into_inner()).await {
        Ok(product) => {
            log::info!("✅ Product created: {} (id {})", product.name, product.id);
            HttpResponse::Created().json(product)
        }
        Err(e) => {
            log::warn!("❌ Failed to create product: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/product",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products of the company", body = [Product]),
        (status = 400, description = "Missing company_id"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn list_products(
    db: web::Data<dyn FeedbackStore>,
    query: web::Query<ProductQuery>,
) -> HttpResponse {
    log::info!("📋 GET /api/product - company {:?}", query.company_id);

    match product_service::list_products(db.get_ref(), &query).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => {
            log::warn!("❌ Failed to list products: {}", e);
            e.error_response()
        }
    }
}
