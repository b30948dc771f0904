use actix_web::{web, HttpResponse, ResponseError};

use crate::database::FeedbackStore;
use crate::middleware::auth::Claims;
use crate::models::{Company, CreateCompanyRequest, DeleteCompanyRequest, UpdateCompanyRequest};
use crate::services::company_service;

#[utoipa::path(
    post,
    path = "/api/company",
    tag = "Companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created, owned by the caller", body = Company),
        (status = 400, description = "Missing name or name already taken"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn create_company(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CreateCompanyRequest>,
) -> HttpResponse {
    log::info!("🏢 POST /api/company - user {}", user.sub);

    match company_service::create_company(db.get_ref(), &user, request.into_inner()).await {
        Ok(company) => {
            log::info!("✅ Company created: {} (id {})", company.name, company.id);
            HttpResponse::Created().json(company)
        }
        Err(e) => {
            log::warn!("❌ Failed to create company: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/company",
    tag = "Companies",
    responses(
        (status = 200, description = "All companies", body = [Company]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn list_companies(db: web::Data<dyn FeedbackStore>) -> HttpResponse {
    log::info!("📋 GET /api/company");

    match company_service::list_companies(db.get_ref()).await {
        Ok(companies) => HttpResponse::Ok().json(companies),
        Err(e) => {
            log::error!("❌ Failed to list companies: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/company",
    tag = "Companies",
    request_body = UpdateCompanyRequest,
    responses(
        (status = 200, description = "Updated company", body = Company),
        (status = 400, description = "Missing id, blank or taken name, or caller is not the creator"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Company not found")
    ),
    security(("access_token" = []))
)]
pub async fn update_company(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<UpdateCompanyRequest>,
) -> HttpResponse {
    log::info!("✏️ PATCH /api/company - id {:?}, user {}", request.id, user.sub);

    match company_service::update_company(db.get_ref(), &user, request.into_inner()).await {
        Ok(company) => HttpResponse::Ok().json(company),
        Err(e) => {
            log::warn!("❌ Failed to update company: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/company",
    tag = "Companies",
    request_body = DeleteCompanyRequest,
    responses(
        (status = 200, description = "Deleted company", body = Company),
        (status = 400, description = "Missing id, caller is not the creator, or products/suggestions still refer to it"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Company not found")
    ),
    security(("access_token" = []))
)]
pub async fn delete_company(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<DeleteCompanyRequest>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/company - id {:?}, user {}", request.id, user.sub);

    match company_service::delete_company(db.get_ref(), &user, request.into_inner()).await {
        Ok(company) => {
            log::info!("✅ Company {} deleted", company.id);
            HttpResponse::Ok().json(company)
        }
        Err(e) => {
            log::warn!("❌ Failed to delete company: {}", e);
            e.error_response()
        }
    }
}
