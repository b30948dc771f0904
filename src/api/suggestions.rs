use actix_web::{web, HttpResponse, ResponseError};

use crate::database::FeedbackStore;
use crate::middleware::auth::Claims;
use crate::models::{
    CreateSuggestionRequest, DeleteSuggestionRequest, Suggestion, SuggestionQuery,
    UpdateSuggestionRequest, VoteRequest, VoteResponse,
};
use crate::services::suggestion_service;

#[utoipa::path(
    post,
    path = "/api/suggestion",
    tag = "Suggestions",
    request_body = CreateSuggestionRequest,
    responses(
        (status = 201, description = "Suggestion created with zeroed counters", body = Suggestion),
        (status = 400, description = "Missing fields, user_id other than the caller, duplicate title, unknown company or product"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn create_suggestion(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CreateSuggestionRequest>,
) -> HttpResponse {
    log::info!("💡 POST /api/suggestion - user {}", user.sub);

    match suggestion_service::create_suggestion(db.get_ref(), &user, request.into_inner()).await {
        Ok(suggestion) => {
            log::info!("✅ Suggestion created: '{}' (id {})", suggestion.title, suggestion.id);
            HttpResponse::Created().json(suggestion)
        }
        Err(e) => {
            log::warn!("❌ Failed to create suggestion: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/suggestion",
    tag = "Suggestions",
    request_body = UpdateSuggestionRequest,
    responses(
        (status = 200, description = "Updated suggestion", body = Suggestion),
        (status = 400, description = "Missing id, negative votes or duplicate title"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Suggestion not found")
    ),
    security(("access_token" = []))
)]
pub async fn update_suggestion(
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<UpdateSuggestionRequest>,
) -> HttpResponse {
    log::info!("✏️ PATCH /api/suggestion - id {:?}", request.id);

    match suggestion_service::update_suggestion(db.get_ref(), request.into_inner()).await {
        Ok(suggestion) => HttpResponse::Ok().json(suggestion),
        Err(e) => {
            log::warn!("❌ Failed to update suggestion: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/suggestion/vote",
    tag = "Suggestions",
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Caller's vote after the call and the new counters; repeating a vote withdraws it", body = VoteResponse),
        (status = 400, description = "Missing id or direction, or direction other than up/down"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Suggestion not found")
    ),
    security(("access_token" = []))
)]
pub async fn vote_suggestion(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<VoteRequest>,
) -> HttpResponse {
    log::info!(
        "👍 POST /api/suggestion/vote - id {:?}, direction {:?}, user {}",
        request.id,
        request.direction,
        user.sub
    );

    match suggestion_service::vote(db.get_ref(), &user, request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Failed to vote: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/suggestion",
    tag = "Suggestions",
    params(SuggestionQuery),
    responses(
        (status = 200, description = "Suggestions of a product or of a company", body = [Suggestion]),
        (status = 400, description = "Missing product_id_included or filter_id"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn list_suggestions(
    db: web::Data<dyn FeedbackStore>,
    query: web::Query<SuggestionQuery>,
) -> HttpResponse {
    log::info!(
        "📋 GET /api/suggestion - product_id_included {:?}, filter_id {:?}",
        query.product_id_included,
        query.filter_id
    );

    match suggestion_service::list_suggestions(db.get_ref(), &query).await {
        Ok(suggestions) => HttpResponse::Ok().json(suggestions),
        Err(e) => {
            log::warn!("❌ Failed to list suggestions: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/suggestion",
    tag = "Suggestions",
    request_body = DeleteSuggestionRequest,
    responses(
        (status = 200, description = "Deleted suggestion", body = Suggestion),
        (status = 400, description = "Missing fields, or caller is not the author"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Suggestion not found")
    ),
    security(("access_token" = []))
)]
pub async fn delete_suggestion(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<DeleteSuggestionRequest>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/suggestion - id {:?}, user {}", request.id, user.sub);

    match suggestion_service::delete_suggestion(db.get_ref(), &user, request.into_inner()).await {
        Ok(suggestion) => {
            log::info!("✅ Suggestion {} deleted", suggestion.id);
            HttpResponse::Ok().json(suggestion)
        }
        Err(e) => {
            log::warn!("❌ Failed to delete suggestion: {}", e);
            e.error_response()
        }
    }
}
