use actix_web::{web, HttpResponse, ResponseError};

use crate::database::FeedbackStore;
use crate::middleware::auth::Claims;
use crate::models::{
    Comment, CommentIdRequest, CommentLikeResponse, CommentQuery, CreateCommentRequest,
    UpdateCommentRequest,
};
use crate::services::comment_service;

#[utoipa::path(
    post,
    path = "/api/comment",
    tag = "Comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created, authored by the caller", body = Comment),
        (status = 400, description = "Missing fields or unknown suggestion"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn create_comment(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CreateCommentRequest>,
) -> HttpResponse {
    log::info!(
        "💬 POST /api/comment - suggestion {:?}, user {}",
        request.suggestion_id,
        user.sub
    );

    match comment_service::create_comment(db.get_ref(), &user, request.into_inner()).await {
        Ok(comment) => {
            log::info!("✅ Comment {} added to suggestion {}", comment.id, comment.suggestion_id);
            HttpResponse::Created().json(comment)
        }
        Err(e) => {
            log::warn!("❌ Failed to create comment: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comment",
    tag = "Comments",
    params(CommentQuery),
    responses(
        (status = 200, description = "Comments of the suggestion, oldest first", body = [Comment]),
        (status = 400, description = "Missing suggestion_id"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("access_token" = []))
)]
pub async fn list_comments(
    db: web::Data<dyn FeedbackStore>,
    query: web::Query<CommentQuery>,
) -> HttpResponse {
    log::info!("📋 GET /api/comment - suggestion {:?}", query.suggestion_id);

    match comment_service::list_comments(db.get_ref(), &query).await {
        Ok(comments) => HttpResponse::Ok().json(comments),
        Err(e) => {
            log::warn!("❌ Failed to list comments: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/comment",
    tag = "Comments",
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Edited comment", body = Comment),
        (status = 400, description = "Missing fields or caller is not the author"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Comment not found")
    ),
    security(("access_token" = []))
)]
pub async fn update_comment(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<UpdateCommentRequest>,
) -> HttpResponse {
    log::info!("✏️ PATCH /api/comment - id {:?}, user {}", request.id, user.sub);

    match comment_service::update_comment(db.get_ref(), &user, request.into_inner()).await {
        Ok(comment) => HttpResponse::Ok().json(comment),
        Err(e) => {
            log::warn!("❌ Failed to update comment: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/comment",
    tag = "Comments",
    request_body = CommentIdRequest,
    responses(
        (status = 200, description = "Deleted comment", body = Comment),
        (status = 400, description = "Missing id or caller is not the author"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Comment not found")
    ),
    security(("access_token" = []))
)]
pub async fn delete_comment(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CommentIdRequest>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/comment - id {:?}, user {}", request.id, user.sub);

    match comment_service::delete_comment(db.get_ref(), &user, request.into_inner()).await {
        Ok(comment) => {
            log::info!("✅ Comment {} deleted", comment.id);
            HttpResponse::Ok().json(comment)
        }
        Err(e) => {
            log::warn!("❌ Failed to delete comment: {}", e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/comment/like",
    tag = "Comments",
    request_body = CommentIdRequest,
    responses(
        (status = 200, description = "Whether the caller now likes the comment, with the new count", body = CommentLikeResponse),
        (status = 400, description = "Missing id"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Comment not found")
    ),
    security(("access_token" = []))
)]
pub async fn like_comment(
    user: web::ReqData<Claims>,
    db: web::Data<dyn FeedbackStore>,
    request: web::Json<CommentIdRequest>,
) -> HttpResponse {
    log::info!("❤️ POST /api/comment/like - id {:?}, user {}", request.id, user.sub);

    match comment_service::like_comment(db.get_ref(), &user, request.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => {
            log::warn!("❌ Failed to like comment: {}", e);
            e.error_response()
        }
    }
}
