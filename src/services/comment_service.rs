use crate::database::FeedbackStore;
use crate::models::{
    Comment, CommentIdRequest, CommentLikeResponse, CommentQuery, CreateCommentRequest,
    NewComment, UpdateCommentRequest,
};
use crate::services::auth_service::Claims;
use crate::utils::error::AppError;
use crate::utils::validation::Required;

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Comment {} not found", id))
}

/// Loads the comment and checks that `claims` belong to its author
async fn authored_comment(db: &dyn FeedbackStore, claims: &Claims, id: i64) -> Result<Comment, AppError> {
    let user_id = claims.user_id()?;
    let comment = db.find_comment(id).await?.ok_or_else(|| not_found(id))?;
    if comment.user_id != user_id {
        return Err(AppError::InvalidRequest("user_id doesn't match".to_string()));
    }
    Ok(comment)
}

pub async fn create_comment(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: CreateCommentRequest,
) -> Result<Comment, AppError> {
    let user_id = claims.user_id()?;

    let mut required = Required::new();
    let suggestion_id = required.value("suggestion_id", request.suggestion_id);
    let message = required.text("message", &request.message);
    required.finish()?;

    if db.find_suggestion(suggestion_id).await?.is_none() {
        return Err(AppError::InvalidRequest(format!(
            "Suggestion {} does not exist",
            suggestion_id
        )));
    }

    Ok(db
        .insert_comment(NewComment {
            suggestion_id,
            user_id,
            message,
        })
        .await?)
}

pub async fn list_comments(
    db: &dyn FeedbackStore,
    query: &CommentQuery,
) -> Result<Vec<Comment>, AppError> {
    let mut required = Required::new();
    let suggestion_id = required.value("suggestion_id", query.suggestion_id);
    required.finish()?;

    Ok(db.list_comments(suggestion_id).await?)
}

pub async fn update_comment(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: UpdateCommentRequest,
) -> Result<Comment, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    let message = required.text("message", &request.message);
    required.finish()?;

    authored_comment(db, claims, id).await?;

    db.update_comment(id, message)
        .await?
        .ok_or_else(|| not_found(id))
}

pub async fn delete_comment(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: CommentIdRequest,
) -> Result<Comment, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    required.finish()?;

    authored_comment(db, claims, id).await?;

    db.delete_comment(id).await?.ok_or_else(|| not_found(id))
}

/// Likes the comment, or takes the like back if the caller already gave one
pub async fn like_comment(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: CommentIdRequest,
) -> Result<CommentLikeResponse, AppError> {
    let user_id = claims.user_id()?;

    let mut required = Required::new();
    let id = required.value("id", request.id);
    required.finish()?;

    let (comment, liked) = db
        .toggle_comment_like(id, user_id)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(CommentLikeResponse { liked, comment })
}
