use serde::{Deserialize, Serialize};

/// Reply posted under a suggestion
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Comment {
    pub id: i64,
    pub suggestion_id: i64,
    pub user_id: i64,
    pub message: String,
    #[serde(default)]
    pub likes: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub suggestion_id: i64,
    pub user_id: i64,
    pub message: String,
}

/// One row per (comment, user) pair that currently likes the comment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CommentLike {
    pub comment_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    pub suggestion_id: Option<i64>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCommentRequest {
    pub id: Option<i64>,
    pub message: Option<String>,
}

/// Body of DELETE /api/comment and POST /api/comment/like
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CommentIdRequest {
    pub id: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentQuery {
    pub suggestion_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CommentLikeResponse {
    /// Whether the caller likes the comment after this call
    pub liked: bool,
    pub comment: Comment,
}
