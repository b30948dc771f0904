use crate::database::{FeedbackStore, StoreError};
use crate::models::{
    CreateSuggestionRequest, DeleteSuggestionRequest, NewSuggestion, Suggestion,
    SuggestionChanges, SuggestionFilter, SuggestionQuery, UpdateSuggestionRequest, VoteRequest,
    VoteResponse,
};
use crate::services::auth_service::Claims;
use crate::utils::error::AppError;
use crate::utils::validation::Required;

const DUPLICATE_TITLE: &str = "Another suggestion with that title already exists";
const OWNER_MISMATCH: &str = "user_id doesn't match";

/// The `user_id` a client sends must be the one its token was issued to
fn ensure_acting_user(claims: &Claims, user_id: i64) -> Result<(), AppError> {
    if claims.user_id()? != user_id {
        return Err(AppError::InvalidRequest(OWNER_MISMATCH.to_string()));
    }
    Ok(())
}

fn duplicate_title(err: StoreError) -> AppError {
    match err {
        StoreError::Duplicate(_) => AppError::InvalidRequest(DUPLICATE_TITLE.to_string()),
        other => other.into(),
    }
}

fn not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Suggestion {} not found", id))
}

pub async fn create_suggestion(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: CreateSuggestionRequest,
) -> Result<Suggestion, AppError> {
    let mut required = Required::new();
    let title = required.text("title", &request.title);
    let user_id = required.value("user_id", request.user_id);
    let company_id = required.value("company_id", request.company_id);
    let description = required.text("description", &request.description);
    let product_id = required.value("product_id", request.product_id);
    required.finish()?;

    ensure_acting_user(claims, user_id)?;

    if db.find_suggestion_by_title(&title).await?.is_some() {
        return Err(AppError::InvalidRequest(DUPLICATE_TITLE.to_string()));
    }

    if db.find_user(user_id).await?.is_none() {
        return Err(AppError::InvalidRequest(format!("User {} does not exist", user_id)));
    }
    if db.find_company(company_id).await?.is_none() {
        return Err(AppError::InvalidRequest(format!("Company {} does not exist", company_id)));
    }
    match db.find_product(product_id).await? {
        None => {
            return Err(AppError::InvalidRequest(format!("Product {} does not exist", product_id)));
        }
        Some(product) if product.company_id != company_id => {
            return Err(AppError::InvalidRequest(format!(
                "Product {} does not belong to company {}",
                product_id, company_id
            )));
        }
        Some(_) => {}
    }

    db.insert_suggestion(NewSuggestion {
        user_id,
        company_id,
        title,
        description,
        product_id: Some(product_id),
    })
    .await
    .map_err(duplicate_title)
}

fn validate_changes(request: UpdateSuggestionRequest) -> Result<SuggestionChanges, AppError> {
    for (field, value) in [("upvotes", request.upvotes), ("downvotes", request.downvotes)] {
        if matches!(value, Some(v) if v < 0) {
            return Err(AppError::InvalidRequest(format!("{} must not be negative", field)));
        }
    }

    let title = match request.title.map(|t| t.trim().to_string()) {
        Some(t) if t.is_empty() => {
            return Err(AppError::InvalidRequest("title must not be empty".to_string()));
        }
        other => other,
    };

    Ok(SuggestionChanges {
        upvotes: request.upvotes,
        downvotes: request.downvotes,
        title,
        description: request.description.map(|d| d.trim().to_string()),
    })
}

/// Partial update: only the fields present in the request are written
pub async fn update_suggestion(
    db: &dyn FeedbackStore,
    request: UpdateSuggestionRequest,
) -> Result<Suggestion, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    required.finish()?;

    let changes = validate_changes(request)?;

    let updated = if changes.is_empty() {
        db.find_suggestion(id).await?
    } else {
        db.update_suggestion(id, changes).await.map_err(duplicate_title)?
    };

    updated.ok_or_else(|| not_found(id))
}

/// Casts the caller's vote: a repeat withdraws it, the other direction switches it
pub async fn vote(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: VoteRequest,
) -> Result<VoteResponse, AppError> {
    let user_id = claims.user_id()?;

    let (id, direction) = match (request.id, request.direction) {
        (Some(id), Some(direction)) => (id, direction),
        (id, direction) => {
            let missing = [("id", id.is_none()), ("direction", direction.is_none())]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name)
                .collect();
            return Err(AppError::MissingFields(missing));
        }
    };

    let (suggestion, vote) = db
        .cast_vote(id, user_id, direction)
        .await?
        .ok_or_else(|| not_found(id))?;

    Ok(VoteResponse { vote, suggestion })
}

pub async fn list_suggestions(
    db: &dyn FeedbackStore,
    query: &SuggestionQuery,
) -> Result<Vec<Suggestion>, AppError> {
    let mut required = Required::new();
    let by_product = required.value("product_id_included", query.product_id_included);
    let filter_id = required.value("filter_id", query.filter_id);
    required.finish()?;

    let filter = if by_product {
        SuggestionFilter::Product(filter_id)
    } else {
        SuggestionFilter::Company(filter_id)
    };

    Ok(db.list_suggestions(filter).await?)
}

/// Deletes the suggestion when the caller is its author, returning the removed row
pub async fn delete_suggestion(
    db: &dyn FeedbackStore,
    claims: &Claims,
    request: DeleteSuggestionRequest,
) -> Result<Suggestion, AppError> {
    let mut required = Required::new();
    let id = required.value("id", request.id);
    let user_id = required.value("user_id", request.user_id);
    required.finish()?;

    ensure_acting_user(claims, user_id)?;

    let suggestion = db.find_suggestion(id).await?.ok_or_else(|| not_found(id))?;
    if suggestion.user_id != user_id {
        return Err(AppError::InvalidRequest(OWNER_MISMATCH.to_string()));
    }

    db.delete_suggestion(id).await?.ok_or_else(|| not_found(id))
}
