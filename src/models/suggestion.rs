use serde::{Deserialize, Serialize};
use std::fmt;

/// Feedback item posted by a user about a company, optionally about one of its products
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Suggestion {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub product_id: Option<i64>,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub downvotes: i64,
    /// Unix timestamp
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewSuggestion {
    pub user_id: i64,
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub product_id: Option<i64>,
}

/// Validated partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionChanges {
    pub upvotes: Option<i64>,
    pub downvotes: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl SuggestionChanges {
    pub fn is_empty(&self) -> bool {
        self.upvotes.is_none()
            && self.downvotes.is_none()
            && self.title.is_none()
            && self.description.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionFilter {
    Product(i64),
    Company(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    /// (upvotes, downvotes) contributed by one vote in this direction
    fn counts(self) -> (i64, i64) {
        match self {
            Vote::Up => (1, 0),
            Vote::Down => (0, 1),
        }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Up => write!(f, "up"),
            Vote::Down => write!(f, "down"),
        }
    }
}

/// A user's standing vote on a suggestion (at most one per pair)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SuggestionVote {
    pub suggestion_id: i64,
    pub user_id: i64,
    pub direction: Vote,
}

/// Effect of casting a vote over the user's previous one.
///
/// Repeating the same direction withdraws the vote, the other direction
/// switches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteChange {
    pub upvotes: i64,
    pub downvotes: i64,
    /// The user's vote once the change is applied
    pub standing: Option<Vote>,
}

impl VoteChange {
    pub fn resolve(previous: Option<Vote>, cast: Vote) -> Self {
        let (mut upvotes, mut downvotes) = (0, 0);
        if let Some(previous) = previous {
            let (up, down) = previous.counts();
            upvotes -= up;
            downvotes -= down;
        }

        let standing = if previous == Some(cast) {
            None
        } else {
            let (up, down) = cast.counts();
            upvotes += up;
            downvotes += down;
            Some(cast)
        };

        Self {
            upvotes,
            downvotes,
            standing,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateSuggestionRequest {
    pub title: Option<String>,
    pub user_id: Option<i64>,
    pub company_id: Option<i64>,
    pub description: Option<String>,
    pub product_id: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateSuggestionRequest {
    pub id: Option<i64>,
    pub upvotes: Option<i64>,
    pub downvotes: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct VoteRequest {
    pub id: Option<i64>,
    pub direction: Option<Vote>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct VoteResponse {
    /// The caller's vote after this call, `null` when withdrawn
    pub vote: Option<Vote>,
    pub suggestion: Suggestion,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct DeleteSuggestionRequest {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SuggestionQuery {
    /// `true` filters by product id, `false` by company id
    pub product_id_included: Option<bool>,
    pub filter_id: Option<i64>,
}
