//! Persistence for users, companies, products, suggestions and their comments.
//!
//! Handlers only see [`FeedbackStore`]; the server picks the MongoDB backend in
//! production and the in-memory one for local runs and tests.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use std::fmt;

use crate::models::{
    Comment, Company, CompanyChanges, NewComment, NewCompany, NewProduct, NewSuggestion, NewUser,
    Product, Suggestion, SuggestionChanges, SuggestionFilter, User, Vote,
};

pub use memory::MemoryStore;
pub use mongo::MongoDB;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// A unique field (username, email, company name, suggestion title) collided
    Duplicate(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Duplicate(field) => write!(f, "Duplicate value for {}", field),
            StoreError::Backend(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// Cheap round trip used by the health check
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company>;
    async fn find_company(&self, id: i64) -> StoreResult<Option<Company>>;
    async fn find_company_by_name(&self, name: &str) -> StoreResult<Option<Company>>;
    async fn list_companies(&self) -> StoreResult<Vec<Company>>;
    async fn update_company(&self, id: i64, changes: CompanyChanges) -> StoreResult<Option<Company>>;
    async fn delete_company(&self, id: i64) -> StoreResult<Option<Company>>;

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product>;
    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>>;
    async fn list_products(&self, company_id: i64) -> StoreResult<Vec<Product>>;

    async fn insert_suggestion(&self, suggestion: NewSuggestion) -> StoreResult<Suggestion>;
    async fn find_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>>;
    async fn find_suggestion_by_title(&self, title: &str) -> StoreResult<Option<Suggestion>>;
    /// Applies the changes and returns the updated row, `None` when `id` does not exist
    async fn update_suggestion(
        &self,
        id: i64,
        changes: SuggestionChanges,
    ) -> StoreResult<Option<Suggestion>>;
    /// Casts, switches or withdraws `user_id`'s vote and adjusts the counters.
    ///
    /// Returns the suggestion with the user's standing vote, `None` when `id` does not exist.
    async fn cast_vote(
        &self,
        id: i64,
        user_id: i64,
        vote: Vote,
    ) -> StoreResult<Option<(Suggestion, Option<Vote>)>>;
    async fn list_suggestions(&self, filter: SuggestionFilter) -> StoreResult<Vec<Suggestion>>;
    /// Removes the row and returns it, `None` when `id` does not exist
    async fn delete_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>>;

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment>;
    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>>;
    async fn list_comments(&self, suggestion_id: i64) -> StoreResult<Vec<Comment>>;
    async fn update_comment(&self, id: i64, message: String) -> StoreResult<Option<Comment>>;
    async fn delete_comment(&self, id: i64) -> StoreResult<Option<Comment>>;
    /// Likes the comment for `user_id`, or removes the like if already present.
    ///
    /// Returns the comment and whether the user now likes it.
    async fn toggle_comment_like(&self, id: i64, user_id: i64)
        -> StoreResult<Option<(Comment, bool)>>;
}
