use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FeedbackStore, StoreError, StoreResult};
use crate::models::{
    Comment, CommentLike, Company, CompanyChanges, NewComment, NewCompany, NewProduct,
    NewSuggestion, NewUser, Product, Suggestion, SuggestionChanges, SuggestionFilter,
    SuggestionVote, User, Vote, VoteChange,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    companies: Vec<Company>,
    products: Vec<Product>,
    suggestions: Vec<Suggestion>,
    votes: Vec<SuggestionVote>,
    comments: Vec<Comment>,
    comment_likes: Vec<CommentLike>,
    last_user_id: i64,
    last_company_id: i64,
    last_product_id: i64,
    last_suggestion_id: i64,
    last_comment_id: i64,
}

/// Process-local store with the same uniqueness rules as the MongoDB indexes.
///
/// Rows are kept in insertion order, which is also id order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate("username".to_string()));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company> {
        let mut tables = self.tables.write().await;
        if tables.companies.iter().any(|c| c.name == company.name) {
            return Err(StoreError::Duplicate("name".to_string()));
        }

        tables.last_company_id += 1;
        let company = Company {
            id: tables.last_company_id,
            name: company.name,
            headquarters: company.headquarters,
            industry: company.industry,
            user_id: company.user_id,
        };
        tables.companies.push(company.clone());
        Ok(company)
    }

    async fn find_company(&self, id: i64) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.iter().find(|c| c.id == id).cloned())
    }

    async fn find_company_by_name(&self, name: &str) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.iter().find(|c| c.name == name).cloned())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        Ok(self.tables.read().await.companies.clone())
    }

    async fn update_company(&self, id: i64, changes: CompanyChanges) -> StoreResult<Option<Company>> {
        let mut tables = self.tables.write().await;

        if let Some(name) = &changes.name {
            if tables.companies.iter().any(|c| c.id != id && &c.name == name) {
                return Err(StoreError::Duplicate("name".to_string()));
            }
        }

        let Some(company) = tables.companies.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            company.name = name;
        }
        if let Some(headquarters) = changes.headquarters {
            company.headquarters = headquarters;
        }
        if let Some(industry) = changes.industry {
            company.industry = industry;
        }

        Ok(Some(company.clone()))
    }

    async fn delete_company(&self, id: i64) -> StoreResult<Option<Company>> {
        let mut tables = self.tables.write().await;
        let position = tables.companies.iter().position(|c| c.id == id);
        Ok(position.map(|index| tables.companies.remove(index)))
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let mut tables = self.tables.write().await;
        tables.last_product_id += 1;
        let product = Product {
            id: tables.last_product_id,
            name: product.name,
            company_id: product.company_id,
            description: product.description,
        };
        tables.products.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self, company_id: i64) -> StoreResult<Vec<Product>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn insert_suggestion(&self, suggestion: NewSuggestion) -> StoreResult<Suggestion> {
        let mut tables = self.tables.write().await;
        if tables.suggestions.iter().any(|s| s.title == suggestion.title) {
            return Err(StoreError::Duplicate("title".to_string()));
        }

        tables.last_suggestion_id += 1;
        let now = chrono::Utc::now().timestamp();
        let suggestion = Suggestion {
            id: tables.last_suggestion_id,
            user_id: suggestion.user_id,
            company_id: suggestion.company_id,
            title: suggestion.title,
            description: suggestion.description,
            product_id: suggestion.product_id,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        };
        tables.suggestions.push(suggestion.clone());
        Ok(suggestion)
    }

    async fn find_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.suggestions.iter().find(|s| s.id == id).cloned())
    }

    async fn find_suggestion_by_title(&self, title: &str) -> StoreResult<Option<Suggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.suggestions.iter().find(|s| s.title == title).cloned())
    }

    async fn update_suggestion(
        &self,
        id: i64,
        changes: SuggestionChanges,
    ) -> StoreResult<Option<Suggestion>> {
        let mut tables = self.tables.write().await;

        if let Some(title) = &changes.title {
            if tables.suggestions.iter().any(|s| s.id != id && &s.title == title) {
                return Err(StoreError::Duplicate("title".to_string()));
            }
        }

        let Some(suggestion) = tables.suggestions.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };

        if let Some(upvotes) = changes.upvotes {
            suggestion.upvotes = upvotes;
        }
        if let Some(downvotes) = changes.downvotes {
            suggestion.downvotes = downvotes;
        }
        if let Some(title) = changes.title {
            suggestion.title = title;
        }
        if let Some(description) = changes.description {
            suggestion.description = description;
        }
        suggestion.updated_at = chrono::Utc::now().timestamp();

        Ok(Some(suggestion.clone()))
    }

    async fn cast_vote(
        &self,
        id: i64,
        user_id: i64,
        vote: Vote,
    ) -> StoreResult<Option<(Suggestion, Option<Vote>)>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.suggestions.iter().position(|s| s.id == id) else {
            return Ok(None);
        };

        let existing = tables
            .votes
            .iter()
            .position(|v| v.suggestion_id == id && v.user_id == user_id);
        let previous = existing.map(|i| tables.votes[i].direction);
        let change = VoteChange::resolve(previous, vote);

        match (existing, change.standing) {
            (Some(i), Some(direction)) => tables.votes[i].direction = direction,
            (Some(i), None) => {
                tables.votes.remove(i);
            }
            (None, Some(direction)) => tables.votes.push(SuggestionVote {
                suggestion_id: id,
                user_id,
                direction,
            }),
            (None, None) => {}
        }

        let suggestion = &mut tables.suggestions[index];
        suggestion.upvotes = (suggestion.upvotes + change.upvotes).max(0);
        suggestion.downvotes = (suggestion.downvotes + change.downvotes).max(0);
        suggestion.updated_at = chrono::Utc::now().timestamp();

        Ok(Some((suggestion.clone(), change.standing)))
    }

    async fn list_suggestions(&self, filter: SuggestionFilter) -> StoreResult<Vec<Suggestion>> {
        let tables = self.tables.read().await;
        Ok(tables
            .suggestions
            .iter()
            .filter(|s| match filter {
                SuggestionFilter::Product(product_id) => s.product_id == Some(product_id),
                SuggestionFilter::Company(company_id) => s.company_id == company_id,
            })
            .cloned()
            .collect())
    }

    async fn delete_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.suggestions.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        tables.votes.retain(|v| v.suggestion_id != id);
        Ok(Some(tables.suggestions.remove(index)))
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        tables.last_comment_id += 1;
        let now = chrono::Utc::now().timestamp();
        let comment = Comment {
            id: tables.last_comment_id,
            suggestion_id: comment.suggestion_id,
            user_id: comment.user_id,
            message: comment.message,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, suggestion_id: i64) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.suggestion_id == suggestion_id)
            .cloned()
            .collect())
    }

    async fn update_comment(&self, id: i64, message: String) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.message = message;
        comment.updated_at = chrono::Utc::now().timestamp();
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.comments.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        tables.comment_likes.retain(|l| l.comment_id != id);
        Ok(Some(tables.comments.remove(index)))
    }

    async fn toggle_comment_like(
        &self,
        id: i64,
        user_id: i64,
    ) -> StoreResult<Option<(Comment, bool)>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.comments.iter().position(|c| c.id == id) else {
            return Ok(None);
        };

        let existing = tables
            .comment_likes
            .iter()
            .position(|l| l.comment_id == id && l.user_id == user_id);
        let liked = match existing {
            Some(i) => {
                tables.comment_likes.remove(i);
                false
            }
            None => {
                tables.comment_likes.push(CommentLike { comment_id: id, user_id });
                true
            }
        };

        let comment = &mut tables.comments[index];
        comment.likes = if liked { comment.likes + 1 } else { (comment.likes - 1).max(0) };

        Ok(Some((comment.clone(), liked)))
    }
}
