use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::error::Error;

use super::{FeedbackStore, StoreError, StoreResult};
use crate::models::{
    Comment, CommentLike, Company, CompanyChanges, NewComment, NewCompany, NewProduct,
    NewSuggestion, NewUser, Product, Suggestion, SuggestionChanges, SuggestionFilter,
    SuggestionVote, User, Vote, VoteChange,
};

const USERS: &str = "users";
const COMPANIES: &str = "companies";
const PRODUCTS: &str = "products";
const SUGGESTIONS: &str = "suggestions";
const SUGGESTION_VOTES: &str = "suggestion_votes";
const COMMENTS: &str = "comments";
const COMMENT_LIKES: &str = "comment_likes";
const COUNTERS: &str = "counters";

const DEFAULT_DATABASE: &str = "feedback";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone, Debug)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        // Database name comes from the URI path, e.g. mongodb://host:27017/feedback
        let db_name = client_options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(client_options)?;
        let db = client.database(&db_name);

        // Test connection
        db.list_collection_names().await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates the unique and lookup indexes the service relies on.
    ///
    /// A unique index that cannot be built aborts startup; lookup indexes only warn.
    async fn ensure_indexes(&self) -> Result<(), MongoError> {
        log::info!("🔧 Creating database indexes...");

        let specs = [
            (USERS, doc! { "id": 1 }, true),
            (USERS, doc! { "username": 1 }, true),
            (USERS, doc! { "email": 1 }, true),
            (COMPANIES, doc! { "id": 1 }, true),
            (COMPANIES, doc! { "name": 1 }, true),
            (PRODUCTS, doc! { "id": 1 }, true),
            (PRODUCTS, doc! { "company_id": 1 }, false),
            (SUGGESTIONS, doc! { "id": 1 }, true),
            (SUGGESTIONS, doc! { "title": 1 }, true),
            (SUGGESTIONS, doc! { "company_id": 1 }, false),
            (SUGGESTIONS, doc! { "product_id": 1 }, false),
            (SUGGESTION_VOTES, doc! { "suggestion_id": 1, "user_id": 1 }, true),
            (COMMENTS, doc! { "id": 1 }, true),
            (COMMENTS, doc! { "suggestion_id": 1 }, false),
            (COMMENT_LIKES, doc! { "comment_id": 1, "user_id": 1 }, true),
        ];

        for (collection, keys, unique) in specs {
            let label = format!(
                "{}({})",
                collection,
                keys.keys().cloned().collect::<Vec<_>>().join(", ")
            );
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(unique).build())
                .build();

            match self.collection::<Document>(collection).create_index(index).await {
                Ok(_) => log::info!("   ✅ Index ready: {}", label),
                Err(e) if unique => {
                    log::error!("   ❌ Unique index {} not created: {}", label, e);
                    return Err(e);
                }
                Err(e) => log::warn!("   ⚠️  Index {} not created: {}", label, e),
            }
        }

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Next sequential id for `sequence`, shared by every writer through `counters`
    async fn next_id(&self, sequence: &str) -> StoreResult<i64> {
        let counter = self
            .collection::<Document>(COUNTERS)
            .find_one_and_update(doc! { "_id": sequence }, doc! { "$inc": { "seq": 1_i64 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(to_store_error)?
            .ok_or_else(|| StoreError::Backend(format!("counter {} missing after upsert", sequence)))?;

        counter
            .get_i64("seq")
            .map_err(|e| StoreError::Backend(format!("counter {}: {}", sequence, e)))
    }

    async fn find_by<T>(&self, collection: &str, filter: Document) -> StoreResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(collection)
            .find_one(filter)
            .await
            .map_err(to_store_error)
    }

    async fn list_by<T>(&self, collection: &str, filter: Document) -> StoreResult<Vec<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync,
    {
        self.collection::<T>(collection)
            .find(filter)
            .sort(doc! { "id": 1 })
            .await
            .map_err(to_store_error)?
            .try_collect()
            .await
            .map_err(to_store_error)
    }

    /// Adds each delta to its counter field of row `id`, clamping at zero
    async fn adjust_counters<T>(
        &self,
        collection: &str,
        id: i64,
        deltas: &[(&str, i64)],
    ) -> StoreResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send + Sync,
    {
        let mut set = doc! { "updated_at": chrono::Utc::now().timestamp() };
        for &(field, delta) in deltas {
            let current = format!("${}", field);
            set.insert(
                field,
                doc! { "$max": [0_i64, { "$add": [{ "$ifNull": [current, 0_i64] }, delta] }] },
            );
        }

        self.collection::<T>(collection)
            .find_one_and_update(doc! { "id": id }, vec![doc! { "$set": set }])
            .return_document(ReturnDocument::After)
            .await
            .map_err(to_store_error)
    }
}

/// Field name of the unique index a write collided with, if it was a duplicate key error
fn duplicate_field(err: &MongoError) -> Option<String> {
    let message = match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY => &e.message,
        ErrorKind::Command(e) if e.code == DUPLICATE_KEY => &e.message,
        _ => return None,
    };

    // E11000 duplicate key error collection: feedback.users index: username_1 dup key: ...
    let field = message
        .split("index: ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .map(|index| index.trim_end_matches("_1").to_string())
        .unwrap_or_else(|| "key".to_string());

    Some(field)
}

fn to_store_error(err: MongoError) -> StoreError {
    match duplicate_field(&err) {
        Some(field) => StoreError::Duplicate(field),
        None => StoreError::Backend(err.to_string()),
    }
}

#[async_trait]
impl FeedbackStore for MongoDB {
    async fn ping(&self) -> StoreResult<()> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(to_store_error)
    }

    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let user = User {
            id: self.next_id(USERS).await?,
            username: user.username,
            email: user.email,
            password: user.password_hash,
        };

        self.collection::<User>(USERS)
            .insert_one(&user)
            .await
            .map_err(to_store_error)?;

        Ok(user)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        self.find_by(USERS, doc! { "id": id }).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.find_by(USERS, doc! { "email": email }).await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        self.find_by(USERS, doc! { "username": username }).await
    }

    async fn insert_company(&self, company: NewCompany) -> StoreResult<Company> {
        let company = Company {
            id: self.next_id(COMPANIES).await?,
            name: company.name,
            headquarters: company.headquarters,
            industry: company.industry,
            user_id: company.user_id,
        };

        self.collection::<Company>(COMPANIES)
            .insert_one(&company)
            .await
            .map_err(to_store_error)?;

        Ok(company)
    }

    async fn find_company(&self, id: i64) -> StoreResult<Option<Company>> {
        self.find_by(COMPANIES, doc! { "id": id }).await
    }

    async fn find_company_by_name(&self, name: &str) -> StoreResult<Option<Company>> {
        self.find_by(COMPANIES, doc! { "name": name }).await
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        self.list_by(COMPANIES, doc! {}).await
    }

    async fn update_company(&self, id: i64, changes: CompanyChanges) -> StoreResult<Option<Company>> {
        let mut set = Document::new();
        if let Some(name) = changes.name {
            set.insert("name", name);
        }
        if let Some(headquarters) = changes.headquarters {
            set.insert("headquarters", headquarters);
        }
        if let Some(industry) = changes.industry {
            set.insert("industry", industry);
        }
        if set.is_empty() {
            return self.find_company(id).await;
        }

        self.collection::<Company>(COMPANIES)
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(to_store_error)
    }

    async fn delete_company(&self, id: i64) -> StoreResult<Option<Company>> {
        self.collection::<Company>(COMPANIES)
            .find_one_and_delete(doc! { "id": id })
            .await
            .map_err(to_store_error)
    }

    async fn insert_product(&self, product: NewProduct) -> StoreResult<Product> {
        let product = Product {
            id: self.next_id(PRODUCTS).await?,
            name: product.name,
            company_id: product.company_id,
            description: product.description,
        };

        self.collection::<Product>(PRODUCTS)
            .insert_one(&product)
            .await
            .map_err(to_store_error)?;

        Ok(product)
    }

    async fn find_product(&self, id: i64) -> StoreResult<Option<Product>> {
        self.find_by(PRODUCTS, doc! { "id": id }).await
    }

    async fn list_products(&self, company_id: i64) -> StoreResult<Vec<Product>> {
        self.list_by(PRODUCTS, doc! { "company_id": company_id }).await
    }

    async fn insert_suggestion(&self, suggestion: NewSuggestion) -> StoreResult<Suggestion> {
        let now = chrono::Utc::now().timestamp();
        let suggestion = Suggestion {
            id: self.next_id(SUGGESTIONS).await?,
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

        self.collection::<Suggestion>(SUGGESTIONS)
            .insert_one(&suggestion)
            .await
            .map_err(to_store_error)?;

        Ok(suggestion)
    }

    async fn find_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>> {
        self.find_by(SUGGESTIONS, doc! { "id": id }).await
    }

    async fn find_suggestion_by_title(&self, title: &str) -> StoreResult<Option<Suggestion>> {
        self.find_by(SUGGESTIONS, doc! { "title": title }).await
    }

    async fn update_suggestion(
        &self,
        id: i64,
        changes: SuggestionChanges,
    ) -> StoreResult<Option<Suggestion>> {
        let mut set = doc! { "updated_at": chrono::Utc::now().timestamp() };
        if let Some(upvotes) = changes.upvotes {
            set.insert("upvotes", upvotes);
        }
        if let Some(downvotes) = changes.downvotes {
            set.insert("downvotes", downvotes);
        }
        if let Some(title) = changes.title {
            set.insert("title", title);
        }
        if let Some(description) = changes.description {
            set.insert("description", description);
        }

        self.collection::<Suggestion>(SUGGESTIONS)
            .find_one_and_update(doc! { "id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
            .map_err(to_store_error)
    }

    async fn cast_vote(
        &self,
        id: i64,
        user_id: i64,
        vote: Vote,
    ) -> StoreResult<Option<(Suggestion, Option<Vote>)>> {
        let Some(suggestion) = self.find_suggestion(id).await? else {
            return Ok(None);
        };

        let votes = self.collection::<SuggestionVote>(SUGGESTION_VOTES);
        let key = doc! { "suggestion_id": id, "user_id": user_id };
        let previous = votes
            .find_one(key.clone())
            .await
            .map_err(to_store_error)?
            .map(|v| v.direction);
        let change = VoteChange::resolve(previous, vote);

        // Each write is conditioned on the vote we read, so a concurrent request
        // from the same user cannot be counted twice.
        let applied = match (previous, change.standing) {
            (None, Some(direction)) => {
                let record = SuggestionVote { suggestion_id: id, user_id, direction };
                match votes.insert_one(&record).await {
                    Ok(_) => true,
                    Err(e) if duplicate_field(&e).is_some() => false,
                    Err(e) => return Err(to_store_error(e)),
                }
            }
            (Some(previous), None) => {
                let mut filter = key.clone();
                filter.insert("direction", previous.to_string());
                votes.delete_one(filter).await.map_err(to_store_error)?.deleted_count == 1
            }
            (Some(previous), Some(direction)) => {
                let mut filter = key.clone();
                filter.insert("direction", previous.to_string());
                votes
                    .update_one(filter, doc! { "$set": { "direction": direction.to_string() } })
                    .await
                    .map_err(to_store_error)?
                    .modified_count
                    == 1
            }
            (None, None) => false,
        };

        if !applied {
            log::debug!("Vote of user {} on suggestion {} raced, keeping stored state", user_id, id);
            let standing = votes
                .find_one(key)
                .await
                .map_err(to_store_error)?
                .map(|v| v.direction);
            return Ok(Some((suggestion, standing)));
        }

        let updated = self
            .adjust_counters::<Suggestion>(
                SUGGESTIONS,
                id,
                &[("upvotes", change.upvotes), ("downvotes", change.downvotes)],
            )
            .await?;

        Ok(updated.map(|s| (s, change.standing)))
    }

    async fn list_suggestions(&self, filter: SuggestionFilter) -> StoreResult<Vec<Suggestion>> {
        let filter = match filter {
            SuggestionFilter::Product(product_id) => doc! { "product_id": product_id },
            SuggestionFilter::Company(company_id) => doc! { "company_id": company_id },
        };
        self.list_by(SUGGESTIONS, filter).await
    }

    async fn delete_suggestion(&self, id: i64) -> StoreResult<Option<Suggestion>> {
        let deleted = self
            .collection::<Suggestion>(SUGGESTIONS)
            .find_one_and_delete(doc! { "id": id })
            .await
            .map_err(to_store_error)?;

        if deleted.is_some() {
            self.collection::<SuggestionVote>(SUGGESTION_VOTES)
                .delete_many(doc! { "suggestion_id": id })
                .await
                .map_err(to_store_error)?;
        }
        Ok(deleted)
    }

    async fn insert_comment(&self, comment: NewComment) -> StoreResult<Comment> {
        let now = chrono::Utc::now().timestamp();
        let comment = Comment {
            id: self.next_id(COMMENTS).await?,
            suggestion_id: comment.suggestion_id,
            user_id: comment.user_id,
            message: comment.message,
            likes: 0,
            created_at: now,
            updated_at: now,
        };

        self.collection::<Comment>(COMMENTS)
            .insert_one(&comment)
            .await
            .map_err(to_store_error)?;

        Ok(comment)
    }

    async fn find_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        self.find_by(COMMENTS, doc! { "id": id }).await
    }

    async fn list_comments(&self, suggestion_id: i64) -> StoreResult<Vec<Comment>> {
        self.list_by(COMMENTS, doc! { "suggestion_id": suggestion_id }).await
    }

    async fn update_comment(&self, id: i64, message: String) -> StoreResult<Option<Comment>> {
        self.collection::<Comment>(COMMENTS)
            .find_one_and_update(
                doc! { "id": id },
                doc! { "$set": { "message": message, "updated_at": chrono::Utc::now().timestamp() } },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(to_store_error)
    }

    async fn delete_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        let deleted = self
            .collection::<Comment>(COMMENTS)
            .find_one_and_delete(doc! { "id": id })
            .await
            .map_err(to_store_error)?;

        if deleted.is_some() {
            self.collection::<CommentLike>(COMMENT_LIKES)
                .delete_many(doc! { "comment_id": id })
                .await
                .map_err(to_store_error)?;
        }
        Ok(deleted)
    }

    async fn toggle_comment_like(
        &self,
        id: i64,
        user_id: i64,
    ) -> StoreResult<Option<(Comment, bool)>> {
        let Some(comment) = self.find_comment(id).await? else {
            return Ok(None);
        };

        let likes = self.collection::<CommentLike>(COMMENT_LIKES);
        let key = doc! { "comment_id": id, "user_id": user_id };

        let removed = likes
            .delete_one(key)
            .await
            .map_err(to_store_error)?
            .deleted_count
            == 1;
        let delta = if removed {
            -1
        } else {
            match likes.insert_one(&CommentLike { comment_id: id, user_id }).await {
                Ok(_) => 1,
                // a concurrent like from the same user already counted
                Err(e) if duplicate_field(&e).is_some() => return Ok(Some((comment, true))),
                Err(e) => return Err(to_store_error(e)),
            }
        };

        let updated = self
            .adjust_counters::<Comment>(COMMENTS, id, &[("likes", delta)])
            .await?;

        Ok(updated.map(|c| (c, !removed)))
    }
}
