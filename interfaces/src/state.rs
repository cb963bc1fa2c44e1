use async_trait::async_trait;
use uuid::Uuid;

use crate::defs::{CandidateRecord, Comment, PersistedRecord, StoreError};

/// The two store capabilities an ingestion run depends on.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Every title currently persisted, in no particular order.
    async fn list_all_titles(&self) -> Result<Vec<String>, StoreError>;

    /// Persist a new article. Implementations do not check for an existing title.
    async fn create(&self, record: CandidateRecord) -> Result<PersistedRecord, StoreError>;
}

/// Article management on top of ingestion: listing, the saved flag and comments.
#[async_trait]
pub trait ArticleStore: StoreAdapter {
    /// All articles newest first, optionally only the saved ones.
    async fn list_articles(&self, saved_only: bool) -> Result<Vec<PersistedRecord>, StoreError>;

    async fn get_article(&self, id: Uuid) -> Result<PersistedRecord, StoreError>;

    async fn set_saved(&self, id: Uuid, saved: bool) -> Result<PersistedRecord, StoreError>;

    /// Create a comment and append its id to the article. Returns the updated article.
    async fn add_comment(&self, article_id: Uuid, body: String) -> Result<PersistedRecord, StoreError>;

    /// Comments of an article in the order they were appended.
    async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, StoreError>;

    async fn delete_comment(&self, comment_id: Uuid) -> Result<(), StoreError>;
}
