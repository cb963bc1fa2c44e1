use crate::types::{ArticleStore, CandidateRecord, Comment, PersistedRecord, StoreAdapter, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    // Insertion order; listing reverses it for newest first
    articles: Vec<PersistedRecord>,
    comments: Vec<Comment>,
}

/// Process-local store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with articles, as if created earlier in this order.
    pub async fn with_articles<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = CandidateRecord>,
    {
        let store = Self::new();
        {
            let mut inner = store.inner.write().await;
            inner
                .articles
                .extend(candidates.into_iter().map(PersistedRecord::from_candidate));
        }
        store
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    async fn list_all_titles(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.articles.iter().map(|a| a.title.clone()).collect())
    }

    async fn create(&self, record: CandidateRecord) -> Result<PersistedRecord, StoreError> {
        let persisted = PersistedRecord::from_candidate(record);
        self.inner.write().await.articles.push(persisted.clone());
        Ok(persisted)
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list_articles(&self, saved_only: bool) -> Result<Vec<PersistedRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .iter()
            .rev()
            .filter(|a| !saved_only || a.saved)
            .cloned()
            .collect())
    }

    async fn get_article(&self, id: Uuid) -> Result<PersistedRecord, StoreError> {
        let inner = self.inner.read().await;
        inner
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn set_saved(&self, id: Uuid, saved: bool) -> Result<PersistedRecord, StoreError> {
        let mut inner = self.inner.write().await;
        let article = inner
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound { id })?;
        article.saved = saved;
        Ok(article.clone())
    }

    async fn add_comment(&self, article_id: Uuid, body: String) -> Result<PersistedRecord, StoreError> {
        if body.trim().is_empty() {
            return Err(StoreError::Invalid("comment body is empty".to_string()));
        }

        let mut inner = self.inner.write().await;
        let comment = Comment::new(article_id, body);
        let article = inner
            .articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound { id: article_id })?;
        article.comments.push(comment.id);
        let updated = article.clone();
        inner.comments.push(comment);
        Ok(updated)
    }

    async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, StoreError> {
        let inner = self.inner.read().await;
        let article = inner
            .articles
            .iter()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound { id: article_id })?;
        Ok(article
            .comments
            .iter()
            .filter_map(|id| inner.comments.iter().find(|c| c.id == *id).cloned())
            .collect())
    }

    async fn delete_comment(&self, comment_id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let position = inner
            .comments
            .iter()
            .position(|c| c.id == comment_id)
            .ok_or(StoreError::NotFound { id: comment_id })?;
        let comment = inner.comments.remove(position);

        if let Some(article) = inner.articles.iter_mut().find(|a| a.id == comment.article_id) {
            article.comments.retain(|id| *id != comment_id);
        }
        Ok(())
    }
}
