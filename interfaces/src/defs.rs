use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An article as read off the listing page, before it has been committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub image: String,
}

impl CandidateRecord {
    /// A record without a title cannot be deduplicated or stored.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub link: String,
    pub image: String,
    pub saved: bool,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PersistedRecord {
    pub fn from_candidate(candidate: CandidateRecord) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: candidate.title,
            summary: candidate.summary,
            link: candidate.link,
            image: candidate.image,
            saved: false,
            comments: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(article_id: Uuid, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            article_id,
            body,
            created_at: Utc::now(),
        }
    }
}

// Object style note:
// Fetchers and stores are capabilities handed to the ingestion pipeline.
// They must be shareable across tasks, so every implementation is Send + Sync
// and takes &self; interior state (connection pools, clients) lives behind
// the implementation.

/// Retrieves raw markup for a page.
#[async_trait]
pub trait HtmlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("page at {url} exceeds limit: {size_mb}MB")]
    TooLarge { url: String, size_mb: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("not found: {id}")]
    NotFound { id: Uuid },

    #[error("invalid record: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}
