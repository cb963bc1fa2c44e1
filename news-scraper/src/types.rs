use serde::Serialize;
// Capability contracts and the shared record types live in the interfaces crate
pub use interfaces::defs::{CandidateRecord, Comment, FetchError, HtmlFetcher, PersistedRecord, StoreError};
pub use interfaces::state::{ArticleStore, StoreAdapter};

/// Why a single candidate did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    MissingTitle,
    Store(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::MissingTitle => write!(f, "article has no title"),
            FailureReason::Store(message) => write!(f, "{}", message),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersistFailure {
    pub candidate: CandidateRecord,
    pub reason: FailureReason,
}

/// Errors that end an ingestion run before anything is persisted.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("could not load known titles: {0}")]
    KnownTitles(#[source] StoreError),

    #[error("could not fetch source page: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Ingestion failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScraperError>;
