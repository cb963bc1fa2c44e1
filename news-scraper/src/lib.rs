pub mod types;
pub mod config;
pub mod fetcher;
pub mod extractor;
pub mod dedup;
pub mod orchestrator;
pub mod store;

pub use types::*;
pub use config::{FetchConfig, ScraperConfig};
pub use fetcher::Fetcher;
pub use extractor::{ImageTier, RecordExtractor};
pub use dedup::{dedupe, KnownTitles};
pub use orchestrator::{IngestionOrchestrator, IngestionReport};
pub use store::{MemoryStore, PgArticleStore};
