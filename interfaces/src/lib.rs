pub mod defs;
pub mod state;

pub use defs::{CandidateRecord, Comment, FetchError, HtmlFetcher, PersistedRecord, StoreError};
pub use state::{ArticleStore, StoreAdapter};
