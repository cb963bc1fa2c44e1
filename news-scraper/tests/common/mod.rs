#![allow(dead_code)]

use async_trait::async_trait;
use news_scraper::{CandidateRecord, FetchError, HtmlFetcher, MemoryStore, PersistedRecord, StoreAdapter, StoreError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const SOURCE_URL: &str = "https://www.nhl.com/news";
pub const DEFAULT_IMAGE: &str = "/assets/images/default.png";

/// Builds one listing-page `article` element the way the source lays them out.
pub fn article_html(title: &str, summary: &str, link: &str, data_src: Option<&str>, src: Option<&str>) -> String {
    let mut img = String::from("<img");
    if let Some(data_src) = data_src {
        img.push_str(&format!(r#" data-src="{}""#, data_src));
    }
    if let Some(src) = src {
        img.push_str(&format!(r#" src="{}""#, src));
    }
    img.push('>');

    format!(
        r#"<article data-title="{}" data-url="{}"><div class="mugshot">{}</div><h2>{}</h2></article>"#,
        title, link, img, summary
    )
}

pub fn page(articles: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>News</title></head><body><main>{}</main></body></html>",
        articles.concat()
    )
}

/// A page of `n` well-formed articles titled "Story 1".."Story n".
pub fn numbered_page(n: usize) -> String {
    let articles: Vec<String> = (1..=n)
        .map(|i| {
            article_html(
                &format!("Story {}", i),
                &format!("Summary {}", i),
                &format!("https://www.nhl.com/news/story-{}", i),
                Some(&format!("https://cms.nhl.com/images/{}.jpg", i)),
                None,
            )
        })
        .collect();
    page(&articles)
}

pub fn candidate(title: &str) -> CandidateRecord {
    CandidateRecord {
        title: title.to_string(),
        summary: format!("About {}", title),
        link: format!("https://www.nhl.com/news/{}", title.to_lowercase().replace(' ', "-")),
        image: DEFAULT_IMAGE.to_string(),
    }
}

/// Serves a fixed page and counts how often it was asked.
pub struct StaticPage {
    html: String,
    calls: AtomicUsize,
}

impl StaticPage {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HtmlFetcher for StaticPage {
    async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}

pub struct UnreachableSource;

#[async_trait]
impl HtmlFetcher for UnreachableSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Err(FetchError::Transport { url: url.to_string(), message: "connection refused".to_string() })
    }
}

/// Delegates to a MemoryStore but refuses to create the listed titles.
pub struct FlakyStore {
    pub inner: MemoryStore,
    reject: HashSet<String>,
    pub create_calls: AtomicUsize,
}

impl FlakyStore {
    pub fn rejecting(titles: &[&str]) -> Self {
        Self {
            inner: MemoryStore::new(),
            reject: titles.iter().map(|t| t.to_string()).collect(),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl StoreAdapter for FlakyStore {
    async fn list_all_titles(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_all_titles().await
    }

    async fn create(&self, record: CandidateRecord) -> Result<PersistedRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject.contains(&record.title) {
            return Err(StoreError::Invalid(format!("write rejected for '{}'", record.title)));
        }
        self.inner.create(record).await
    }
}

/// A store whose title lookup always fails.
pub struct UnavailableStore {
    pub create_calls: AtomicUsize,
}

impl UnavailableStore {
    pub fn new() -> Self {
        Self { create_calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl StoreAdapter for UnavailableStore {
    async fn list_all_titles(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::backend(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "database is down",
        )))
    }

    async fn create(&self, _record: CandidateRecord) -> Result<PersistedRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Invalid("unreachable".to_string()))
    }
}

#[async_trait]
pub trait MemoryStoreExt {
    async fn titles_sorted(&self) -> Vec<String>;
}

#[async_trait]
impl MemoryStoreExt for MemoryStore {
    async fn titles_sorted(&self) -> Vec<String> {
        let mut titles = self.list_all_titles().await.unwrap_or_default();
        titles.sort();
        titles
    }
}
