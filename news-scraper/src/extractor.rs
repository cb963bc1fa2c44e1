use crate::types::{CandidateRecord, Result, ScraperError};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

const ARTICLE_SELECTOR: &str = "article";
const SUMMARY_SELECTOR: &str = "h2";
const IMAGE_SELECTOR: &str = "img";

const TITLE_ATTR: &str = "data-title";
const LINK_ATTR: &str = "data-url";

/// One place an article's image may come from. Tiers are tried in order and
/// the first one that finds something wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTier {
    /// An attribute of the article's first `img`, used when present and non-empty.
    ImgAttribute(String),
    /// A fixed path. Always found.
    Fixed(String),
}

impl ImageTier {
    fn resolve(&self, img: Option<&ElementRef<'_>>) -> Option<String> {
        match self {
            ImageTier::ImgAttribute(name) => img
                .and_then(|img| img.value().attr(name))
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string()),
            ImageTier::Fixed(path) => Some(path.clone()),
        }
    }
}

/// The source stores lazy-loaded images under `data-src` and eager ones under `src`.
pub fn default_image_tiers(default_image: &str) -> Vec<ImageTier> {
    vec![
        ImageTier::ImgAttribute("data-src".to_string()),
        ImageTier::ImgAttribute("src".to_string()),
        ImageTier::Fixed(default_image.to_string()),
    ]
}

/// Turns a listing page into candidate records, one per `article` element.
///
/// Extraction never drops an element: missing title, summary or link come
/// out as empty strings, and the image always resolves to something.
pub struct RecordExtractor {
    article: Selector,
    summary: Selector,
    image: Selector,
    image_tiers: Vec<ImageTier>,
    default_image: String,
}

impl RecordExtractor {
    pub fn new(default_image: &str) -> Result<Self> {
        Self::with_image_tiers(default_image, default_image_tiers(default_image))
    }

    pub fn with_image_tiers(default_image: &str, image_tiers: Vec<ImageTier>) -> Result<Self> {
        Ok(Self {
            article: parse_selector(ARTICLE_SELECTOR)?,
            summary: parse_selector(SUMMARY_SELECTOR)?,
            image: parse_selector(IMAGE_SELECTOR)?,
            image_tiers,
            default_image: default_image.to_string(),
        })
    }

    /// Parse the page and collect its records in document order.
    pub fn extract(&self, raw_html: &str) -> Vec<CandidateRecord> {
        debug!("Parsing listing page ({} bytes)", raw_html.len());

        let document = Html::parse_document(raw_html);
        let records: Vec<CandidateRecord> = self.records(&document).collect();

        info!("Extracted {} candidate records", records.len());
        records
    }

    /// Lazily walk an already parsed document.
    pub fn records<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = CandidateRecord> + 'a {
        document
            .select(&self.article)
            .map(move |element| self.record_from(element))
    }

    fn record_from(&self, element: ElementRef<'_>) -> CandidateRecord {
        let title = element.value().attr(TITLE_ATTR).unwrap_or_default().to_string();
        if title.is_empty() {
            debug!("Article element without {}", TITLE_ATTR);
        }

        let summary = element
            .select(&self.summary)
            .flat_map(|heading| heading.text())
            .collect::<String>()
            .trim()
            .to_string();

        let link = element.value().attr(LINK_ATTR).unwrap_or_default().to_string();

        let img = element.select(&self.image).next();
        let image = self.resolve_image(img.as_ref());

        CandidateRecord { title, summary, link, image }
    }

    fn resolve_image(&self, img: Option<&ElementRef<'_>>) -> String {
        self.image_tiers
            .iter()
            .find_map(|tier| tier.resolve(img))
            .unwrap_or_else(|| self.default_image.clone())
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::Config(format!("invalid selector '{}': {}", selector, e)))
}
