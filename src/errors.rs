use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The catalog's page count could not be determined. Fatal for a run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("catalog index could not be fetched: {0}")]
    Request(#[from] reqwest::Error),
    #[error("pagination control not found (expected at least two page links, found {found})")]
    MissingPagination { found: usize },
    #[error("pagination entry {0:?} is not a page number")]
    NotAPageNumber(String),
    #[error("rendering session is closed")]
    SessionClosed,
}

/// A single attempt at fetching one page failed. Retried, then isolated.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no products rendered on page")]
    EmptyGrid,
    #[error("rendering session is closed")]
    SessionClosed,
}

/// One malformed item inside an otherwise readable page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionSkipped {
    #[error("item has no thumbnail image")]
    MissingThumbnail,
    #[error("item has no title")]
    MissingTitle,
    #[error("item has no readable price")]
    MissingPrice,
}

#[derive(Debug, Error)]
#[error("rendering session could not be launched: {0:#}")]
pub struct LaunchError(#[from] pub anyhow::Error);

/// The price cache backend could not be reached. Never read as "not cached".
#[derive(Debug, Error)]
#[error("price cache unavailable: {0}")]
pub struct CacheUnavailableError(#[source] pub BoxError);

impl CacheUnavailableError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("product store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("product store contents are not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Only ever logged.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotificationError(pub String);

/// Everything that fails a whole run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page count discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    CacheUnavailable(#[from] CacheUnavailableError),
    #[error("persisting changed products failed: {0}")]
    Persistence(#[from] StorageError),
}
