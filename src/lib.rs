mod catalog_renderer;
mod config;
mod errors;
mod gateway;
mod notification;
mod orchestrator;
mod page_fetcher;
mod page_range;
mod page_scraper;
mod pg_price_store;
mod price_cache;
mod ratelimit;
mod record;
mod renderer;
mod requests;
mod retry;
mod scraping_context;
mod settings;
mod storage;
mod text_manipulators;

pub use catalog_renderer::{CatalogExtractor, CatalogRenderer};
pub use config::{HarvesterConfig, LoadFromEnv};
pub use errors::{
    CacheUnavailableError, DiscoveryError, ExtractionSkipped, FetchError, LaunchError,
    NotificationError, ScrapeError, StorageError,
};
pub use gateway::{Gateway, GatewayError};
pub use notification::{LogNotifier, Notifier};
pub use orchestrator::ScrapeOrchestrator;
pub use page_fetcher::{PageFetch, PageFetcher};
pub use page_range::{clamp_page_count, resolve_page_count};
pub use page_scraper::{DEFAULT_PAGE_CONCURRENCY, PageScraper, ScrapedCatalog};
pub use pg_price_store::PgPriceStore;
pub use price_cache::{CachedPrice, DEFAULT_CACHE_TTL, MemoryPriceStore, PriceCache, PriceStore};
pub use record::{ProductId, Record, product_id};
pub use renderer::{RenderSession, Renderer, SessionGuard};
pub use retry::{RetryPolicy, retry};
pub use scraping_context::ScrapingContext;
pub use settings::{ScrapeOutcome, ScrapeSettings};
pub use storage::{JsonFileStore, ProductStore};
