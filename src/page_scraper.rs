use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::info;

use crate::{
    errors::ScrapeError,
    page_fetcher::{PageFetch, PageFetcher},
    page_range::resolve_page_count,
    record::Record,
    renderer::{RenderSession, Renderer, SessionGuard},
    retry::RetryPolicy,
    settings::ScrapeSettings,
};

pub const DEFAULT_PAGE_CONCURRENCY: usize = 3;

/// Every record fetched in a run plus the pages that gave up.
#[derive(Debug, Default)]
pub struct ScrapedCatalog {
    pub records: Vec<Record>,
    /// Ascending.
    pub failed_pages: Vec<u32>,
}

impl ScrapedCatalog {
    fn collect(fetches: Vec<PageFetch>) -> Self {
        let mut catalog = Self::default();
        for fetch in fetches {
            if fetch.succeeded {
                catalog.records.extend(fetch.records);
            } else {
                catalog.failed_pages.push(fetch.page);
            }
        }
        catalog.failed_pages.sort_unstable();
        catalog
    }
}

/// Scrapes every page of the catalog with a bounded number of fetches in
/// flight at once.
pub struct PageScraper {
    renderer: Arc<dyn Renderer>,
    policy: RetryPolicy,
    concurrency: usize,
}

impl PageScraper {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            policy: RetryPolicy::default(),
            concurrency: DEFAULT_PAGE_CONCURRENCY,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Launches one session for the whole run and closes it once every page
    /// task has finished, whether the run succeeded or not.
    pub async fn scrape(&self, settings: &ScrapeSettings) -> Result<ScrapedCatalog, ScrapeError> {
        let session = self.renderer.launch(settings.proxy.as_deref()).await?;
        let guard = SessionGuard::new(session);
        let result = self.scrape_pages(guard.session(), settings).await;
        guard.close().await;
        result
    }

    async fn scrape_pages(
        &self,
        session: &Arc<dyn RenderSession>,
        settings: &ScrapeSettings,
    ) -> Result<ScrapedCatalog, ScrapeError> {
        let total_pages = resolve_page_count(session.as_ref(), settings).await?;
        let fetcher = PageFetcher::new(Arc::clone(session), self.policy);

        // buffer_unordered is the admission gate: at most `concurrency` page
        // futures are polled at a time, and it lives only as long as this run.
        let fetches: Vec<PageFetch> = stream::iter(1..=total_pages)
            .map(|page| fetcher.fetch_page(page))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let catalog = ScrapedCatalog::collect(fetches);
        info!(
            "Fetched {} products from {} pages ({} failed)",
            catalog.records.len(),
            total_pages,
            catalog.failed_pages.len()
        );
        Ok(catalog)
    }
}
