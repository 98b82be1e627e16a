use std::sync::Arc;

use log::{error, info};

use crate::{
    errors::ScrapeError,
    notification::Notifier,
    page_scraper::{PageScraper, ScrapedCatalog},
    price_cache::PriceCache,
    settings::{ScrapeOutcome, ScrapeSettings},
    storage::ProductStore,
};

/// Runs a full harvest: scrape, detect price changes, persist the changes,
/// refresh the cache and report.
pub struct ScrapeOrchestrator {
    scraper: PageScraper,
    cache: PriceCache,
    storage: Arc<dyn ProductStore>,
    notifier: Arc<dyn Notifier>,
}

impl ScrapeOrchestrator {
    pub fn new(
        scraper: PageScraper,
        cache: PriceCache,
        storage: Arc<dyn ProductStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            scraper,
            cache,
            storage,
            notifier,
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    pub async fn run(&self, settings: &ScrapeSettings) -> Result<ScrapeOutcome, ScrapeError> {
        let catalog = self.scraper.scrape(settings).await?;
        self.process(catalog).await
    }

    /// Everything after the fetch stage.
    ///
    /// A failed save aborts before the cache is touched, so the unsaved
    /// changes are detected again on the next run.
    pub async fn process(&self, catalog: ScrapedCatalog) -> Result<ScrapeOutcome, ScrapeError> {
        let ScrapedCatalog {
            records,
            failed_pages,
        } = catalog;

        let changed = self.cache.classify_changed(&records).await?;
        if !changed.is_empty() {
            self.storage.save(&changed).await?;
            info!("Saved {} new or repriced products", changed.len());
        }

        self.cache.update(&records).await?;

        let outcome = ScrapeOutcome::new(records.len(), changed.len(), failed_pages);
        if let Err(err) = self.notifier.notify(&outcome).await {
            error!("{err}");
        }
        Ok(outcome)
    }
}
