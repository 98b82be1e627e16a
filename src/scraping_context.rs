use std::sync::Arc;

use log::info;

use crate::{
    catalog_renderer::CatalogRenderer,
    config::HarvesterConfig,
    gateway::Gateway,
    notification::LogNotifier,
    orchestrator::ScrapeOrchestrator,
    page_scraper::PageScraper,
    pg_price_store::PgPriceStore,
    price_cache::{MemoryPriceStore, PriceCache, PriceStore},
    storage::JsonFileStore,
};

/// Production wiring of every collaborator, built once per process.
pub struct ScrapingContext {
    pub config: HarvesterConfig,
    pub gateway: Gateway,
}

impl ScrapingContext {
    pub async fn new(config: HarvesterConfig) -> anyhow::Result<Self> {
        let price_store: Arc<dyn PriceStore> = match &config.database_url {
            Some(database_url) => {
                let store = PgPriceStore::connect(database_url).await?;
                store.ensure_schema().await?;
                info!("Using Postgres price cache");
                Arc::new(store)
            }
            None => {
                info!("DATABASE_URL not set, using in-process price cache");
                Arc::new(MemoryPriceStore::new())
            }
        };

        let renderer = CatalogRenderer::new(config.catalog_url.clone(), config.requests_per_sec);
        let scraper = PageScraper::new(Arc::new(renderer))
            .with_retry_policy(config.retry_policy())
            .with_concurrency(config.page_concurrency);
        let cache = PriceCache::new(price_store).with_ttl(config.cache_ttl());
        let storage = JsonFileStore::new(&config.storage_path);

        let orchestrator =
            ScrapeOrchestrator::new(scraper, cache, Arc::new(storage), Arc::new(LogNotifier));
        let gateway = Gateway::new(config.api_token.clone(), orchestrator);
        Ok(ScrapingContext { config, gateway })
    }
}
