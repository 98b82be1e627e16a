#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use price_harvester::{
    CacheUnavailableError, CachedPrice, DiscoveryError, FetchError, LaunchError, MemoryPriceStore,
    NotificationError, Notifier, PageScraper, PriceCache, PriceStore, ProductStore, Record,
    RenderSession, Renderer, RetryPolicy, ScrapeOrchestrator, ScrapeOutcome, StorageError,
};

pub fn record(id: &str, original_price: f64, discounted_price: Option<f64>) -> Record {
    Record {
        id: id.to_string(),
        title: format!("Product {id}"),
        original_price,
        discounted_price,
        image_ref: None,
        observed_at: Utc::now(),
    }
}

/// A scripted catalog. Pages not listed in `pages` render empty; pages in
/// `failures` fail that many times before succeeding (`u32::MAX` = always).
#[derive(Default)]
pub struct FakeCatalog {
    pub total_pages: Option<u32>,
    pub pages: HashMap<u32, Vec<Record>>,
    pub failures: HashMap<u32, u32>,
    pub fetch_delay: Duration,
    pub attempts: Mutex<HashMap<u32, u32>>,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub launch_proxy: Mutex<Option<String>>,
}

impl FakeCatalog {
    pub fn with_pages(total_pages: u32) -> Self {
        Self {
            total_pages: Some(total_pages),
            ..Self::default()
        }
    }

    pub fn page(mut self, page: u32, records: Vec<Record>) -> Self {
        self.pages.insert(page, records);
        self
    }

    pub fn failing(mut self, page: u32, times: u32) -> Self {
        self.failures.insert(page, times);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn attempts_for(&self, page: u32) -> u32 {
        self.attempts.lock().unwrap().get(&page).copied().unwrap_or(0)
    }
}

#[async_trait]
impl RenderSession for FakeCatalog {
    async fn discover_total_pages(&self) -> Result<u32, DiscoveryError> {
        self.total_pages
            .ok_or(DiscoveryError::MissingPagination { found: 0 })
    }

    async fn fetch_page_records(&self, page: u32) -> Result<Vec<Record>, FetchError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let count = attempts.entry(page).or_insert(0);
            *count += 1;
            *count
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.fetch_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let failures = self.failures.get(&page).copied().unwrap_or(0);
        if attempt <= failures {
            return Err(FetchError::EmptyGrid);
        }
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeRenderer(pub Arc<FakeCatalog>);

#[async_trait]
impl Renderer for FakeRenderer {
    async fn launch(&self, proxy: Option<&str>) -> Result<Arc<dyn RenderSession>, LaunchError> {
        self.0.launches.fetch_add(1, Ordering::SeqCst);
        *self.0.launch_proxy.lock().unwrap() = proxy.map(str::to_string);
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingStorage {
    pub saves: Mutex<Vec<Vec<Record>>>,
    pub fail: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn saves(&self) -> Vec<Vec<Record>> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProductStore for RecordingStorage {
    async fn save(&self, records: &[Record]) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.saves.lock().unwrap().push(records.to_vec());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Record>, StorageError> {
        Ok(self.saves.lock().unwrap().concat())
    }
}

/// Memory store that remembers which ids were written, or is unreachable.
#[derive(Default)]
pub struct RecordingPriceStore {
    pub inner: MemoryPriceStore,
    pub sets: Mutex<Vec<String>>,
    pub unreachable: bool,
}

impl RecordingPriceStore {
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn sets(&self) -> Vec<String> {
        self.sets.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CacheUnavailableError> {
        if self.unreachable {
            return Err(CacheUnavailableError::new("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl PriceStore for RecordingPriceStore {
    async fn get(&self, id: &str) -> Result<Option<CachedPrice>, CacheUnavailableError> {
        self.check()?;
        self.inner.get(id).await
    }

    async fn set(&self, id: &str, price: CachedPrice, ttl: Duration) -> Result<(), CacheUnavailableError> {
        self.check()?;
        self.sets.lock().unwrap().push(id.to_string());
        self.inner.set(id, price, ttl).await
    }

    async fn clear(&self) -> Result<(), CacheUnavailableError> {
        self.check()?;
        self.inner.clear().await
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub outcomes: Mutex<Vec<ScrapeOutcome>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, outcome: &ScrapeOutcome) -> Result<(), NotificationError> {
        self.outcomes.lock().unwrap().push(outcome.clone());
        if self.fail {
            return Err(NotificationError("webhook down".to_string()));
        }
        Ok(())
    }
}

/// Everything a flow test wants to poke at afterwards.
pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub storage: Arc<RecordingStorage>,
    pub prices: Arc<RecordingPriceStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub orchestrator: ScrapeOrchestrator,
}

pub struct HarnessBuilder {
    catalog: FakeCatalog,
    storage: RecordingStorage,
    prices: RecordingPriceStore,
    notifier: RecordingNotifier,
    policy: RetryPolicy,
    concurrency: usize,
}

impl HarnessBuilder {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self {
            catalog,
            storage: RecordingStorage::default(),
            prices: RecordingPriceStore::default(),
            notifier: RecordingNotifier::default(),
            policy: RetryPolicy::default(),
            concurrency: 3,
        }
    }

    pub fn storage(mut self, storage: RecordingStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn prices(mut self, prices: RecordingPriceStore) -> Self {
        self.prices = prices;
        self
    }

    pub fn notifier(mut self, notifier: RecordingNotifier) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn build(self) -> Harness {
        let catalog = Arc::new(self.catalog);
        let storage = Arc::new(self.storage);
        let prices = Arc::new(self.prices);
        let notifier = Arc::new(self.notifier);

        let scraper = PageScraper::new(Arc::new(FakeRenderer(catalog.clone())))
            .with_retry_policy(self.policy)
            .with_concurrency(self.concurrency);
        let orchestrator = ScrapeOrchestrator::new(
            scraper,
            PriceCache::new(prices.clone()),
            storage.clone(),
            notifier.clone(),
        );

        Harness {
            catalog,
            storage,
            prices,
            notifier,
            orchestrator,
        }
    }
}
