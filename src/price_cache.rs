use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{sync::RwLock, time::Instant};

use crate::{
    errors::CacheUnavailableError,
    record::{ProductId, Record},
};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Last known price pair for a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedPrice {
    pub original_price: f64,
    pub discounted_price: Option<f64>,
}

impl CachedPrice {
    pub fn of(record: &Record) -> Self {
        Self {
            original_price: record.original_price,
            discounted_price: record.discounted_price,
        }
    }

    /// Exact comparison: prices are currency amounts read off a page, so any
    /// difference at all is a real change.
    pub fn matches(&self, record: &Record) -> bool {
        self.original_price == record.original_price
            && self.discounted_price == record.discounted_price
    }
}

/// A backend holding cached prices with per-entry expiry.
///
/// Expired entries must read as `None`. A backend that cannot be reached must
/// return an error rather than `None`.
#[async_trait]
pub trait PriceStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<CachedPrice>, CacheUnavailableError>;

    /// Overwrites any existing entry and restarts its expiry.
    async fn set(&self, id: &str, price: CachedPrice, ttl: Duration) -> Result<(), CacheUnavailableError>;

    async fn clear(&self) -> Result<(), CacheUnavailableError>;
}

/// Change detection on top of a [`PriceStore`].
#[derive(Clone)]
pub struct PriceCache {
    store: Arc<dyn PriceStore>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        Self {
            store,
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub async fn get(&self, id: &str) -> Result<Option<CachedPrice>, CacheUnavailableError> {
        self.store.get(id).await
    }

    pub async fn set(
        &self,
        id: &str,
        original_price: f64,
        discounted_price: Option<f64>,
    ) -> Result<(), CacheUnavailableError> {
        let price = CachedPrice {
            original_price,
            discounted_price,
        };
        self.store.set(id, price, self.ttl).await
    }

    /// Records that are new to the cache or whose prices moved, in input order.
    pub async fn classify_changed(&self, records: &[Record]) -> Result<Vec<Record>, CacheUnavailableError> {
        let mut changed = Vec::new();
        for record in records {
            let unchanged = self
                .get(&record.id)
                .await?
                .is_some_and(|cached| cached.matches(record));
            if !unchanged {
                changed.push(record.clone());
            }
        }
        Ok(changed)
    }

    /// Stores the latest prices for every record, changed or not, which also
    /// pushes back their expiry.
    pub async fn update(&self, records: &[Record]) -> Result<(), CacheUnavailableError> {
        for record in records {
            self.set(&record.id, record.original_price, record.discounted_price)
                .await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), CacheUnavailableError> {
        self.store.clear().await
    }
}

/// In-process store. Used when no database is configured.
#[derive(Default)]
pub struct MemoryPriceStore {
    entries: RwLock<HashMap<ProductId, (CachedPrice, Option<Instant>)>>,
}

impl MemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceStore for MemoryPriceStore {
    async fn get(&self, id: &str) -> Result<Option<CachedPrice>, CacheUnavailableError> {
        let entries = self.entries.read().await;
        let live = entries.get(id).and_then(|(price, expires_at)| match expires_at {
            Some(expires_at) if Instant::now() >= *expires_at => None,
            _ => Some(*price),
        });
        Ok(live)
    }

    async fn set(&self, id: &str, price: CachedPrice, ttl: Duration) -> Result<(), CacheUnavailableError> {
        // None when the ttl is too large to represent: never expires.
        let expires_at = Instant::now().checked_add(ttl);
        self.entries
            .write()
            .await
            .insert(id.to_string(), (price, expires_at));
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheUnavailableError> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(title: &str, prices: &[f64]) -> Record {
        Record::from_prices(title, prices, None, Utc::now()).unwrap()
    }

    fn cache() -> PriceCache {
        PriceCache::new(Arc::new(MemoryPriceStore::new()))
    }

    #[tokio::test]
    async fn everything_is_changed_on_an_empty_cache() {
        let records = vec![record("a", &[10.0, 8.0]), record("b", &[3.0])];
        let changed = cache().classify_changed(&records).await.unwrap();
        assert_eq!(changed, records);
    }

    #[tokio::test]
    async fn nothing_is_changed_right_after_update() {
        let cache = cache();
        let records = vec![record("a", &[10.0, 8.0]), record("b", &[3.0])];
        cache.update(&records).await.unwrap();
        assert!(cache.classify_changed(&records).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn any_price_difference_is_a_change() {
        let cache = cache();
        cache.update(&[record("a", &[10.0, 8.0]), record("b", &[3.0])]).await.unwrap();

        let discount_moved = record("a", &[10.0, 7.99]);
        let discount_appeared = record("b", &[3.0, 2.0]);
        let changed = cache
            .classify_changed(&[discount_moved.clone(), discount_appeared.clone()])
            .await
            .unwrap();
        assert_eq!(changed, vec![discount_moved, discount_appeared]);
    }

    #[tokio::test]
    async fn set_overwrites_whole_entry() {
        let cache = cache();
        cache.set("x", 100.0, Some(80.0)).await.unwrap();
        cache.set("x", 90.0, None).await.unwrap();
        assert_eq!(
            cache.get("x").await.unwrap(),
            Some(CachedPrice {
                original_price: 90.0,
                discounted_price: None
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_read_as_absent() {
        let cache = cache().with_ttl(Duration::from_secs(60));
        cache.set("x", 100.0, Some(80.0)).await.unwrap();

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("x").await.unwrap().is_some());

        // Refreshing restarts the clock.
        cache.set("x", 100.0, Some(80.0)).await.unwrap();
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get("x").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = cache();
        cache.set("x", 1.0, None).await.unwrap();
        cache.clear().await.unwrap();
        assert!(cache.get("x").await.unwrap().is_none());
    }
}
