use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    errors::CacheUnavailableError,
    price_cache::{CachedPrice, PriceStore},
};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS product_prices (
    product_id TEXT PRIMARY KEY,
    original_price DOUBLE PRECISION NOT NULL,
    discounted_price DOUBLE PRECISION,
    expires_at TIMESTAMPTZ NOT NULL
)";

/// Price cache kept in Postgres, shared between processes.
pub struct PgPriceStore {
    pool: PgPool,
}

impl PgPriceStore {
    pub async fn connect(database_url: &str) -> Result<Self, CacheUnavailableError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(CacheUnavailableError::new)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<(), CacheUnavailableError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(CacheUnavailableError::new)?;
        Ok(())
    }
}

#[async_trait]
impl PriceStore for PgPriceStore {
    async fn get(&self, id: &str) -> Result<Option<CachedPrice>, CacheUnavailableError> {
        let row: Option<(f64, Option<f64>)> = sqlx::query_as(
            "SELECT original_price, discounted_price FROM product_prices
             WHERE product_id = $1 AND expires_at > now()",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CacheUnavailableError::new)?;

        Ok(row.map(|(original_price, discounted_price)| CachedPrice {
            original_price,
            discounted_price,
        }))
    }

    async fn set(&self, id: &str, price: CachedPrice, ttl: Duration) -> Result<(), CacheUnavailableError> {
        sqlx::query(
            "INSERT INTO product_prices (product_id, original_price, discounted_price, expires_at)
             VALUES ($1, $2, $3, now() + make_interval(secs => $4))
             ON CONFLICT (product_id) DO UPDATE SET
                original_price = EXCLUDED.original_price,
                discounted_price = EXCLUDED.discounted_price,
                expires_at = EXCLUDED.expires_at",
        )
        .bind(id)
        .bind(price.original_price)
        .bind(price.discounted_price)
        .bind(ttl.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(CacheUnavailableError::new)?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheUnavailableError> {
        sqlx::query("DELETE FROM product_prices")
            .execute(&self.pool)
            .await
            .map_err(CacheUnavailableError::new)?;
        Ok(())
    }
}
