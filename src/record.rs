use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type ProductId = String;

/// One catalog item as observed on a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: ProductId,
    pub title: String,
    /// Always the higher of the observed prices.
    pub original_price: f64,
    /// The lower observed price, absent when the page showed only one.
    pub discounted_price: Option<f64>,
    pub image_ref: Option<String>,
    pub observed_at: DateTime<Utc>,
}

impl Record {
    /// Builds a record from the raw prices found next to a product, in page
    /// order. Pages don't agree on which price comes first, so the pair is
    /// ordered here rather than trusted.
    pub fn from_prices(
        title: impl Into<String>,
        prices: &[f64],
        image_ref: Option<String>,
        observed_at: DateTime<Utc>,
    ) -> Option<Self> {
        let (original_price, discounted_price) = match prices {
            [] => return None,
            [only] => (*only, None),
            [first, second, ..] => (first.max(*second), Some(first.min(*second))),
        };
        let title = title.into();
        Some(Self {
            id: product_id(&title),
            title,
            original_price,
            discounted_price,
            image_ref,
            observed_at,
        })
    }
}

/// Identical titles share an id.
pub fn product_id(title: &str) -> ProductId {
    hex::encode(Sha256::digest(title.as_bytes()))
}
