use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use scraper::{ElementRef, Html, Selector};
use tokio::sync::RwLock;

use crate::{
    errors::{DiscoveryError, ExtractionSkipped, FetchError, LaunchError},
    record::Record,
    renderer::{RenderSession, Renderer},
    requests::RequestClient,
    text_manipulators::{PriceParser, clean_title, extract_text},
};

const SVG_PLACEHOLDER: &str = "data:image/svg+xml";
// Lazy-loading themes move the real URL out of `src`.
const IMAGE_ATTRS: [&str; 3] = ["data-lazy-src", "data-src", "src"];

/// Renders a WooCommerce-style shop over plain HTTP.
pub struct CatalogRenderer {
    catalog_url: String,
    requests_per_sec: u32,
}

impl CatalogRenderer {
    /// `catalog_url` is the shop root, e.g. `https://dentalstall.com/shop/`.
    pub fn new(catalog_url: impl Into<String>, requests_per_sec: u32) -> Self {
        let mut catalog_url = catalog_url.into();
        if !catalog_url.ends_with('/') {
            catalog_url.push('/');
        }
        Self {
            catalog_url,
            requests_per_sec,
        }
    }
}

#[async_trait]
impl Renderer for CatalogRenderer {
    async fn launch(&self, proxy: Option<&str>) -> Result<Arc<dyn RenderSession>, LaunchError> {
        let client = RequestClient::new(proxy, self.requests_per_sec)?;
        let extractor = CatalogExtractor::new()?;
        Ok(Arc::new(CatalogSession {
            client: RwLock::new(Some(client)),
            catalog_url: self.catalog_url.clone(),
            extractor,
        }))
    }
}

struct CatalogSession {
    // Taken on close; in-flight fetches hold the read lock until they finish.
    client: RwLock<Option<RequestClient>>,
    catalog_url: String,
    extractor: CatalogExtractor,
}

impl CatalogSession {
    fn page_url(&self, page: u32) -> String {
        format!("{}page/{}/", self.catalog_url, page)
    }
}

#[async_trait]
impl RenderSession for CatalogSession {
    async fn discover_total_pages(&self) -> Result<u32, DiscoveryError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or(DiscoveryError::SessionClosed)?;
        let html = client.fetch_url_body(&self.catalog_url).await?;
        self.extractor.total_pages(&html)
    }

    async fn fetch_page_records(&self, page: u32) -> Result<Vec<Record>, FetchError> {
        let client = self.client.read().await;
        let client = client.as_ref().ok_or(FetchError::SessionClosed)?;
        let url = self.page_url(page);
        debug!("Fetching catalog page {page}: {url}");
        let html = client.fetch_url_body(&url).await?;
        self.extractor.records(&html, page, Utc::now())
    }

    async fn close(&self) {
        self.client.write().await.take();
    }
}

/// The site-specific part: where things live in the catalog markup.
pub struct CatalogExtractor {
    pagination: Selector,
    product: Selector,
    thumbnail: Selector,
    amount: Selector,
    price_parser: PriceParser,
}

impl CatalogExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            pagination: parse_selector(".page-numbers")?,
            product: parse_selector(".product")?,
            thumbnail: parse_selector("img.attachment-woocommerce_thumbnail")?,
            amount: parse_selector("span.amount")?,
            price_parser: PriceParser::new()?,
        })
    }

    /// The pagination control ends with a "next" arrow, so the last page
    /// number is the second-to-last entry.
    pub fn total_pages(&self, html: &str) -> Result<u32, DiscoveryError> {
        let document = Html::parse_document(html);
        let entries: Vec<String> = document
            .select(&self.pagination)
            .map(|node| extract_text(node).trim().to_string())
            .collect();
        let [.., last_page, _next] = entries.as_slice() else {
            return Err(DiscoveryError::MissingPagination {
                found: entries.len(),
            });
        };
        last_page
            .parse()
            .map_err(|_| DiscoveryError::NotAPageNumber(last_page.clone()))
    }

    /// A page without a single product element never finished rendering and
    /// counts as a failed attempt. Individual bad items are skipped.
    pub fn records(
        &self,
        html: &str,
        page: u32,
        observed_at: DateTime<Utc>,
    ) -> Result<Vec<Record>, FetchError> {
        let document = Html::parse_document(html);
        let mut products = document.select(&self.product).peekable();
        if products.peek().is_none() {
            return Err(FetchError::EmptyGrid);
        }

        let mut records = Vec::new();
        for (position, product) in products.enumerate() {
            match self.record(product, observed_at) {
                Ok(record) => records.push(record),
                Err(skipped) => warn!("Page {page}, item {position}: {skipped}"),
            }
        }
        Ok(records)
    }

    fn record(&self, product: ElementRef, observed_at: DateTime<Utc>) -> Result<Record, ExtractionSkipped> {
        let thumbnail = product
            .select(&self.thumbnail)
            .next()
            .ok_or(ExtractionSkipped::MissingThumbnail)?;
        let title = thumbnail
            .value()
            .attr("alt")
            .map(clean_title)
            .filter(|title| !title.is_empty())
            .ok_or(ExtractionSkipped::MissingTitle)?;
        let prices: Vec<f64> = product
            .select(&self.amount)
            .filter_map(|amount| self.price_parser.parse(&extract_text(amount)))
            .collect();
        Record::from_prices(title, &prices, image_url(thumbnail), observed_at)
            .ok_or(ExtractionSkipped::MissingPrice)
    }
}

fn image_url(img: ElementRef) -> Option<String> {
    let element = img.value();
    IMAGE_ATTRS
        .iter()
        .filter_map(|attr| element.attr(attr))
        .find(|url| !url.is_empty())
        .filter(|url| !url.starts_with(SVG_PLACEHOLDER))
        .map(str::to_string)
}

fn parse_selector(css: &'static str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {css:?}: {err}"))
}
