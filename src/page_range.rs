use log::info;

use crate::{errors::DiscoveryError, renderer::RenderSession, settings::ScrapeSettings};

/// Number of pages to scrape this run: what the catalog advertises, capped by
/// the caller's limit.
///
/// A discovery failure fails the run even when `max_pages` is set; the limit
/// is an upper bound, not a substitute for discovery.
pub async fn resolve_page_count(
    session: &dyn RenderSession,
    settings: &ScrapeSettings,
) -> Result<u32, DiscoveryError> {
    let discovered = session.discover_total_pages().await?;
    let total = clamp_page_count(discovered, settings.max_pages);
    match settings.max_pages {
        Some(limit) => info!("Catalog advertises {discovered} pages, scraping {total} (limit {limit})"),
        None => info!("Catalog advertises {discovered} pages"),
    }
    Ok(total)
}

pub fn clamp_page_count(discovered: u32, max_pages: Option<u32>) -> u32 {
    match max_pages {
        Some(limit) => discovered.min(limit),
        None => discovered,
    }
}
