use async_trait::async_trait;
use log::info;

use crate::{errors::NotificationError, settings::ScrapeOutcome};

/// Best-effort announcement of a finished run.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, outcome: &ScrapeOutcome) -> Result<(), NotificationError>;
}

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, outcome: &ScrapeOutcome) -> Result<(), NotificationError> {
        info!(
            "Scraping completed. Total products: {}, New products: {}, Updated products: {}, Failed pages: {:?}",
            outcome.total_products,
            outcome.new_products,
            outcome.updated_products,
            outcome.failed_pages
        );
        Ok(())
    }
}
