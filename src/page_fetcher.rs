use std::sync::Arc;

use log::{error, warn};

use crate::{
    record::Record,
    renderer::RenderSession,
    retry::{RetryPolicy, retry},
};

/// What one page contributed to a run.
#[derive(Debug)]
pub struct PageFetch {
    pub page: u32,
    pub records: Vec<Record>,
    pub succeeded: bool,
}

/// Fetches single pages through a session, retrying failed attempts.
pub struct PageFetcher {
    session: Arc<dyn RenderSession>,
    policy: RetryPolicy,
}

impl PageFetcher {
    pub fn new(session: Arc<dyn RenderSession>, policy: RetryPolicy) -> Self {
        Self { session, policy }
    }

    /// Never fails: an exhausted page comes back empty with `succeeded` unset
    /// so the rest of the run carries on.
    pub async fn fetch_page(&self, page: u32) -> PageFetch {
        let session = &self.session;
        let max_attempts = self.policy.max_attempts;
        let result = retry(&self.policy, |attempt| async move {
            session.fetch_page_records(page).await.inspect_err(|err| {
                warn!("Page {page} attempt {attempt}/{max_attempts} failed: {err}");
            })
        })
        .await;

        match result {
            Ok(records) => PageFetch {
                page,
                records,
                succeeded: true,
            },
            Err(_) => {
                error!("Failed to scrape page {page} after {max_attempts} attempts");
                PageFetch {
                    page,
                    records: Vec::new(),
                    succeeded: false,
                }
            }
        }
    }
}
