use serde::{Deserialize, Serialize};

/// Caller input for one run. Also the JSON body of a scrape trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeSettings {
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Handed to the renderer as-is.
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Summary of a finished run. A run with failed pages is still a successful
/// run; `failed_pages` is the only place degraded completeness shows up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeOutcome {
    pub total_products: usize,
    pub new_products: usize,
    pub updated_products: usize,
    pub failed_pages: Vec<u32>,
}

impl ScrapeOutcome {
    pub fn new(total_products: usize, new_products: usize, mut failed_pages: Vec<u32>) -> Self {
        failed_pages.sort_unstable();
        failed_pages.dedup();
        Self {
            total_products,
            new_products,
            updated_products: total_products.saturating_sub(new_products),
            failed_pages,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !self.failed_pages.is_empty()
    }
}
