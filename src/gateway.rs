use thiserror::Error;

use crate::{
    errors::ScrapeError,
    orchestrator::ScrapeOrchestrator,
    settings::{ScrapeOutcome, ScrapeSettings},
};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid API token")]
    Unauthorized,
    #[error("scrape failed: {0}")]
    Run(#[from] ScrapeError),
}

/// The "start a scrape" entry point, guarded by the configured API token.
pub struct Gateway {
    api_token: String,
    orchestrator: ScrapeOrchestrator,
}

impl Gateway {
    pub fn new(api_token: impl Into<String>, orchestrator: ScrapeOrchestrator) -> Self {
        Self {
            api_token: api_token.into(),
            orchestrator,
        }
    }

    pub async fn start_scrape(
        &self,
        presented_token: &str,
        settings: ScrapeSettings,
    ) -> Result<ScrapeOutcome, GatewayError> {
        if !tokens_match(presented_token, &self.api_token) {
            return Err(GatewayError::Unauthorized);
        }
        Ok(self.orchestrator.run(&settings).await?)
    }
}

// Doesn't stop at the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}
