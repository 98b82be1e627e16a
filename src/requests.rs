use anyhow::Context;
use reqwest::{Client, ClientBuilder, Proxy, Response};
use std::time::Duration;

use crate::ratelimit::RateLimiter;

const USER_AGENT: &str = concat!("price_harvester/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RequestClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RequestClient {
    pub fn new(proxy: Option<&str>, requests_per_sec: u32) -> anyhow::Result<Self> {
        let mut builder = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy).with_context(|| format!("invalid proxy address {proxy}"))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().context("failed to build HTTP client")?;
        let rate_limiter = RateLimiter::per_second(requests_per_sec);
        Ok(Self {
            client,
            rate_limiter,
        })
    }

    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, reqwest::Error> {
        // Wait (non-blocking) until we're allowed to make a request according
        // to our self-imposed rate-limiting policy.
        self.rate_limiter.wait_until_ready().await;

        self.client.get(url).send().await?.error_for_status()
    }

    pub async fn fetch_url_body(&self, url: &str) -> Result<String, reqwest::Error> {
        let response = self.fetch_url_response(url).await?;
        response.text().await
    }
}
