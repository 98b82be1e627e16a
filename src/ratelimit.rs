use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use std::{num::NonZeroU32, time::Duration};

// Spacing between any two requests, on top of the per-second budget.
const MIN_GAP_BETWEEN_REQ: Duration = Duration::from_millis(50);

pub struct RateLimiter {
    req_per_sec: DefaultDirectRateLimiter,
    min_gap: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    /// Zero is treated as one request per second.
    pub fn per_second(requests: u32) -> Self {
        let rate = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(rate));
        let min_gap = Quota::with_period(MIN_GAP_BETWEEN_REQ).map(GovernorRateLimiter::direct);
        RateLimiter {
            req_per_sec,
            min_gap,
        }
    }

    pub async fn wait_until_ready(&self) {
        // Budget first, then spacing. The other way round lets a queue of
        // callers that cleared the gap burst through together once the
        // per-second budget refills.
        self.req_per_sec.until_ready().await;
        if let Some(min_gap) = &self.min_gap {
            min_gap.until_ready().await;
        }
    }
}
