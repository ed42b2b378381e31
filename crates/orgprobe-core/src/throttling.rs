use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token-bucket throttle shared by every lookup of a batch.
///
/// The concurrency limit bounds how many requests are open at once; this
/// bounds how fast new ones start, for registries that ban bursty clients.
#[derive(Clone)]
pub struct RequestThrottle {
    limiter: Arc<DirectRateLimiter>,
    per_second: NonZeroU32,
}

impl RequestThrottle {
    pub fn per_second(per_second: NonZeroU32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            per_second,
        }
    }

    /// Wait until the bucket has a cell for one more request.
    pub async fn until_ready(&self) {
        self.limiter.until_ready().await;
    }

    pub const fn rate(&self) -> NonZeroU32 {
        self.per_second
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("per_second", &self.per_second)
            .finish()
    }
}
