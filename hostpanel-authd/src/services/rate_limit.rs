//! Rate limiting for the public authentication surface.
//!
//! Login and registration accept unauthenticated traffic, which makes
//! them the target for credential brute-forcing. A single shared bucket
//! would let one source exhaust the quota for everyone, so the limiter
//! keeps an independent token bucket per peer address. The request gate
//! applies it to allow-listed methods only.

use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultKeyedRateLimiter, Quota};

/// Per-peer token buckets, shared by every clone.
#[derive(Clone)]
pub struct AuthRateLimiter {
    buckets: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl AuthRateLimiter {
    /// Create a limiter allowing `per_second` sustained requests per peer
    /// with bursts up to `burst_size`. Zero values are clamped to 1.
    pub fn new(per_second: u32, burst_size: u32) -> Self {
        let per_second = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
        let burst_size = NonZeroU32::new(burst_size).unwrap_or(NonZeroU32::MIN);

        let quota = Quota::per_second(per_second).allow_burst(burst_size);

        Self {
            buckets: Arc::new(DefaultKeyedRateLimiter::keyed(quota)),
        }
    }

    /// Whether `peer` is still within its quota. Callers deny the request
    /// when this returns false.
    #[must_use]
    pub fn allow(&self, peer: IpAddr) -> bool {
        self.buckets.check_key(&peer).is_ok()
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        // 5 requests/second sustained per peer, bursts to 20.
        Self::new(5, 20)
    }
}
