// ============================================================================
// Rate Limiter
// ============================================================================
//
// Token-bucket admission control for the gateway:
// - Tokens accrue continuously at `refill_rate` per second up to `capacity`
// - Every admitted request consumes one token
// - An empty bucket rejects the request with no other side effect
//
// One bucket per gateway process, shared by all concurrent requests.
// ============================================================================

use std::sync::Mutex;
use std::time::Instant;

pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a bucket that starts full.
    pub fn new(capacity: u32, refill_rate: u32) -> Self {
        Self {
            capacity: f64::from(capacity),
            refill_rate: f64::from(refill_rate),
            state: Mutex::new(BucketState {
                tokens: f64::from(capacity),
                last_refill: Instant::now(),
            }),
        }
    }

    /// Try to admit one request. O(1), never blocks on I/O.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    // Refill and decrement happen under one lock, so two racing callers can
    // never both take the last token.
    fn allow_at(&self, now: Instant) -> bool {
        // The critical section is pure arithmetic and cannot panic, but a
        // poisoned lock must not take the gateway down with it.
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let elapsed = now.saturating_duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
