//! Token bucket primitive for a single client.

use std::time::Instant;

/// A token bucket with continuous refill.
///
/// Tokens accrue at `rate` per second up to `burst` capacity; each admitted
/// request takes one token. Refill is computed from elapsed wall time, not
/// discrete ticks, so allowance is smoothed rather than reset at boundaries.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    burst: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(rate: f64, burst: u32) -> Self {
        let burst = f64::from(burst);
        Self {
            rate,
            burst,
            tokens: burst,
            last_refill: Instant::now(),
        }
    }

    /// Try to take one token, refilling first.
    pub fn try_consume(&mut self) -> bool {
        self.try_consume_at(Instant::now())
    }

    /// Try to take one token as of `now`.
    ///
    /// The refill is applied even when the request is denied; only the
    /// consumed token is withheld.
    pub fn try_consume_at(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.burst);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Tokens currently available.
    pub fn available(&self) -> f64 {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_burst_then_deny() {
        let mut bucket = TokenBucket::new(2.0, 4);
        let now = Instant::now();

        // rps=2, burst=4: six instantaneous requests admit exactly four
        let decisions: Vec<bool> = (0..6).map(|_| bucket.try_consume_at(now)).collect();
        assert_eq!(decisions, vec![true, true, true, true, false, false]);
    }

    #[test]
    fn test_refill_is_continuous() {
        let mut bucket = TokenBucket::new(2.0, 4);
        let now = Instant::now();

        for _ in 0..4 {
            assert!(bucket.try_consume_at(now));
        }
        assert!(!bucket.try_consume_at(now));

        // Half a second at 2 tokens/sec accrues one token
        assert!(bucket.try_consume_at(now + Duration::from_millis(500)));
        assert!(!bucket.try_consume_at(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_refill_capped_at_burst() {
        let mut bucket = TokenBucket::new(10.0, 4);
        let now = Instant::now();

        for _ in 0..4 {
            assert!(bucket.try_consume_at(now));
        }

        // A long idle gap refills to burst, not beyond
        let later = now + Duration::from_secs(3600);
        assert!(bucket.try_consume_at(later));
        assert!((bucket.available() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_bucket_refill_amount() {
        let mut bucket = TokenBucket::new(3.0, 10);
        let now = Instant::now();

        for _ in 0..10 {
            assert!(bucket.try_consume_at(now));
        }
        assert!(bucket.available() < 1e-9);

        // After t seconds an empty bucket holds min(burst, rate * t)
        let t = Duration::from_millis(2500);
        assert!(bucket.try_consume_at(now + t));
        let expected = (3.0 * 2.5_f64).min(10.0) - 1.0;
        assert!((bucket.available() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_denial_does_not_consume() {
        let mut bucket = TokenBucket::new(1.0, 1);
        let now = Instant::now();

        assert!(bucket.try_consume_at(now));
        let before = bucket.available();
        assert!(!bucket.try_consume_at(now));
        assert!((bucket.available() - before).abs() < 1e-9);
    }
}
