//! Per-client bucket registry with idle eviction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::LimiterConfig;
use crate::lifecycle::ServerState;
use crate::limiter::bucket::TokenBucket;
use crate::observability::metrics;

/// Per-client state: the bucket plus when the client was last seen.
struct ClientEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Concurrent-safe registry of per-client token buckets.
///
/// All reads, writes, and evictions go through one mutex, so an admission
/// check never observes a half-evicted entry. The map grows lazily as new
/// clients appear and shrinks via the periodic sweep.
pub struct RateLimiter {
    clients: Mutex<HashMap<String, ClientEntry>>,
    config: LimiterConfig,
}

impl RateLimiter {
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Whether admission control is administratively enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Check whether a request from `key` is admitted right now.
    ///
    /// Creates the client's bucket on first sight and refreshes its
    /// last-seen time on every call. Never blocks waiting for capacity.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().expect("client map mutex poisoned");

        let entry = clients.entry(key.to_string()).or_insert_with(|| ClientEntry {
            bucket: TokenBucket::new(self.config.requests_per_second, self.config.burst),
            last_seen: now,
        });
        entry.last_seen = now;

        entry.bucket.try_consume_at(now)
    }

    /// Remove every client idle longer than the configured threshold,
    /// as of `now`. Returns the number of entries removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let idle_timeout = self.config.idle_timeout();
        let mut clients = self.clients.lock().expect("client map mutex poisoned");

        let before = clients.len();
        clients.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= idle_timeout);
        before - clients.len()
    }

    /// Number of clients currently tracked. Read-only telemetry.
    pub fn client_count(&self) -> usize {
        self.clients.lock().expect("client map mutex poisoned").len()
    }

    /// Spawn the eviction sweep task.
    ///
    /// Runs on the configured period and stops once the server leaves
    /// `Running`, so the sweep's lifetime is tied to the server's.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        mut state: watch::Receiver<ServerState>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.sweep_interval());
            // interval fires immediately; consume the first tick
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.evict_idle(Instant::now());
                        let remaining = self.client_count();
                        metrics::record_client_count(remaining);
                        if removed > 0 {
                            tracing::debug!(removed, remaining, "evicted idle clients");
                        }
                    }
                    changed = state.changed() => {
                        if changed.is_err() || *state.borrow() != ServerState::Running {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("client eviction sweep stopped");
        })
    }
}
