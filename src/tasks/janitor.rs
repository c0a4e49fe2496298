//! Expired Entry Janitor
//!
//! Background task that periodically removes expired cache entries nobody has
//! read since they expired. Lazy expiry in `CacheStore::get` remains the
//! correctness backstop; this only reclaims memory.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Removes every entry of `cache` that is expired now.
///
/// Works from a snapshot of keys, taking the store's mutation lock once per
/// expired key rather than for the whole sweep.
///
/// # Returns
/// The number of entries removed.
pub fn sweep_expired(cache: &CacheStore) -> usize {
    let now = Instant::now();
    cache
        .snapshot_keys()
        .into_iter()
        .filter(|key| cache.remove_if_expired(key, now).is_some())
        .count()
}

/// Handle to the running janitor task.
///
/// The task stops when [`Janitor::shutdown`] is awaited or when the handle is
/// dropped.
#[derive(Debug)]
pub struct Janitor {
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Janitor {
    /// Spawns the janitor on the current tokio runtime.
    ///
    /// # Arguments
    /// * `cache` - Shared cache to sweep
    /// * `interval` - Time between sweeps
    pub fn spawn(cache: Arc<CacheStore>, interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!("Starting janitor with interval of {:?}", interval);

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = sweep_expired(&cache);
                        if removed > 0 {
                            info!("Janitor: removed {} expired entries", removed);
                        } else {
                            debug!("Janitor: no expired entries found");
                        }
                    }
                    // A send or a dropped sender both mean stop.
                    _ = shutdown_rx.changed() => {
                        break;
                    }
                }
            }

            info!("Janitor stopped");
        });

        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}
