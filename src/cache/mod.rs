//! Catalog snapshot cache.
//!
//! Holds the single catalog snapshot, decides between serving it and
//! refreshing it from the [`CatalogSource`], and falls back to the stale
//! snapshot when a refresh fails. Refreshes are single-flight: callers that
//! need a refresh while one is running wait for it and reuse its result.

pub mod store;

use crate::catalog::CatalogItem;
use crate::clock::Clock;
use crate::metrics;
use crate::retry::{RetryConfig, attempt_with_retry};
use crate::source::{CatalogSource, SourceKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use store::SnapshotStore;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default snapshot time-to-live: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_millis(86_400_000);

/// Cached catalog result and the time it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub items: Vec<CatalogItem>,
    pub fetched_at: DateTime<Utc>,
}

impl CacheSnapshot {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.fetched_at).max(chrono::Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.fetched_at >= ttl
    }
}

/// Result of a refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshOutcome {
    /// A new snapshot is in place
    Refreshed,
    /// The fetch failed; the previous snapshot is still served
    Stale,
    /// The fetch failed and there is nothing to serve
    Empty,
}

/// Summary returned to the manual refresh trigger
#[derive(Debug, Clone, Serialize)]
pub struct RefreshReport {
    pub status: RefreshOutcome,
    pub films_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time view of the cache for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub source: SourceKind,
    pub ttl_seconds: u64,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_seconds: Option<i64>,
    pub item_count: usize,
    /// `true` when the next catalog request will trigger a fetch
    pub expired: bool,
    pub next_refresh: Option<DateTime<Utc>>,
}

/// Tunables for [`CatalogCache`]
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub retry: RetryConfig,
    /// File mirror of the snapshot, if persistence is enabled
    pub store: Option<SnapshotStore>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            retry: RetryConfig::default(),
            store: None,
        }
    }
}

struct Slot {
    snapshot: Option<Arc<CacheSnapshot>>,
    /// Bumped every time a refresh attempt completes, successful or not
    attempts: u64,
    last_outcome: RefreshOutcome,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            snapshot: None,
            attempts: 0,
            last_outcome: RefreshOutcome::Empty,
        }
    }
}

struct Inner {
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    ttl_std: Duration,
    retry: RetryConfig,
    store: Option<SnapshotStore>,
    slot: RwLock<Slot>,
    refresh_lock: Mutex<()>,
}

/// Owner of the catalog snapshot, shared across handlers
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<Inner>,
}

impl CatalogCache {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        clock: Arc<dyn Clock>,
        settings: CacheSettings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                ttl: chrono::Duration::from_std(settings.ttl).unwrap_or(chrono::Duration::MAX),
                ttl_std: settings.ttl,
                retry: settings.retry,
                store: settings.store,
                slot: RwLock::new(Slot::default()),
                refresh_lock: Mutex::new(()),
            }),
        }
    }

    pub fn source(&self) -> &Arc<dyn CatalogSource> {
        &self.inner.source
    }

    fn read_slot(&self) -> (Option<Arc<CacheSnapshot>>, u64) {
        let slot = self.inner.slot.read().unwrap_or_else(|p| p.into_inner());
        (slot.snapshot.clone(), slot.attempts)
    }

    fn replace(&self, snapshot: Arc<CacheSnapshot>) {
        let mut slot = self.inner.slot.write().unwrap_or_else(|p| p.into_inner());
        slot.snapshot = Some(snapshot);
    }

    /// Publish the result of a finished attempt to queued callers
    fn complete_attempt(&self, snapshot: Option<Arc<CacheSnapshot>>, outcome: RefreshOutcome) {
        let mut slot = self.inner.slot.write().unwrap_or_else(|p| p.into_inner());
        if let Some(snapshot) = snapshot {
            slot.snapshot = Some(snapshot);
        }
        slot.attempts += 1;
        slot.last_outcome = outcome;
    }

    fn is_fresh(&self, snapshot: &CacheSnapshot) -> bool {
        !snapshot.is_expired(self.inner.clock.now(), self.inner.ttl)
    }

    /// Seed the snapshot from the file mirror, keeping its original fetch time.
    ///
    /// Returns `true` when a snapshot was restored. Missing or unreadable
    /// files leave the cache empty.
    pub async fn restore(&self) -> bool {
        let Some(store) = &self.inner.store else {
            return false;
        };

        match store.load().await {
            Ok(Some(snapshot)) => {
                let now = self.inner.clock.now();
                info!(
                    "Restored {} cached films from {} (age {}s, expired: {})",
                    snapshot.items.len(),
                    store.path().display(),
                    snapshot.age(now).num_seconds(),
                    snapshot.is_expired(now, self.inner.ttl)
                );
                metrics::set_snapshot_items(snapshot.items.len());
                self.replace(Arc::new(snapshot));
                true
            }
            Ok(None) => {
                debug!("No persisted snapshot at {}", store.path().display());
                false
            }
            Err(e) => {
                warn!(
                    "Ignoring persisted snapshot at {}: {}",
                    store.path().display(),
                    e
                );
                false
            }
        }
    }

    /// Current snapshot without triggering a fetch
    pub fn snapshot(&self) -> Option<Arc<CacheSnapshot>> {
        self.read_slot().0
    }

    /// Whether a catalog request right now would hit the upstream
    pub fn needs_refresh(&self) -> bool {
        match self.snapshot() {
            Some(snapshot) => !self.is_fresh(&snapshot),
            None => true,
        }
    }

    /// Catalog items, fetching first when the snapshot is missing, expired or
    /// `force_refresh` is set. Never fails: upstream errors degrade to the
    /// stale snapshot, or to an empty list when there is none.
    pub async fn get_catalog(&self, force_refresh: bool) -> Vec<CatalogItem> {
        self.get_snapshot(force_refresh)
            .await
            .map(|s| s.items.clone())
            .unwrap_or_default()
    }

    /// Like [`get_catalog`](Self::get_catalog) but hands out the shared snapshot
    pub async fn get_snapshot(&self, force_refresh: bool) -> Option<Arc<CacheSnapshot>> {
        let (current, attempts) = self.read_slot();

        if !force_refresh
            && let Some(snapshot) = &current
            && self.is_fresh(snapshot)
        {
            debug!("Catalog cache HIT ({} items)", snapshot.items.len());
            metrics::record_cache_hit();
            return current;
        }

        metrics::record_cache_miss();
        self.refresh_from(attempts, force_refresh).await.0
    }

    /// Manual refresh trigger: always fetches, reports what happened
    pub async fn refresh(&self) -> RefreshReport {
        let (_, attempts) = self.read_slot();
        let (snapshot, status) = self.refresh_from(attempts, true).await;

        RefreshReport {
            status,
            films_count: snapshot.map(|s| s.items.len()).unwrap_or(0),
            timestamp: self.inner.clock.now(),
        }
    }

    /// Run one refresh attempt.
    ///
    /// Unless `force` is set, a caller that queued while another attempt ran
    /// (the attempt counter moved past `seen_attempts`) takes that attempt's
    /// result instead, whether it succeeded or failed.
    async fn refresh_from(
        &self,
        seen_attempts: u64,
        force: bool,
    ) -> (Option<Arc<CacheSnapshot>>, RefreshOutcome) {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = {
            let slot = self.inner.slot.read().unwrap_or_else(|p| p.into_inner());
            if !force && slot.attempts != seen_attempts {
                debug!("Reusing result of concurrent refresh: {:?}", slot.last_outcome);
                return (slot.snapshot.clone(), slot.last_outcome);
            }
            slot.snapshot.clone()
        };

        let source = &self.inner.source;
        let result =
            attempt_with_retry(&self.inner.retry, "Catalog fetch", || source.fetch()).await;

        match result {
            Ok(items) => {
                let snapshot = Arc::new(CacheSnapshot {
                    items,
                    fetched_at: self.inner.clock.now(),
                });
                self.complete_attempt(Some(snapshot.clone()), RefreshOutcome::Refreshed);
                metrics::set_snapshot_items(snapshot.items.len());
                info!(
                    "Catalog refreshed from {:?}: {} films",
                    source.kind(),
                    snapshot.items.len()
                );

                // The slot lock is already released; readers are not blocked by disk I/O
                if let Some(store) = &self.inner.store
                    && let Err(e) = store.save(&snapshot).await
                {
                    warn!("Failed to persist snapshot: {}", e);
                }

                (Some(snapshot), RefreshOutcome::Refreshed)
            }
            Err(e) => {
                metrics::record_upstream_error();
                let outcome = if current.is_some() {
                    RefreshOutcome::Stale
                } else {
                    RefreshOutcome::Empty
                };
                self.complete_attempt(None, outcome);
                match current {
                    Some(stale) => {
                        warn!(
                            "Catalog fetch failed, serving stale snapshot ({} films, age {}s): {}",
                            stale.items.len(),
                            stale.age(self.inner.clock.now()).num_seconds(),
                            e
                        );
                        (Some(stale), RefreshOutcome::Stale)
                    }
                    None => {
                        warn!(
                            "Catalog fetch failed with no snapshot to fall back on: {}",
                            e
                        );
                        (None, RefreshOutcome::Empty)
                    }
                }
            }
        }
    }

    /// Seconds of freshness left, 0 when empty or expired
    pub fn remaining_secs(&self, snapshot: &CacheSnapshot) -> u64 {
        let age = snapshot.age(self.inner.clock.now());
        (self.inner.ttl - age).num_seconds().max(0) as u64
    }

    pub fn status(&self) -> CacheStatus {
        let now = self.inner.clock.now();
        let snapshot = self.snapshot();

        CacheStatus {
            source: self.inner.source.kind(),
            ttl_seconds: self.inner.ttl_std.as_secs(),
            fetched_at: snapshot.as_ref().map(|s| s.fetched_at),
            age_seconds: snapshot.as_ref().map(|s| s.age(now).num_seconds()),
            item_count: snapshot.as_ref().map(|s| s.items.len()).unwrap_or(0),
            expired: snapshot
                .as_ref()
                .map(|s| s.is_expired(now, self.inner.ttl))
                .unwrap_or(true),
            next_refresh: snapshot
                .as_ref()
                .and_then(|s| s.fetched_at.checked_add_signed(self.inner.ttl)),
        }
    }
}
