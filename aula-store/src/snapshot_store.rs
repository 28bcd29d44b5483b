//! Latest refresh result, observable by collaborators.

use std::sync::Arc;
use std::time::Duration;

use aula_core::AulaSnapshot;
use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, watch};
use tracing::{debug, warn};

use crate::error::StoreError;

// ============================================================================
// Inner State
// ============================================================================

#[derive(Default)]
struct SnapshotStoreInner {
    /// Last completed snapshot.
    snapshot: Option<AulaSnapshot>,
    /// When the last refresh attempt ended.
    last_refresh: Option<DateTime<Utc>>,
    /// When the snapshot was stored.
    snapshot_time: Option<DateTime<Utc>>,
    /// A refresh is running.
    refreshing: bool,
    /// Error from the last failed refresh.
    error: Option<String>,
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Holds the most recent [`AulaSnapshot`].
///
/// Collaborators read only completed snapshots; a refresh replaces the whole
/// value at once. Observable via a watch channel.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<SnapshotStoreInner>>,
    notify: watch::Sender<u64>,
    version: Arc<RwLock<u64>>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(SnapshotStoreInner::default())),
            notify,
            version: Arc::new(RwLock::new(0)),
        }
    }

    // ========================================================================
    // Snapshot Access
    // ========================================================================

    /// Copy of the latest snapshot.
    pub async fn get(&self) -> Option<AulaSnapshot> {
        self.inner.read().await.snapshot.clone()
    }

    /// Replaces the snapshot and clears any error.
    pub async fn set(&self, snapshot: AulaSnapshot) {
        {
            let mut inner = self.inner.write().await;
            inner.snapshot = Some(snapshot);
            inner.snapshot_time = Some(Utc::now());
            inner.error = None;
        }
        self.notify_change().await;
        debug!("Snapshot updated");
    }

    // ========================================================================
    // Refresh State
    // ========================================================================

    /// Marks a refresh as started.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RefreshInProgress`] if one is already running.
    pub async fn start_refresh(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.refreshing {
            return Err(StoreError::RefreshInProgress);
        }
        inner.refreshing = true;
        Ok(())
    }

    /// Marks the running refresh as done.
    pub async fn end_refresh(&self) {
        {
            let mut inner = self.inner.write().await;
            inner.refreshing = false;
            inner.last_refresh = Some(Utc::now());
        }
        self.notify_change().await;
    }

    /// Checks if a refresh is running.
    pub async fn is_refreshing(&self) -> bool {
        self.inner.read().await.refreshing
    }

    /// When the last refresh attempt ended.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_refresh
    }

    // ========================================================================
    // Errors
    // ========================================================================

    /// Records the error of a failed refresh. The previous snapshot stays.
    pub async fn set_error(&self, error: String) {
        {
            let mut inner = self.inner.write().await;
            inner.error = Some(error);
        }
        self.notify_change().await;
        warn!("Refresh error recorded");
    }

    /// Error from the last failed refresh.
    pub async fn error(&self) -> Option<String> {
        self.inner.read().await.error.clone()
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Subscribes to changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    async fn notify_change(&self) {
        let mut version = self.version.write().await;
        *version += 1;
        let _ = self.notify.send(*version);
    }

    // ========================================================================
    // Staleness
    // ========================================================================

    /// Checks if the snapshot is older than `threshold` (or missing).
    pub async fn is_stale(&self, threshold: Duration) -> bool {
        let inner = self.inner.read().await;
        match inner.snapshot_time {
            Some(time) => {
                let age = Utc::now().signed_duration_since(time);
                age > chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX)
            }
            None => true,
        }
    }
}
