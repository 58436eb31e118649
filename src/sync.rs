//! Sync coordinator: optimistic local mutation with server confirmation.
//!
//! The coordinator owns the local store, the last-known server revision and
//! the dirty flag for one running session. Mutations are applied to the
//! store immediately and then confirmed against the remote service; a
//! failed confirmation marks the state dirty, and the next operation first
//! runs a full reconciliation that replaces the local collection with the
//! server's authoritative one.
//!
//! Protocol steps are serialized behind a FIFO mutex, so at most one
//! apply-then-confirm sequence or reconciliation pass is in flight at a
//! time; suspension happens only at the network boundary. A caller that
//! stops awaiting a confirmation leaves the already-applied local mutation
//! in place.

use std::path::Path;

use tokio::sync::{watch, Mutex};

use crate::config::Config;
use crate::error::TodoResult;
use crate::models::TodoItem;
use crate::remote::RemoteService;
use crate::store::TodoStore;

/// Coordinator resting state for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No operation in flight, local state confirmed as far as known
    Idle,
    /// An apply-then-confirm sequence or reconciliation pass is running
    Syncing,
    /// A prior confirmation failed; reconciliation is pending
    Dirty,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Syncing => write!(f, "Syncing"),
            Self::Dirty => write!(f, "Dirty"),
        }
    }
}

/// Observable state published after every coordinator step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    pub dirty: bool,
    pub completed: usize,
    pub total: usize,
}

struct SyncInner {
    store: TodoStore,
    revision: i64,
    dirty: bool,
}

/// Per-session owner of the local store and sync state
pub struct SyncCoordinator<R: RemoteService> {
    remote: R,
    inner: Mutex<SyncInner>,
    status: watch::Sender<SyncStatus>,
}

impl<R: RemoteService> SyncCoordinator<R> {
    /// Create a coordinator over an existing store, starting at revision 0
    pub fn new(store: TodoStore, remote: R) -> Self {
        let (status, _) = watch::channel(SyncStatus {
            phase: SyncPhase::Idle,
            dirty: false,
            completed: store.completed_count(),
            total: store.len(),
        });
        Self {
            remote,
            inner: Mutex::new(SyncInner {
                store,
                revision: 0,
                dirty: false,
            }),
            status,
        }
    }

    /// Initialize the durable store from configuration and wrap it.
    ///
    /// Storage-backend failure here is fatal.
    pub fn open(config: &Config, remote: R) -> TodoResult<Self> {
        let store = TodoStore::open(&config.snapshot_file())?;
        Ok(Self::new(store, remote))
    }

    /// Access the remote service this coordinator talks to
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Subscribe to status updates
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Insert a new item or update an existing one, then confirm the
    /// mutation with the server. Returns the post-operation collection.
    pub async fn add_or_update(&self, item: TodoItem) -> Vec<TodoItem> {
        let mut inner = self.inner.lock().await;
        self.publish(&inner, SyncPhase::Syncing);
        self.reconcile(&mut inner).await;

        let revision = inner.revision;
        let was_new = inner.store.add(item.clone());
        let outcome = if was_new {
            self.remote.create_item(&item, revision).await
        } else {
            self.remote.update_item(&item, revision).await
        };
        self.confirm(&mut inner, outcome);
        self.finish(&inner)
    }

    /// Delete an item. A locally unknown id is a no-op and triggers no
    /// remote call.
    pub async fn delete(&self, id: &str) -> Vec<TodoItem> {
        let mut inner = self.inner.lock().await;
        self.publish(&inner, SyncPhase::Syncing);
        self.reconcile(&mut inner).await;

        if inner.store.remove(id).is_none() {
            tracing::debug!(id, "delete of unknown id is a no-op");
            return self.finish(&inner);
        }
        let revision = inner.revision;
        let outcome = self.remote.delete_item(id, revision).await;
        self.confirm(&mut inner, outcome);
        self.finish(&inner)
    }

    /// Flip an item's completion flag. A locally unknown id is a no-op.
    pub async fn toggle_complete(&self, id: &str) -> Vec<TodoItem> {
        let mut inner = self.inner.lock().await;
        self.publish(&inner, SyncPhase::Syncing);
        self.reconcile(&mut inner).await;

        let Some(existing) = inner.store.get(id) else {
            tracing::debug!(id, "toggle of unknown id is a no-op");
            return self.finish(&inner);
        };
        let mut item = existing.clone();
        item.done = !item.done;
        item.touch();
        inner.store.add(item.clone());

        let revision = inner.revision;
        let outcome = self.remote.update_item(&item, revision).await;
        self.confirm(&mut inner, outcome);
        self.finish(&inner)
    }

    /// Fetch the authoritative list and replace local state with it.
    ///
    /// Used for the initial load and to converge on demand. A failure is
    /// returned to the caller; local state and the dirty flag are left as
    /// they were.
    pub async fn refresh(&self) -> TodoResult<Vec<TodoItem>> {
        let mut inner = self.inner.lock().await;
        self.publish(&inner, SyncPhase::Syncing);
        match self.remote.fetch_list().await {
            Ok(response) => {
                inner.store.replace_all(response.list);
                inner.revision = response.revision;
                inner.dirty = false;
                tracing::debug!(revision = inner.revision, "local state refreshed from server");
                Ok(self.finish(&inner))
            }
            Err(err) => {
                self.finish(&inner);
                Err(err)
            }
        }
    }

    /// Fetch a single element from the server without touching local state
    pub async fn fetch_item(&self, id: &str) -> TodoResult<TodoItem> {
        self.remote.fetch_item(id).await
    }

    /// Clone of the current collection
    pub async fn items(&self) -> Vec<TodoItem> {
        self.inner.lock().await.store.items()
    }

    /// Last-known server revision
    pub async fn revision(&self) -> i64 {
        self.inner.lock().await.revision
    }

    /// Whether local state may have diverged from the server
    pub async fn is_dirty(&self) -> bool {
        self.inner.lock().await.dirty
    }

    /// Number of completed items
    pub async fn completed_count(&self) -> usize {
        self.inner.lock().await.store.completed_count()
    }

    /// Persist the current collection to a snapshot file
    pub async fn save_snapshot(&self, path: &Path) -> TodoResult<()> {
        self.inner.lock().await.store.save_snapshot(path)
    }

    /// Merge a snapshot file into the current collection
    pub async fn load_snapshot(&self, path: &Path) -> TodoResult<usize> {
        let mut inner = self.inner.lock().await;
        let loaded = inner.store.load_snapshot(path)?;
        self.finish(&inner);
        Ok(loaded)
    }

    /// Replace local state with the server's authoritative list when a
    /// prior confirmation failed. A reconciliation failure keeps the dirty
    /// flag and never blocks the operation that triggered it.
    async fn reconcile(&self, inner: &mut SyncInner) {
        if !inner.dirty {
            return;
        }
        match self.remote.sync_list(inner.revision).await {
            Ok(response) => {
                inner.store.replace_all(response.list);
                inner.revision = response.revision;
                inner.dirty = false;
                tracing::info!(revision = inner.revision, "reconciled local state with server");
            }
            Err(err) => {
                tracing::warn!("reconciliation failed, staying dirty: {}", err);
            }
        }
    }

    /// Fold a mutation outcome into the sync state. The revision never
    /// decreases; a failure marks the state dirty.
    fn confirm(&self, inner: &mut SyncInner, outcome: TodoResult<Option<i64>>) {
        match outcome {
            Ok(Some(revision)) => {
                if revision > inner.revision {
                    inner.revision = revision;
                }
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!("mutation unconfirmed, marking state dirty: {}", err);
                inner.dirty = true;
            }
        }
    }

    fn finish(&self, inner: &SyncInner) -> Vec<TodoItem> {
        let phase = if inner.dirty {
            SyncPhase::Dirty
        } else {
            SyncPhase::Idle
        };
        self.publish(inner, phase);
        inner.store.items()
    }

    fn publish(&self, inner: &SyncInner, phase: SyncPhase) {
        self.status.send_replace(SyncStatus {
            phase,
            dirty: inner.dirty,
            completed: inner.store.completed_count(),
            total: inner.store.len(),
        });
    }
}
