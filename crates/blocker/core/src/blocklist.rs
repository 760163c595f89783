//! The block list: an in-memory set of blocked apps mirrored to storage.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::AppId;

/// Set of blocked application identifiers.
pub type BlockedApps = BTreeSet<AppId>;

/// Durable storage for the block list.
pub trait BlockListPersistence: Send + Sync {
    /// Read the persisted set.
    fn load(&self) -> color_eyre::eyre::Result<BlockedApps>;

    /// Replace the persisted set.
    fn save(&self, apps: &BlockedApps) -> color_eyre::eyre::Result<()>;
}

/// Starts and stops the background blocking service.
pub trait ServiceControl: Send + Sync {
    /// Start the service, optionally with a custom overlay route.
    fn start_service(&self, overlay_route: Option<String>);

    /// Stop the service.
    fn stop_service(&self);
}

/// Blocked-app store with write-through persistence.
///
/// Mutations are serialized by the write lock, which is held across the
/// persistence write so storage observes changes in mutation order. Any
/// mutation that changes membership asks the attached [`ServiceControl`]
/// to start (set non-empty) or stop (set empty) the blocking service. The
/// signal is sent under the write lock, so [`ServiceControl`] must not block.
pub struct BlockList {
    apps: RwLock<BlockedApps>,
    persistence: Arc<dyn BlockListPersistence>,
    service: Mutex<Option<Arc<dyn ServiceControl>>>,
}

impl BlockList {
    /// Create an empty store. Call [`BlockList::load`] to read persisted state.
    pub fn new(persistence: Arc<dyn BlockListPersistence>) -> Self {
        Self {
            apps: RwLock::new(BlockedApps::new()),
            persistence,
            service: Mutex::new(None),
        }
    }

    /// Attach the service collaborator signalled on membership changes.
    pub fn attach_service(&self, service: Arc<dyn ServiceControl>) {
        *self.service.lock().unwrap_or_else(|e| e.into_inner()) = Some(service);
    }

    /// Detach the service collaborator. Later mutations signal nothing.
    pub fn detach_service(&self) {
        *self.service.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Load the persisted set, falling back to an empty set on failure.
    pub fn load(&self) {
        let loaded = match self.persistence.load() {
            Ok(apps) => apps,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load block list, starting empty");
                BlockedApps::new()
            }
        };

        tracing::info!(count = loaded.len(), "block list loaded");
        *self.apps.write().unwrap_or_else(|e| e.into_inner()) = loaded;
    }

    /// Check whether an app is blocked.
    pub fn contains(&self, app_id: &str) -> bool {
        self.apps
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(app_id)
    }

    /// Snapshot of the blocked apps.
    pub fn snapshot(&self) -> BlockedApps {
        self.apps.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn len(&self) -> usize {
        self.apps.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Block an app. Returns `true` if it was not already blocked.
    pub fn add(&self, app_id: AppId) -> bool {
        self.mutate(false, |apps| apps.insert(app_id))
    }

    /// Unblock an app. Returns `true` if it was blocked.
    pub fn remove(&self, app_id: &str) -> bool {
        self.mutate(false, |apps| apps.remove(app_id))
    }

    /// Block several apps at once. Returns `true` if any was newly blocked.
    pub fn extend(&self, app_ids: impl IntoIterator<Item = AppId>) -> bool {
        self.mutate(false, |apps| {
            let before = apps.len();
            apps.extend(app_ids);
            apps.len() != before
        })
    }

    /// Replace the whole set. Always persists.
    pub fn set_all(&self, app_ids: impl IntoIterator<Item = AppId>) -> bool {
        let replacement: BlockedApps = app_ids.into_iter().collect();
        self.mutate(true, |apps| {
            let changed = *apps != replacement;
            *apps = replacement;
            changed
        })
    }

    /// Unblock everything. Always persists.
    pub fn clear(&self) -> bool {
        self.mutate(true, |apps| {
            let changed = !apps.is_empty();
            apps.clear();
            changed
        })
    }

    fn mutate(&self, always_persist: bool, f: impl FnOnce(&mut BlockedApps) -> bool) -> bool {
        let mut apps = self.apps.write().unwrap_or_else(|e| e.into_inner());
        let changed = f(&mut apps);

        if changed || always_persist {
            // In-memory state stays authoritative if the write fails.
            if let Err(e) = self.persistence.save(&apps) {
                tracing::warn!(error = %e, "failed to persist block list");
            }
        }

        // Signalled under the write lock so signals follow mutation order
        if changed {
            self.signal_service(apps.is_empty());
        }

        changed
    }

    fn signal_service(&self, now_empty: bool) {
        let service = self
            .service
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        let Some(service) = service else {
            tracing::debug!("no service attached, skipping service signal");
            return;
        };

        if now_empty {
            service.stop_service();
        } else {
            service.start_service(None);
        }
    }
}

/// In-memory persistence, counting writes.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    apps: Mutex<BlockedApps>,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-persisted set.
    pub fn with_apps(apps: impl IntoIterator<Item = AppId>) -> Self {
        Self {
            apps: Mutex::new(apps.into_iter().collect()),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed writes.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl BlockListPersistence for MemoryPersistence {
    fn load(&self) -> color_eyre::eyre::Result<BlockedApps> {
        Ok(self.apps.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, apps: &BlockedApps) -> color_eyre::eyre::Result<()> {
        *self.apps.lock().unwrap_or_else(|e| e.into_inner()) = apps.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
