//! Fakes shared by the channel tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use blocker_core::{
    AppCatalog, AppId, BlockList, InstalledApp, MemoryPersistence, OverlayControl,
    PermissionBackend, PermissionKind, ServiceControl,
};
use color_eyre::eyre::{Result, eyre};

use crate::PluginContext;

pub struct FakeCatalog {
    apps: Vec<InstalledApp>,
    failing: AtomicBool,
}

impl FakeCatalog {
    fn new() -> Self {
        let app = |id: &str, name: &str, is_system_app| InstalledApp {
            id: id.into(),
            display_name: name.into(),
            is_system_app,
            icon: None,
        };

        Self {
            apps: vec![
                app("com.host", "Host", false),
                app("com.chat", "Chat", false),
                app("com.game", "Game", false),
                app("com.android.settings", "Settings", true),
            ],
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl AppCatalog for FakeCatalog {
    fn installed_apps(&self, include_system: bool) -> Result<Vec<InstalledApp>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(eyre!("package manager unavailable"));
        }

        Ok(self
            .apps
            .iter()
            .filter(|app| include_system || !app.is_system_app)
            .cloned()
            .collect())
    }

    fn own_app_id(&self) -> AppId {
        "com.host".into()
    }
}

/// Grants only the overlay permission.
#[derive(Default)]
pub struct FakePermissions {
    opened: Mutex<Vec<PermissionKind>>,
}

impl FakePermissions {
    pub fn opened(&self) -> Vec<PermissionKind> {
        self.opened.lock().unwrap().clone()
    }
}

impl PermissionBackend for FakePermissions {
    fn is_granted(&self, kind: PermissionKind) -> bool {
        kind == PermissionKind::Overlay
    }

    fn open_settings(&self, kind: PermissionKind) -> Result<()> {
        self.opened.lock().unwrap().push(kind);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingService {
    signals: Mutex<Vec<String>>,
}

impl RecordingService {
    pub fn signals(&self) -> Vec<String> {
        self.signals.lock().unwrap().clone()
    }
}

impl ServiceControl for RecordingService {
    fn start_service(&self, overlay_route: Option<String>) {
        let signal = match overlay_route {
            Some(route) => format!("start:{route}"),
            None => "start".to_string(),
        };
        self.signals.lock().unwrap().push(signal);
    }

    fn stop_service(&self) {
        self.signals.lock().unwrap().push("stop".to_string());
    }
}

#[derive(Default)]
pub struct FakeOverlay {
    current: Mutex<Option<AppId>>,
    dismissals: AtomicUsize,
}

impl FakeOverlay {
    pub fn show(&self, app_id: &str) {
        *self.current.lock().unwrap() = Some(app_id.into());
    }

    pub fn dismissals(&self) -> usize {
        self.dismissals.load(Ordering::SeqCst)
    }
}

impl OverlayControl for FakeOverlay {
    fn dismiss(&self) {
        self.dismissals.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = None;
    }

    fn current_blocked_app(&self) -> Option<AppId> {
        self.current.lock().unwrap().clone()
    }
}

/// An empty block list wired to recording collaborators.
pub struct Fixture {
    pub blocklist: Arc<BlockList>,
    pub catalog: Arc<FakeCatalog>,
    pub permissions: Arc<FakePermissions>,
    pub service: Arc<RecordingService>,
    pub overlay: Arc<FakeOverlay>,
}

impl Fixture {
    pub fn new() -> Self {
        let blocklist = Arc::new(BlockList::new(Arc::new(MemoryPersistence::new())));
        let service = Arc::new(RecordingService::default());
        blocklist.attach_service(service.clone());

        Self {
            blocklist,
            catalog: Arc::new(FakeCatalog::new()),
            permissions: Arc::new(FakePermissions::default()),
            service,
            overlay: Arc::new(FakeOverlay::default()),
        }
    }

    pub fn context(&self) -> PluginContext {
        PluginContext {
            catalog: self.catalog.clone(),
            permissions: self.permissions.clone(),
            service: self.service.clone(),
        }
    }
}
