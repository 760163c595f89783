//! Permission facade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// OS capabilities the blocker depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionKind {
    /// Draw over other apps.
    Overlay,
    /// Read foreground usage events.
    UsageStats,
    Notification,
    Accessibility,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 4] = [
        PermissionKind::Overlay,
        PermissionKind::UsageStats,
        PermissionKind::Notification,
        PermissionKind::Accessibility,
    ];
}

/// Platform permission queries.
pub trait PermissionBackend: Send + Sync {
    /// Whether the permission is currently granted.
    fn is_granted(&self, kind: PermissionKind) -> bool;

    /// Open the OS settings surface where the user grants the permission.
    fn open_settings(&self, kind: PermissionKind) -> color_eyre::eyre::Result<()>;
}

/// Permissions needed for blocking to work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PermissionSummary {
    #[serde(rename = "hasOverlayPermission")]
    pub overlay: bool,
    #[serde(rename = "hasUsageStatsPermission")]
    pub usage_stats: bool,
}

/// Stateless check/request pairs over a [`PermissionBackend`].
#[derive(Clone)]
pub struct Permissions {
    backend: Arc<dyn PermissionBackend>,
}

impl Permissions {
    pub fn new(backend: Arc<dyn PermissionBackend>) -> Self {
        Self { backend }
    }

    pub fn check(&self, kind: PermissionKind) -> bool {
        self.backend.is_granted(kind)
    }

    /// Open the settings surface for `kind`.
    ///
    /// Always returns `false`: the grant happens asynchronously and the
    /// caller must check again later.
    pub fn request(&self, kind: PermissionKind) -> color_eyre::eyre::Result<bool> {
        tracing::info!(?kind, "requesting permission");
        self.backend.open_settings(kind)?;
        Ok(false)
    }

    pub fn summary(&self) -> PermissionSummary {
        PermissionSummary {
            overlay: self.check(PermissionKind::Overlay),
            usage_stats: self.check(PermissionKind::UsageStats),
        }
    }
}
