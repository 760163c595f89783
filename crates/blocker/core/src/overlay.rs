//! Overlay controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use color_eyre::eyre::WrapErr as _;

use crate::AppId;

/// Route the overlay UI navigates to unless overridden.
pub const DEFAULT_OVERLAY_ROUTE: &str = "appBlockingOverlay";

/// Window parameters for the blocking surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayout {
    /// Match the display size.
    pub full_screen: bool,
    /// Whether the surface takes input focus.
    pub focusable: bool,
    /// Whether touches outside the surface reach the app underneath.
    pub touch_passthrough: bool,
    /// Stack above all other windows.
    pub above_all: bool,
    /// UI route rendered inside the surface.
    pub route: String,
}

impl OverlayLayout {
    /// Full-screen, non-focusable, interception layout.
    pub fn blocking(route: impl Into<String>) -> Self {
        Self {
            full_screen: true,
            focusable: false,
            touch_passthrough: false,
            above_all: true,
            route: route.into(),
        }
    }
}

/// A system-level window the overlay is drawn into.
pub trait OverlaySurface: Send {
    /// Attach the surface to the display.
    fn attach(&mut self, layout: &OverlayLayout) -> color_eyre::eyre::Result<()>;

    /// Detach the surface. May fail if the OS already removed it.
    fn detach(&mut self) -> color_eyre::eyre::Result<()>;

    /// Push the blocked app to the UI rendered in the surface.
    fn push_blocked_app(&mut self, app_id: &AppId) -> color_eyre::eyre::Result<()>;
}

/// Read side of the overlay state, shared with the monitor and channels.
#[derive(Debug, Clone, Default)]
pub struct OverlayStatus {
    showing: Arc<AtomicBool>,
    blocked_app: Arc<Mutex<Option<AppId>>>,
}

impl OverlayStatus {
    /// Whether the overlay is attached.
    pub fn is_showing(&self) -> bool {
        self.showing.load(Ordering::SeqCst)
    }

    /// App the overlay is currently shown for.
    pub fn blocked_app(&self) -> Option<AppId> {
        self.blocked_app
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, blocked_app: Option<AppId>) {
        let showing = blocked_app.is_some();
        *self.blocked_app.lock().unwrap_or_else(|e| e.into_inner()) = blocked_app;
        self.showing.store(showing, Ordering::SeqCst);
    }
}

/// Owns the overlay surface. Must live on the UI-owning task.
pub struct OverlayController {
    surface: Box<dyn OverlaySurface>,
    status: OverlayStatus,
    route: String,
}

impl OverlayController {
    pub fn new(surface: Box<dyn OverlaySurface>) -> Self {
        Self {
            surface,
            status: OverlayStatus::default(),
            route: DEFAULT_OVERLAY_ROUTE.to_string(),
        }
    }

    /// Shared read-only status handle.
    pub fn status(&self) -> OverlayStatus {
        self.status.clone()
    }

    /// Route used by subsequent shows.
    pub fn set_route(&mut self, route: impl Into<String>) {
        self.route = route.into();
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Show the overlay for `app_id`. No-op while already showing.
    pub fn show(&mut self, app_id: &AppId) -> color_eyre::eyre::Result<()> {
        if self.status.is_showing() {
            return Ok(());
        }

        let layout = OverlayLayout::blocking(self.route.clone());
        self.surface
            .attach(&layout)
            .wrap_err("failed to attach overlay")?;
        self.status.set(Some(app_id.clone()));

        tracing::info!(app_id = %app_id, route = %self.route, "overlay shown");

        if let Err(e) = self.surface.push_blocked_app(app_id) {
            tracing::warn!(error = %e, "failed to push blocked app to overlay");
        }

        Ok(())
    }

    /// Hide the overlay. No-op when not showing.
    pub fn hide(&mut self) {
        if !self.status.is_showing() {
            return;
        }

        if let Err(e) = self.surface.detach() {
            tracing::debug!(error = %e, "overlay already detached");
        }
        self.status.set(None);

        tracing::info!("overlay hidden");
    }
}

/// Overlay operations exposed to the overlay's own channel.
pub trait OverlayControl: Send + Sync {
    /// Dismiss the overlay and forget the blocked foreground app.
    fn dismiss(&self);

    /// App the overlay is currently shown for.
    fn current_blocked_app(&self) -> Option<AppId>;
}
