//! Overlay surface published to the UI over HTTP.

use axum::Router;
use axum::extract::{Json, State};
use axum::routing::get;
use blocker_core::{AppId, OverlayLayout, OverlaySurface};
use color_eyre::eyre::bail;
use serde::Serialize;
use tokio::sync::watch;

/// What the overlay window should currently render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub visible: bool,
    pub route: Option<String>,
    pub blocked_app: Option<AppId>,
}

/// Overlay surface backed by a watch channel.
///
/// The UI process polls `GET /overlay` and draws a full-screen window
/// while `visible` is set.
pub struct WatchSurface {
    tx: watch::Sender<OverlayView>,
}

impl WatchSurface {
    pub fn new() -> (Self, watch::Receiver<OverlayView>) {
        let (tx, rx) = watch::channel(OverlayView::default());
        (Self { tx }, rx)
    }
}

impl OverlaySurface for WatchSurface {
    fn attach(&mut self, layout: &OverlayLayout) -> color_eyre::eyre::Result<()> {
        if self.tx.borrow().visible {
            bail!("overlay window already attached");
        }

        self.tx.send_modify(|view| {
            view.visible = true;
            view.route = Some(layout.route.clone());
        });
        Ok(())
    }

    fn detach(&mut self) -> color_eyre::eyre::Result<()> {
        if !self.tx.borrow().visible {
            bail!("overlay window not attached");
        }

        self.tx.send_replace(OverlayView::default());
        Ok(())
    }

    fn push_blocked_app(&mut self, app_id: &AppId) -> color_eyre::eyre::Result<()> {
        self.tx.send_modify(|view| view.blocked_app = Some(app_id.clone()));
        Ok(())
    }
}

/// `GET /overlay`: current [`OverlayView`].
pub fn overlay_router(view: watch::Receiver<OverlayView>) -> Router {
    Router::new()
        .route("/overlay", get(current_view))
        .with_state(view)
}

async fn current_view(State(view): State<watch::Receiver<OverlayView>>) -> Json<OverlayView> {
    Json(view.borrow().clone())
}
