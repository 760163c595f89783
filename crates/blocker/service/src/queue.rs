//! Ordered overlay action queue drained on the UI-owning task.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use blocker_core::{
    AppId, Monitor, MonitorState, OverlayAction, OverlayControl, OverlayController, OverlayStatus,
};

/// Work item for the overlay task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Apply a monitor decision.
    Apply(OverlayAction),
    /// User closed the overlay.
    Dismiss,
    /// Route used by subsequent shows.
    SetRoute(String),
}

/// Sending side of the overlay queue.
///
/// Commands are applied one at a time, in send order, by the single task
/// that owns the [`OverlayController`].
#[derive(Clone)]
pub struct OverlayQueue {
    tx: mpsc::UnboundedSender<OverlayCommand>,
    status: OverlayStatus,
    monitor: Arc<Mutex<Monitor>>,
}

impl OverlayQueue {
    /// Spawn the overlay task owning `controller`.
    pub fn spawn(controller: OverlayController) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = controller.status();
        let monitor = Arc::new(Mutex::new(Monitor::new()));

        let handle = tokio::spawn(drain(controller, rx, monitor.clone()));

        (
            Self {
                tx,
                status,
                monitor,
            },
            handle,
        )
    }

    /// Enqueue a command. Returns `false` once the overlay task is gone.
    pub fn send(&self, command: OverlayCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn status(&self) -> &OverlayStatus {
        &self.status
    }

    /// Monitor whose recorded app the overlay task clears on dismissal.
    pub fn monitor(&self) -> Arc<Mutex<Monitor>> {
        self.monitor.clone()
    }
}

impl OverlayControl for OverlayQueue {
    fn dismiss(&self) {
        if !self.send(OverlayCommand::Dismiss) {
            tracing::debug!("overlay task stopped, dismiss dropped");
        }
    }

    fn current_blocked_app(&self) -> Option<AppId> {
        match self.monitor.lock().unwrap_or_else(|e| e.into_inner()).state() {
            MonitorState::Blocking(app_id) => Some(app_id),
            MonitorState::Idle => None,
        }
    }
}

async fn drain(
    mut controller: OverlayController,
    mut rx: mpsc::UnboundedReceiver<OverlayCommand>,
    monitor: Arc<Mutex<Monitor>>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            OverlayCommand::Apply(OverlayAction::Show(app_id)) => {
                if let Err(e) = controller.show(&app_id) {
                    tracing::warn!(app_id = %app_id, error = %e, "failed to show overlay");
                    // Retry on the next transition into the app
                    monitor.lock().unwrap_or_else(|e| e.into_inner()).reset();
                }
            }
            OverlayCommand::Apply(OverlayAction::Hide) => controller.hide(),
            OverlayCommand::Dismiss => {
                controller.hide();
                monitor.lock().unwrap_or_else(|e| e.into_inner()).reset();
            }
            OverlayCommand::SetRoute(route) => controller.set_route(route),
        }
    }

    // Queue closed: nothing may stay on screen
    controller.hide();
    tracing::debug!("overlay task stopped");
}
