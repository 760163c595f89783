//! Foreground-app monitor state machine.

use std::time::Duration;

use crate::AppId;

/// Default poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default trailing window for usage queries.
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(5);

/// Monitor timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub lookback: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

/// Observable monitor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorState {
    /// No blocked app in the foreground.
    Idle,
    /// The overlay was requested for this app.
    Blocking(AppId),
}

/// Request for the overlay controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayAction {
    Show(AppId),
    Hide,
}

/// Two-state monitor advanced once per poll.
#[derive(Debug, Default)]
pub struct Monitor {
    foreground: Option<AppId>,
}

impl Monitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MonitorState {
        match &self.foreground {
            Some(app_id) => MonitorState::Blocking(app_id.clone()),
            None => MonitorState::Idle,
        }
    }

    /// Advance the state machine by one poll.
    ///
    /// `current` is the resolved foreground app (`None` when unknown, in
    /// which case nothing changes). `overlay_showing` is read from the
    /// overlay controller; the monitor never toggles it.
    pub fn tick(
        &mut self,
        current: Option<&AppId>,
        is_blocked: impl Fn(&AppId) -> bool,
        overlay_showing: bool,
    ) -> Option<OverlayAction> {
        let current = current?;

        if is_blocked(current) {
            if self.foreground.as_ref() == Some(current) {
                return None;
            }

            tracing::info!(app_id = %current, "blocked app in foreground");
            self.foreground = Some(current.clone());
            return Some(OverlayAction::Show(current.clone()));
        }

        self.foreground = None;

        if overlay_showing {
            tracing::info!(app_id = %current, "left blocked app");
            Some(OverlayAction::Hide)
        } else {
            None
        }
    }

    /// Forget the recorded app after the overlay was dismissed or failed.
    pub fn reset(&mut self) {
        self.foreground = None;
    }
}
