//! Foreground usage events derived from lsappinfo.

use std::sync::Mutex;

use blocker_core::{AppId, UsageEvent, UsageEventKind, UsageEventSource};
use chrono::{DateTime, Utc};
use color_eyre::eyre::WrapErr as _;
use tokio::process::Command;

/// Get the frontmost application.
///
/// Returns (bundle_id, name) if available.
pub async fn frontmost_app() -> color_eyre::eyre::Result<Option<(String, String)>> {
    let output = Command::new("lsappinfo")
        .args([
            "info", "-only", "bundleid", "-only", "name", "-app", "front",
        ])
        .output()
        .await
        .wrap_err("failed to run lsappinfo")?;

    if !output.status.success() {
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_lsappinfo_output(&stdout))
}

pub(crate) fn parse_lsappinfo_output(output: &str) -> Option<(String, String)> {
    let mut bundle_id = None;
    let mut name = None;

    for line in output.lines() {
        let line = line.trim();

        if let Some(value) = line.strip_prefix("\"bundleid\"=") {
            bundle_id = Some(value.trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("\"name\"=") {
            name = Some(value.trim_matches('"').to_string());
        }
    }

    match (bundle_id, name) {
        (Some(b), Some(n)) => Some((b, n)),
        (Some(b), None) => Some((b.clone(), b)),
        _ => None,
    }
}

/// Usage-event source for macOS.
///
/// macOS keeps no queryable history of app activations, so each query
/// samples the frontmost app and records a paused/resumed pair whenever it
/// changed since the previous sample. Queries return the recorded
/// transitions inside the requested window.
#[derive(Default)]
pub struct FrontmostSource {
    state: Mutex<Transitions>,
}

#[derive(Default)]
struct Transitions {
    current: Option<AppId>,
    events: Vec<UsageEvent>,
}

impl FrontmostSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, front: Option<AppId>, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<UsageEvent> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if front.is_some() && front != state.current {
            if let Some(previous) = state.current.take() {
                state
                    .events
                    .push(UsageEvent::new(previous, UsageEventKind::ActivityPaused, to));
            }
            if let Some(app_id) = &front {
                tracing::debug!(app_id = %app_id, "frontmost app changed");
                state
                    .events
                    .push(UsageEvent::new(app_id.clone(), UsageEventKind::ActivityResumed, to));
            }
            state.current = front;
        }

        state.events.retain(|event| event.timestamp >= from);
        state
            .events
            .iter()
            .filter(|event| event.timestamp <= to)
            .cloned()
            .collect()
    }
}

impl UsageEventSource for FrontmostSource {
    async fn query_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> color_eyre::eyre::Result<Vec<UsageEvent>> {
        let front = frontmost_app().await?.map(|(bundle_id, _)| AppId::new(bundle_id));
        Ok(self.record(front, from, to))
    }
}
