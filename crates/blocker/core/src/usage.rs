//! Usage events and foreground-app resolution.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppId;

/// Kind of usage event reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventKind {
    ActivityResumed,
    ActivityPaused,
    Other,
}

/// A single usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub app_id: AppId,
    pub kind: UsageEventKind,
    pub timestamp: DateTime<Utc>,
}

impl UsageEvent {
    pub fn new(app_id: impl Into<AppId>, kind: UsageEventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            app_id: app_id.into(),
            kind,
            timestamp,
        }
    }

    /// Whether this event marks an activity transition.
    pub fn is_foreground_transition(&self) -> bool {
        matches!(
            self.kind,
            UsageEventKind::ActivityResumed | UsageEventKind::ActivityPaused
        )
    }
}

/// Source of OS usage events.
#[trait_variant::make(Send)]
pub trait UsageEventSource: Send + Sync {
    /// Events that occurred in `[from, to]`, in the order the OS reports them.
    async fn query_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> color_eyre::eyre::Result<Vec<UsageEvent>>;
}

/// Pick the foreground app from a window of events.
///
/// The latest activity transition wins; among equal timestamps the one
/// reported last wins. Returns `None` when the window has no transition.
pub fn latest_foreground(events: &[UsageEvent]) -> Option<AppId> {
    events
        .iter()
        .filter(|event| event.is_foreground_transition())
        .fold(None::<&UsageEvent>, |latest, event| match latest {
            Some(prev) if prev.timestamp > event.timestamp => Some(prev),
            _ => Some(event),
        })
        .map(|event| event.app_id.clone())
}

/// Query the trailing `lookback` window ending at `now` and resolve the
/// foreground app.
///
/// Query failures are swallowed and reported as unknown (`None`).
pub async fn resolve_foreground<S: UsageEventSource>(
    source: &S,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Option<AppId> {
    let lookback = chrono::Duration::from_std(lookback).unwrap_or(chrono::Duration::seconds(5));

    match source.query_events(now - lookback, now).await {
        Ok(events) => latest_foreground(&events),
        Err(e) => {
            tracing::debug!(error = %e, "usage query failed, foreground unknown this tick");
            None
        }
    }
}
