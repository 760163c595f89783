//! Foreground polling service.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use blocker_core::{
    BlockList, Monitor, MonitorConfig, MonitorState, OverlayAction, UsageEventSource,
    resolve_foreground,
};

use crate::{OverlayCommand, OverlayQueue};

/// Polls the foreground app and drives the overlay.
pub struct BlockingService<S> {
    config: MonitorConfig,
    source: Arc<S>,
    blocklist: Arc<BlockList>,
    overlay: OverlayQueue,
    monitor: Arc<Mutex<Monitor>>,
    poller: Option<JoinHandle<()>>,
}

impl<S> BlockingService<S>
where
    S: UsageEventSource + 'static,
{
    pub fn new(
        config: MonitorConfig,
        source: Arc<S>,
        blocklist: Arc<BlockList>,
        overlay: OverlayQueue,
    ) -> Self {
        let monitor = overlay.monitor();
        Self {
            config,
            source,
            blocklist,
            overlay,
            monitor,
            poller: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.poller.as_ref().is_some_and(|poller| !poller.is_finished())
    }

    pub fn monitor_state(&self) -> MonitorState {
        self.monitor.lock().unwrap_or_else(|e| e.into_inner()).state()
    }

    /// Route the overlay navigates to on subsequent shows.
    pub fn set_overlay_route(&self, route: String) {
        self.overlay.send(OverlayCommand::SetRoute(route));
    }

    /// Start polling. No-op if already running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        tracing::info!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            blocked = self.blocklist.len(),
            "blocking service started"
        );

        self.poller = Some(tokio::spawn(poll_loop(
            self.config,
            self.source.clone(),
            self.blocklist.clone(),
            self.overlay.clone(),
            self.monitor.clone(),
        )));
    }

    /// Stop polling and detach any overlay. Safe to call repeatedly.
    ///
    /// Waits for the poll task to end first, so a tick already past its
    /// query cannot enqueue a show after the final hide.
    pub async fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            if let Err(e) = poller.await {
                if e.is_panic() {
                    tracing::warn!(error = %e, "poll task panicked");
                }
            }
            tracing::info!("blocking service stopped");
        }

        self.monitor.lock().unwrap_or_else(|e| e.into_inner()).reset();
        self.overlay.send(OverlayCommand::Apply(OverlayAction::Hide));
    }
}

async fn poll_loop<S: UsageEventSource>(
    config: MonitorConfig,
    source: Arc<S>,
    blocklist: Arc<BlockList>,
    overlay: OverlayQueue,
    monitor: Arc<Mutex<Monitor>>,
) {
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let current = resolve_foreground(source.as_ref(), Utc::now(), config.lookback).await;

        let action = monitor.lock().unwrap_or_else(|e| e.into_inner()).tick(
            current.as_ref(),
            |app_id| blocklist.contains(app_id.as_str()),
            overlay.status().is_showing(),
        );

        if let Some(action) = action {
            if !overlay.send(OverlayCommand::Apply(action)) {
                tracing::warn!("overlay task gone, stopping poll loop");
                break;
            }
        }
    }
}
