//! Test doubles shared by the service tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use blocker_core::{
    AppId, BlockList, MemoryPersistence, MonitorConfig, OverlayController, OverlayLayout,
    OverlaySurface, UsageEvent, UsageEventKind, UsageEventSource,
};

use crate::{BlockingService, OverlayQueue};

/// Usage source reporting a scripted foreground app.
#[derive(Default)]
pub struct ScriptedSource {
    foreground: Mutex<Option<AppId>>,
    failing: Mutex<bool>,
    delay: Mutex<Duration>,
}

impl ScriptedSource {
    pub fn set_foreground(&self, app_id: Option<&str>) {
        *self.foreground.lock().unwrap() = app_id.map(AppId::from);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Make each query block its worker thread for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

impl UsageEventSource for ScriptedSource {
    async fn query_events(
        &self,
        _from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> color_eyre::eyre::Result<Vec<UsageEvent>> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        if *self.failing.lock().unwrap() {
            color_eyre::eyre::bail!("usage stats permission revoked");
        }

        let foreground = self.foreground.lock().unwrap().clone();
        Ok(foreground
            .map(|app_id| UsageEvent::new(app_id, UsageEventKind::ActivityResumed, to))
            .into_iter()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Attach(OverlayLayout),
    Detach,
    Push(AppId),
}

/// Overlay surface recording every call.
#[derive(Clone, Default)]
pub struct SurfaceProbe {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl SurfaceProbe {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn attach_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Attach(_)))
            .count()
    }

    pub fn detach_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, SurfaceCall::Detach))
            .count()
    }

    pub fn pushed(&self) -> Vec<AppId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Push(app_id) => Some(app_id),
                _ => None,
            })
            .collect()
    }

    pub fn routes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Attach(layout) => Some(layout.route),
                _ => None,
            })
            .collect()
    }
}

impl OverlaySurface for SurfaceProbe {
    fn attach(&mut self, layout: &OverlayLayout) -> color_eyre::eyre::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Attach(layout.clone()));
        Ok(())
    }

    fn detach(&mut self) -> color_eyre::eyre::Result<()> {
        self.calls.lock().unwrap().push(SurfaceCall::Detach);
        Ok(())
    }

    fn push_blocked_app(&mut self, app_id: &AppId) -> color_eyre::eyre::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(SurfaceCall::Push(app_id.clone()));
        Ok(())
    }
}

/// Wired-up service collaborators with a fast poll interval.
pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub surface: SurfaceProbe,
    pub blocklist: Arc<BlockList>,
    pub queue: OverlayQueue,
}

impl Harness {
    pub fn new(blocked: &[&str]) -> Self {
        let persistence = MemoryPersistence::with_apps(blocked.iter().map(|&id| AppId::from(id)));
        let blocklist = Arc::new(BlockList::new(Arc::new(persistence)));
        blocklist.load();

        let surface = SurfaceProbe::default();
        let (queue, _) = OverlayQueue::spawn(OverlayController::new(Box::new(surface.clone())));

        Self {
            source: Arc::new(ScriptedSource::default()),
            surface,
            blocklist,
            queue,
        }
    }

    pub fn config() -> MonitorConfig {
        MonitorConfig {
            poll_interval: Duration::from_millis(10),
            lookback: Duration::from_secs(5),
        }
    }

    pub fn service(&self) -> BlockingService<ScriptedSource> {
        BlockingService::new(
            Self::config(),
            self.source.clone(),
            self.blocklist.clone(),
            self.queue.clone(),
        )
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);

    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
