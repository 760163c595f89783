//! Start/stop signalling for the blocking service.

use tokio::sync::mpsc;

use blocker_core::{ServiceControl, UsageEventSource};

use crate::BlockingService;

/// Lifecycle request for the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceSignal {
    Start { overlay_route: Option<String> },
    Stop,
    Shutdown,
}

/// Cheap, cloneable handle to a running [`Supervisor`].
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<ServiceSignal>,
}

impl ServiceHandle {
    fn signal(&self, signal: ServiceSignal) {
        if self.tx.send(signal).is_err() {
            tracing::debug!("supervisor gone, signal dropped");
        }
    }

    /// Stop the service and end the supervisor.
    pub fn shutdown(&self) {
        self.signal(ServiceSignal::Shutdown);
    }
}

impl ServiceControl for ServiceHandle {
    fn start_service(&self, overlay_route: Option<String>) {
        self.signal(ServiceSignal::Start { overlay_route });
    }

    fn stop_service(&self) {
        self.signal(ServiceSignal::Stop);
    }
}

/// Owns the [`BlockingService`] and applies lifecycle signals in order.
pub struct Supervisor<S> {
    rx: mpsc::UnboundedReceiver<ServiceSignal>,
    service: BlockingService<S>,
}

impl<S> Supervisor<S>
where
    S: UsageEventSource + 'static,
{
    pub fn new(service: BlockingService<S>) -> (Self, ServiceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx, service }, ServiceHandle { tx })
    }

    /// Apply signals until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(signal) = self.rx.recv().await {
            match signal {
                ServiceSignal::Start { overlay_route } => {
                    if let Some(route) = overlay_route {
                        self.service.set_overlay_route(route);
                    }
                    self.service.start();
                }
                ServiceSignal::Stop => self.service.stop().await,
                ServiceSignal::Shutdown => break,
            }
        }

        self.service.stop().await;
        tracing::info!("supervisor stopped");
    }
}
