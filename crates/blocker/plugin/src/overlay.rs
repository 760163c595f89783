//! Overlay channel, used by the UI rendered inside the overlay.

use std::sync::Arc;

use blocker_core::OverlayControl;

use crate::{MethodCall, MethodHandler, MethodResponse};

pub struct OverlayChannel {
    control: Arc<dyn OverlayControl>,
}

impl OverlayChannel {
    pub fn new(control: Arc<dyn OverlayControl>) -> Self {
        Self { control }
    }
}

impl MethodHandler for OverlayChannel {
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            "closeOverlay" => {
                self.control.dismiss();
                MethodResponse::success(true)
            }
            "getCurrentBlockedApp" => {
                let current = self.control.current_blocked_app();
                MethodResponse::success(current.map(|id| id.to_string()).unwrap_or_default())
            }
            _ => MethodResponse::NotImplemented,
        }
    }
}
