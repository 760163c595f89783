//! Plugin lifecycle and channel registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use blocker_core::{AppCatalog, BlockList, OverlayControl, PermissionBackend, Permissions, ServiceControl};

use crate::{
    APP_BLOCK_MANAGER_CHANNEL, AppBlockManager, MethodCall, MethodHandler, MethodResponse,
    OVERLAY_CHANNEL, OverlayChannel, PERMISSION_MANAGER_CHANNEL, PermissionChannel,
};

/// Collaborators provided by the hosting activity.
#[derive(Clone)]
pub struct PluginContext {
    pub catalog: Arc<dyn AppCatalog>,
    pub permissions: Arc<dyn PermissionBackend>,
    pub service: Arc<dyn ServiceControl>,
}

/// Routes method calls to channel handlers.
///
/// The overlay channel is bound for the plugin's whole life. The manager
/// and permission channels exist only while a host context is attached.
pub struct BlockAppPlugin {
    blocklist: Arc<BlockList>,
    handlers: RwLock<HashMap<&'static str, Arc<dyn MethodHandler>>>,
}

impl BlockAppPlugin {
    pub fn new(blocklist: Arc<BlockList>, overlay: Arc<dyn OverlayControl>) -> Self {
        let mut handlers: HashMap<&'static str, Arc<dyn MethodHandler>> = HashMap::new();
        handlers.insert(OVERLAY_CHANNEL, Arc::new(OverlayChannel::new(overlay)));

        Self {
            blocklist,
            handlers: RwLock::new(handlers),
        }
    }

    pub fn blocklist(&self) -> &Arc<BlockList> {
        &self.blocklist
    }

    /// Bind to a host context: load the block list and install handlers.
    pub fn attach(&self, context: PluginContext) {
        self.blocklist.load();
        self.blocklist.attach_service(context.service.clone());

        let permissions = Permissions::new(context.permissions);
        let manager = AppBlockManager::new(
            self.blocklist.clone(),
            context.catalog,
            permissions.clone(),
            context.service,
        );

        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.insert(APP_BLOCK_MANAGER_CHANNEL, Arc::new(manager));
        handlers.insert(
            PERMISSION_MANAGER_CHANNEL,
            Arc::new(PermissionChannel::new(permissions)),
        );

        tracing::info!("plugin attached");
    }

    /// Unbind from the host context. Safe to call when not attached.
    pub fn detach(&self) {
        {
            let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
            handlers.remove(APP_BLOCK_MANAGER_CHANNEL);
            handlers.remove(PERMISSION_MANAGER_CHANNEL);
        }
        self.blocklist.detach_service();

        tracing::info!("plugin detached");
    }

    /// Rebind after a host configuration change.
    pub fn reattach(&self, context: PluginContext) {
        self.detach();
        self.attach(context);
    }

    pub fn is_attached(&self) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(APP_BLOCK_MANAGER_CHANNEL)
    }

    /// Dispatch a call. Unbound channels answer `NotImplemented`.
    pub fn handle(&self, channel: &str, call: &MethodCall) -> MethodResponse {
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(channel)
            .cloned();

        let Some(handler) = handler else {
            tracing::debug!(channel = %channel, method = %call.method, "no handler bound");
            return MethodResponse::NotImplemented;
        };

        handler.on_method_call(call)
    }
}
