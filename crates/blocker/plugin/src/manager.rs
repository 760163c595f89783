//! App block manager channel.

use std::sync::Arc;

use blocker_core::{
    AppCatalog, AppId, BlockList, InstalledApp, PermissionKind, Permissions, ServiceControl,
    bulk_block_candidates,
};

use crate::{ChannelError, MethodCall, MethodHandler, MethodResponse, respond};

/// Handles block list CRUD, installed-app listing and service control.
pub struct AppBlockManager {
    blocklist: Arc<BlockList>,
    catalog: Arc<dyn AppCatalog>,
    permissions: Permissions,
    service: Arc<dyn ServiceControl>,
}

impl AppBlockManager {
    pub fn new(
        blocklist: Arc<BlockList>,
        catalog: Arc<dyn AppCatalog>,
        permissions: Permissions,
        service: Arc<dyn ServiceControl>,
    ) -> Self {
        Self {
            blocklist,
            catalog,
            permissions,
            service,
        }
    }

    fn installed_apps(&self, call: &MethodCall) -> Result<Vec<InstalledApp>, ChannelError> {
        let include_system = call.argument("includeSystemApps")?.unwrap_or(false);

        self.catalog
            .installed_apps(include_system)
            .map_err(|e| ChannelError::failed("Failed to get installed apps", &e))
    }

    fn block_app(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let app_id: AppId = call.required_argument("packageName")?;
        tracing::info!(app_id = %app_id, "blocking app");
        self.blocklist.add(app_id);
        Ok(true)
    }

    fn unblock_app(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let app_id: AppId = call.required_argument("packageName")?;
        tracing::info!(app_id = %app_id, "unblocking app");
        self.blocklist.remove(app_id.as_str());
        Ok(true)
    }

    fn set_blocked_apps(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let app_ids: Vec<AppId> = call.required_argument("packageNames")?;
        self.blocklist.set_all(app_ids);
        Ok(true)
    }

    fn is_app_blocked(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let app_id: AppId = call.required_argument("packageName")?;
        Ok(self.blocklist.contains(app_id.as_str()))
    }

    fn block_all_apps(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let exclude: Vec<AppId> = call.argument("excludePackages")?.unwrap_or_default();
        let only_user_apps = call.argument("onlyUserApps")?.unwrap_or(true);

        let apps = self
            .catalog
            .installed_apps(true)
            .map_err(|e| ChannelError::failed("Failed to block all apps", &e))?;

        let candidates =
            bulk_block_candidates(&apps, &exclude, &self.catalog.own_app_id(), only_user_apps);
        tracing::info!(count = candidates.len(), "blocking all apps");

        self.blocklist.extend(candidates);
        Ok(true)
    }

    fn request_permission(&self, kind: PermissionKind) -> Result<bool, ChannelError> {
        self.permissions
            .request(kind)
            .map_err(|e| ChannelError::failed("Failed to request permission", &e))?;
        Ok(true)
    }

    fn start_blocking_service(&self, call: &MethodCall) -> Result<bool, ChannelError> {
        let overlay_route: Option<String> = call.argument("customOverlayRoute")?;
        self.service.start_service(overlay_route);
        Ok(true)
    }
}

impl MethodHandler for AppBlockManager {
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        match call.method.as_str() {
            "getInstalledApps" => respond(self.installed_apps(call)),
            "blockApp" => respond(self.block_app(call)),
            "unblockApp" => respond(self.unblock_app(call)),
            "setBlockedApps" => respond(self.set_blocked_apps(call)),
            "getBlockedApps" => MethodResponse::success(self.blocklist.snapshot()),
            "isAppBlocked" => respond(self.is_app_blocked(call)),
            "checkPermissions" => MethodResponse::success(self.permissions.summary()),
            "requestOverlayPermission" => respond(self.request_permission(PermissionKind::Overlay)),
            "requestUsageStatsPermission" => {
                respond(self.request_permission(PermissionKind::UsageStats))
            }
            "blockAllApps" => respond(self.block_all_apps(call)),
            "unblockAllApps" => {
                self.blocklist.clear();
                MethodResponse::success(true)
            }
            "startBlockingService" => respond(self.start_blocking_service(call)),
            "stopBlockingService" => {
                self.service.stop_service();
                MethodResponse::success(true)
            }
            _ => MethodResponse::NotImplemented,
        }
    }
}
