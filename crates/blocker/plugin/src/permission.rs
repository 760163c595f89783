//! Permission manager channel.

use blocker_core::{PermissionKind, Permissions};

use crate::{ChannelError, MethodCall, MethodHandler, MethodResponse, respond};

/// Per-kind `check…Permission` / `request…Permission` methods.
pub struct PermissionChannel {
    permissions: Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermissionOp {
    Check,
    Request,
}

impl PermissionChannel {
    pub fn new(permissions: Permissions) -> Self {
        Self { permissions }
    }
}

/// Split `checkUsageStatsPermission` into its operation and kind.
fn parse_method(method: &str) -> Option<(PermissionOp, PermissionKind)> {
    let (op, rest) = if let Some(rest) = method.strip_prefix("check") {
        (PermissionOp::Check, rest)
    } else {
        (PermissionOp::Request, method.strip_prefix("request")?)
    };

    let kind = match rest.strip_suffix("Permission")? {
        "Overlay" => PermissionKind::Overlay,
        "UsageStats" => PermissionKind::UsageStats,
        "Notification" => PermissionKind::Notification,
        "Accessibility" => PermissionKind::Accessibility,
        _ => return None,
    };

    Some((op, kind))
}

impl MethodHandler for PermissionChannel {
    fn on_method_call(&self, call: &MethodCall) -> MethodResponse {
        match parse_method(&call.method) {
            Some((PermissionOp::Check, kind)) => MethodResponse::success(self.permissions.check(kind)),
            Some((PermissionOp::Request, kind)) => respond(
                self.permissions
                    .request(kind)
                    .map_err(|e| ChannelError::failed("Failed to open permission settings", &e)),
            ),
            None => MethodResponse::NotImplemented,
        }
    }
}
