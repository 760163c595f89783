//! macOS permission checks and System Settings deep links.

use std::process::Command;

use blocker_core::{PermissionBackend, PermissionKind};
use color_eyre::eyre::{WrapErr as _, bail};

const PRIVACY_PANE: &str = "x-apple.systempreferences:com.apple.preference.security";

/// System Settings URL for a permission.
pub fn settings_url(kind: PermissionKind) -> String {
    match kind {
        PermissionKind::Overlay => format!("{PRIVACY_PANE}?Privacy_ScreenCapture"),
        PermissionKind::UsageStats => format!("{PRIVACY_PANE}?Privacy_Automation"),
        PermissionKind::Accessibility => format!("{PRIVACY_PANE}?Privacy_Accessibility"),
        PermissionKind::Notification => {
            "x-apple.systempreferences:com.apple.preference.notifications".to_string()
        }
    }
}

/// Permission backend probing the local session.
#[derive(Debug, Default)]
pub struct MacPermissions;

impl MacPermissions {
    pub fn new() -> Self {
        Self
    }
}

fn succeeds(command: &mut Command) -> bool {
    command
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Run an AppleScript snippet and check that it printed `true`.
fn osascript_reports_true(script: &str) -> bool {
    Command::new("osascript")
        .args(["-e", script])
        .output()
        .map(|output| output.status.success() && reports_true(&output.stdout))
        .unwrap_or(false)
}

fn reports_true(stdout: &[u8]) -> bool {
    String::from_utf8_lossy(stdout).trim() == "true"
}

impl PermissionBackend for MacPermissions {
    fn is_granted(&self, kind: PermissionKind) -> bool {
        match kind {
            // Host windows may always float above other apps
            PermissionKind::Overlay | PermissionKind::Notification => true,
            // Sending Apple Events to System Events is gated by the
            // Automation grant that `settings_url(UsageStats)` opens
            PermissionKind::UsageStats => succeeds(Command::new("osascript").args([
                "-e",
                "tell application \"System Events\" to get name of first process",
            ])),
            PermissionKind::Accessibility => osascript_reports_true(
                "tell application \"System Events\" to get UI elements enabled",
            ),
        }
    }

    fn open_settings(&self, kind: PermissionKind) -> color_eyre::eyre::Result<()> {
        let url = settings_url(kind);
        tracing::info!(?kind, url = %url, "opening settings");

        let status = Command::new("open")
            .arg(&url)
            .status()
            .wrap_err("failed to run open")?;

        if !status.success() {
            bail!("open {url} exited with {status}");
        }
        Ok(())
    }
}
