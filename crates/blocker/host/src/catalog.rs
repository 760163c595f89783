//! Installed applications discovered from app bundles.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use blocker_core::{AppCatalog, AppId, InstalledApp};
use color_eyre::eyre::WrapErr as _;
use serde::Deserialize;

/// Bundle roots searched by default.
pub const DEFAULT_ROOTS: &[&str] = &["/Applications", "/System/Applications"];

#[derive(Debug, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleIdentifier")]
    bundle_id: Option<String>,
    #[serde(rename = "CFBundleDisplayName")]
    display_name: Option<String>,
    #[serde(rename = "CFBundleName")]
    name: Option<String>,
}

/// Catalog of `.app` bundles under a set of roots.
///
/// Bundles under `/System` are reported as system apps.
pub struct BundleCatalog {
    roots: Vec<PathBuf>,
    own_app_id: AppId,
}

impl BundleCatalog {
    pub fn new(own_app_id: impl Into<AppId>) -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(PathBuf::from).collect(), own_app_id)
    }

    pub fn with_roots(roots: Vec<PathBuf>, own_app_id: impl Into<AppId>) -> Self {
        Self {
            roots,
            own_app_id: own_app_id.into(),
        }
    }

    fn scan_root(&self, root: &Path, apps: &mut Vec<InstalledApp>) -> color_eyre::eyre::Result<()> {
        let is_system_app = root.starts_with("/System");
        let entries = std::fs::read_dir(root)
            .wrap_err_with(|| format!("failed to list {}", root.display()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "app") {
                continue;
            }

            match read_bundle(&path, is_system_app) {
                Ok(Some(app)) => apps.push(app),
                Ok(None) => {}
                Err(e) => tracing::debug!(bundle = %path.display(), error = %e, "skipping bundle"),
            }
        }

        Ok(())
    }
}

fn read_bundle(path: &Path, is_system_app: bool) -> color_eyre::eyre::Result<Option<InstalledApp>> {
    let info: InfoPlist = plist::from_file(path.join("Contents").join("Info.plist"))
        .wrap_err("failed to parse Info.plist")?;

    let Some(bundle_id) = info.bundle_id else {
        return Ok(None);
    };

    let display_name = info
        .display_name
        .or(info.name)
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| bundle_id.clone());

    Ok(Some(InstalledApp {
        id: AppId::new(bundle_id),
        display_name,
        is_system_app,
        icon: None,
    }))
}

impl AppCatalog for BundleCatalog {
    fn installed_apps(&self, include_system: bool) -> color_eyre::eyre::Result<Vec<InstalledApp>> {
        let mut apps = Vec::new();

        for root in &self.roots {
            if !include_system && root.starts_with("/System") {
                continue;
            }
            if let Err(e) = self.scan_root(root, &mut apps) {
                tracing::warn!(root = %root.display(), error = %e, "failed to scan applications");
            }
        }

        let mut seen = HashSet::new();
        apps.retain(|app| seen.insert(app.id.clone()));
        apps.sort_by_key(|app| app.display_name.to_lowercase());
        Ok(apps)
    }

    fn own_app_id(&self) -> AppId {
        self.own_app_id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bundle(root: &Path, dir: &str, plist: &str) {
        let contents = root.join(dir).join("Contents");
        std::fs::create_dir_all(&contents).unwrap();
        std::fs::write(contents.join("Info.plist"), plist).unwrap();
    }

    fn info_plist(entries: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
{entries}
</dict>
</plist>"#
        )
    }

    #[test]
    fn test_scans_bundles() {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(
            dir.path(),
            "Chat.app",
            &info_plist(
                "<key>CFBundleIdentifier</key><string>com.example.chat</string>\
                 <key>CFBundleDisplayName</key><string>Chat</string>",
            ),
        );
        write_bundle(
            dir.path(),
            "Arcade.app",
            &info_plist("<key>CFBundleIdentifier</key><string>com.example.arcade</string>"),
        );
        write_bundle(dir.path(), "Broken.app", "not a plist");
        write_bundle(
            dir.path(),
            "NoId.app",
            &info_plist("<key>CFBundleName</key><string>NoId</string>"),
        );
        std::fs::create_dir_all(dir.path().join("notes")).unwrap();

        let catalog = BundleCatalog::with_roots(vec![dir.path().to_path_buf()], "com.example.host");
        let apps = catalog.installed_apps(false).unwrap();

        let names: Vec<_> = apps.iter().map(|a| a.display_name.as_str()).collect();
        assert_eq!(names, vec!["Arcade", "Chat"]);
        assert!(apps.iter().all(|a| !a.is_system_app));
        assert_eq!(catalog.own_app_id(), AppId::new("com.example.host"));
    }

    #[test]
    fn test_missing_root_is_not_fatal() {
        let catalog = BundleCatalog::with_roots(vec![PathBuf::from("/nonexistent/apps")], "com.host");
        assert!(catalog.installed_apps(true).unwrap().is_empty());
    }
}
