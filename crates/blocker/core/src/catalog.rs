//! Installed-application catalog.

use crate::{AppId, InstalledApp};

/// Lists applications installed on the device.
pub trait AppCatalog: Send + Sync {
    /// Installed applications, optionally including system apps.
    fn installed_apps(&self, include_system: bool) -> color_eyre::eyre::Result<Vec<InstalledApp>>;

    /// Identifier of the host application itself.
    fn own_app_id(&self) -> AppId;
}

/// Apps to block for a "block all" request.
///
/// Skips excluded apps and the host application, and system apps when
/// `only_user_apps` is set.
pub fn bulk_block_candidates(
    apps: &[InstalledApp],
    exclude: &[AppId],
    own_app_id: &AppId,
    only_user_apps: bool,
) -> Vec<AppId> {
    apps.iter()
        .filter(|app| !exclude.contains(&app.id))
        .filter(|app| app.id != *own_app_id)
        .filter(|app| !only_user_apps || !app.is_system_app)
        .map(|app| app.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: &str, is_system_app: bool) -> InstalledApp {
        InstalledApp {
            id: id.into(),
            display_name: id.into(),
            is_system_app,
            icon: None,
        }
    }

    #[test]
    fn test_bulk_candidates() {
        let apps = vec![
            app("com.host", false),
            app("com.chat", false),
            app("com.game", false),
            app("com.android.settings", true),
        ];
        let own = AppId::new("com.host");

        let user_only = bulk_block_candidates(&apps, &["com.game".into()], &own, true);
        assert_eq!(user_only, vec![AppId::new("com.chat")]);

        let everything = bulk_block_candidates(&apps, &[], &own, false);
        assert_eq!(
            everything,
            vec![
                AppId::new("com.chat"),
                AppId::new("com.game"),
                AppId::new("com.android.settings"),
            ]
        );
    }
}
