//! Block App Host - desktop host for the app blocker.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use blocker_core::{BlockList, OverlayController, ServiceControl as _};
use blocker_host::catalog::BundleCatalog;
use blocker_host::config::Config;
use blocker_host::frontmost::FrontmostSource;
use blocker_host::overlay::{WatchSurface, overlay_router};
use blocker_host::permissions::MacPermissions;
use blocker_plugin::{BlockAppPlugin, PluginContext, channel_router};
use blocker_service::{BlockingService, OverlayQueue, Supervisor};
use color_eyre::eyre::WrapErr as _;
use tokio::signal::unix::{SignalKind, signal};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("blocker-host starting");

    let config = match Config::load() {
        Ok(config) => {
            tracing::info!(path = %Config::config_path().display(), "configuration loaded");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config, using defaults");
            Config::default()
        }
    };

    // Initialize storage
    let database_url = config.database_url();
    if let Some(parent) = Path::new(&database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).wrap_err("failed to create data directory")?;
        }
    }

    let storage = blocker_storage::SqliteStorage::new(&database_url)
        .wrap_err("failed to initialize storage")?;

    storage
        .run_migrations()
        .wrap_err("failed to run migrations")?;

    let blocklist = Arc::new(BlockList::new(Arc::new(storage)));

    // Overlay task owns the surface
    let (surface, overlay_view) = WatchSurface::new();
    let mut controller = OverlayController::new(Box::new(surface));
    controller.set_route(config.overlay.route.clone());
    let (overlay, overlay_task) = OverlayQueue::spawn(controller);

    let service = BlockingService::new(
        config.monitor(),
        Arc::new(FrontmostSource::new()),
        blocklist.clone(),
        overlay.clone(),
    );
    let (supervisor, handle) = Supervisor::new(service);
    let supervisor = tokio::spawn(supervisor.run());

    let plugin = Arc::new(BlockAppPlugin::new(
        blocklist.clone(),
        Arc::new(overlay.clone()),
    ));
    plugin.attach(PluginContext {
        catalog: Arc::new(BundleCatalog::new(config.host.own_app_id.as_str())),
        permissions: Arc::new(MacPermissions::new()),
        service: Arc::new(handle.clone()),
    });

    // Resume blocking for a persisted list
    if !blocklist.is_empty() {
        handle.start_service(None);
    }

    let app = Router::new()
        .merge(channel_router(plugin.clone()))
        .merge(overlay_router(overlay_view))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.listen;
    tracing::info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err("failed to bind")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("server error")?;

    plugin.detach();
    handle.shutdown();
    supervisor.await.wrap_err("supervisor task failed")?;

    // Last senders gone: the overlay task hides and exits
    drop(plugin);
    drop(overlay);
    overlay_task.await.wrap_err("overlay task failed")?;

    tracing::info!("blocker-host stopped");
    Ok(())
}

async fn shutdown_signal() {
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => tracing::info!("received SIGINT"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
