use scan_desk::{AppState, Config, load_preferences, remote::HttpStudentService, router};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.prefs_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let preferences = load_preferences(&config.prefs_path).await;
    let service = Arc::new(HttpStudentService::new(
        config.student_api_url.clone(),
        config.request_timeout,
    )?);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let poll_interval = config.poll_interval;
    info!(remote = %config.student_api_url, "using student service");

    let state = AppState::new(config, preferences, service);
    let sync_task = state.syncer.spawn_loop(poll_interval);
    let app = router(state);

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sync_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
