use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::{directory::DirectoryService, file::profile_store::ProfileStore, runtime, storage::LoadSource};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the profile store at `data_file` and wrap it in the directory service.
pub async fn build_state(data_file: &str) -> Result<AppState, StartupError> {
    if data_file.trim().is_empty() {
        return Err(StartupError::InvalidConfig("storage.data_file is empty".into()));
    }
    runtime::ensure_env(data_file).await?;

    let store = ProfileStore::new(data_file).await?;
    let directory = DirectoryService::new(store);
    match directory.load_source().await {
        LoadSource::Corrupt { reason } => {
            warn!(%data_file, %reason, "profile data was unreadable and has been set aside; directory starts empty");
        }
        source => info!(
            %data_file,
            source = source.as_str(),
            rejected = source.rejected(),
            "profile store ready"
        ),
    }
    Ok(AppState { directory: Arc::new(directory) })
}

pub fn build_app(state: AppState) -> Router {
    routes::build_router(state, build_cors())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!(service = "tutor-directory", event = "shutdown_signal", "shutdown signal received");
    }
}

/// Public entry: build the app and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_state(&cfg.storage.data_file).await?;
    let app = build_app(state);

    let listener = TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "starting tutor directory");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
