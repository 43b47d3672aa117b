use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use blink_vault::{FsBlobStore, Vault};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// Blink image server.
pub struct BlinkServer {
    config: ServerConfig,
}

impl BlinkServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Open the storage root, sweeping blobs a previous process left behind.
    ///
    /// Those blobs have no code and no timer. Only files older than the TTL
    /// are removed, so a root shared with a live server is left intact.
    pub async fn open_store(&self) -> ServerResult<Arc<FsBlobStore>> {
        self.config.validate()?;
        let store = FsBlobStore::open(&self.config.storage_root).await?;
        if self.config.sweep_on_start {
            let report = store.sweep_orphans(self.config.ttl()).await?;
            info!(
                root = %store.root().display(),
                removed = report.removed,
                kept_recent = report.kept_recent,
                bytes_freed = report.bytes_freed,
                failed = report.failed,
                "swept orphaned blobs"
            );
        }
        Ok(Arc::new(store))
    }

    pub fn state_for(&self, store: Arc<FsBlobStore>) -> AppState {
        let vault = Vault::new(store, self.config.vault_config());
        AppState::new(Arc::new(vault), self.config.public_base_url.clone())
    }

    /// Open the storage root and build the service state.
    pub async fn build_state(&self) -> ServerResult<AppState> {
        let store = self.open_store().await?;
        Ok(self.state_for(store))
    }

    pub fn router(&self, state: AppState) -> axum::Router {
        build_router(state, self.config.body_limit())
    }

    /// Start serving requests until ctrl-c.
    pub async fn serve(self) -> ServerResult<()> {
        let store = self.open_store().await?;
        let sweeper = spawn_sweeper(Arc::clone(&store), self.config.ttl());
        let app = self.router(self.state_for(store));
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!(
            addr = %self.config.bind_addr,
            root = %self.config.storage_root.display(),
            ttl_secs = self.config.ttl_secs,
            "Blink server listening"
        );
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()));
        sweeper.abort();
        served
    }
}

/// Periodically reclaim untracked blobs older than `ttl`, such as files whose
/// write was interrupted after a blocking open had already started.
fn spawn_sweeper(store: Arc<FsBlobStore>, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(ttl);
        // The startup sweep already ran.
        timer.tick().await;
        loop {
            timer.tick().await;
            match store.sweep_orphans(ttl).await {
                Ok(report) if report.removed > 0 => {
                    debug!(removed = report.removed, "periodic sweep reclaimed blobs")
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "periodic sweep failed"),
            }
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested; pending expiries are dropped with the process");
}
