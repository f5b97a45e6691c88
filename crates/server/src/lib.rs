//! HTTP front end for protestmap suggestions.
//!
//! Validates `POST /api/getValues` bodies, answers them from a lazily loaded
//! and periodically refreshed [`SearchIndexManager`], and reports the served
//! dataset version on `GET /api/dataset`.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod router;

use std::sync::Arc;

use protestmap_index::{HttpIndexSource, ManagerOptions, SearchIndexManager};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use api::parse_query_request;
pub use cli::{Args, init_tracing};
pub use config::ServerConfig;
pub use error::{ConfigError, ServerError, ValidationError};
pub use router::router;

/// Builds a manager reading datasets over HTTP from `config.data_root`.
pub fn http_manager(config: &ServerConfig) -> Result<SearchIndexManager, Box<dyn std::error::Error>> {
	let source = HttpIndexSource::new(config.data_root_url()?)?;
	let options = ManagerOptions {
		poll_interval: config.poll_interval(),
		..ManagerOptions::default()
	};
	Ok(SearchIndexManager::with_options(Arc::new(source), options))
}

/// Serves until ctrl-c, then lets any background reload finish.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
	let manager = http_manager(&config)?;
	let listener = TcpListener::bind(config.bind).await?;
	info!(bind = %config.bind, data_root = %config.data_root, "server.listening");

	axum::serve(listener, router(manager.clone()))
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	if let Some(Err(error)) = manager.wait_for_pending_load().await {
		warn!(%error, "server.shutdown.reload_failed");
	}
	info!("server.stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(error) = tokio::signal::ctrl_c().await {
		warn!(%error, "server.signal_handler_failed");
		std::future::pending::<()>().await;
	}
}
