//! Logger module
//!
//! Thin facade over `tracing` used throughout the server:
//! - Subscriber setup from `logging.level` (`RUST_LOG` wins when set)
//! - Server lifecycle logging
//! - Access logging with multiple formats on the `access` target
//! - Error and warning logging

mod format;

pub use format::{AccessLogEntry, LogFormat};

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};

/// Install the global tracing subscriber
///
/// Should be called once at application startup. A second call leaves the
/// first subscriber in place.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("[WARN] Logger already initialized: {e}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, movie_count: usize) {
    tracing::info!("Movie registry listening on http://{addr}");
    tracing::info!("Store initialized with {movie_count} movies");
    tracing::info!(
        level = %config.logging.level,
        access_log = config.logging.access_log,
        id_strategy = ?config.store.id_strategy,
        seeded = config.store.seed,
        legacy_silent_errors = config.http.legacy_silent_errors,
        "Configuration loaded"
    );
    match config.server.workers {
        Some(workers) => tracing::info!("Worker threads: {workers}"),
        None => tracing::info!("Worker threads: default (CPU cores)"),
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(active_connections, "Shutdown requested, no longer accepting connections");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &LogFormat) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
