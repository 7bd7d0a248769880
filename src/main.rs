use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod error;
mod handler;
mod http;
mod logger;
mod model;
mod routing;
mod server;
mod store;

use error::Result;

fn main() -> Result<()> {
    // Optional first argument: config file path without extension
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };
    logger::init(&cfg.logging);

    // Multi-threaded runtime; worker count from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg)).inspect_err(|e| {
        logger::log_error(&format!("Server terminated: {e}"));
    })
}

async fn async_main(cfg: config::Config) -> Result<()> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let state = Arc::new(config::AppState::new(&cfg));
    server::start_signal_handler(Arc::clone(&state.shutdown_signal));

    logger::log_server_start(&addr, &cfg, state.store.len().await);
    server::start_server_loop(listener, state, Arc::new(AtomicUsize::new(0))).await;

    Ok(())
}
