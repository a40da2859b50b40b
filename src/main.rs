use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Build the Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr)?;
    let state = Arc::new(config::AppState::new(cfg));

    logger::log_server_start(&addr, &state.config);

    let shutdown = server::signal::start_signal_handler();
    server::run_until_shutdown(listener, state, shutdown).await;

    Ok(())
}
