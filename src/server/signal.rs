// Signal handling module
//
// SIGTERM and SIGINT trigger a graceful stop: the accept loop exits and
// in-flight connections finish naturally.

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Install the shutdown signal handler and return the notifier the accept
/// loop waits on (Unix).
#[cfg(unix)]
pub fn start_signal_handler() -> Arc<Notify> {
    use tokio::signal::unix::{signal, SignalKind};

    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                logger::log_error(&format!("Failed to register SIGTERM handler: {e}"));
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                logger::log_error(&format!("Failed to register SIGINT handler: {e}"));
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                logger::log_warning("SIGTERM received, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                logger::log_warning("SIGINT received, initiating graceful shutdown");
            }
        }

        notifier.notify_one();
    });

    shutdown
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler() -> Arc<Notify> {
    let shutdown = Arc::new(Notify::new());
    let notifier = Arc::clone(&shutdown);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_warning("Ctrl+C received, initiating graceful shutdown");
        }
        notifier.notify_one();
    });

    shutdown
}
