//! Wires the store, prober, scanner and the selected presenter together.

use core::future;

use tokio::signal;
use tracing::{info, warn};

use crate::{
    config::{MonitorConfig, Presenter},
    http,
    probe::IcmpProber,
    scan::Scanner,
    store::StatusStore,
    terminal,
};

/// Creates a future that resolves when Ctrl-C or SIGTERM is received.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to create SIGTERM signal handler: {e}");
                future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    info!("Received shutdown, shutting down");
}

/// Starts scanning and runs the presenter until shutdown.
///
/// # Errors
///
/// Returns an error if the presenter fails (listener cannot be bound, stdout closed).
pub(crate) async fn start(config: MonitorConfig) -> eyre::Result<()> {
    let MonitorConfig {
        targets,
        presenter,
        policy,
        max_concurrency,
    } = config;

    if targets.is_empty() {
        warn!("No addresses to watch, the targets only cover network or broadcast addresses");
    }

    let store = StatusStore::new(targets.iter().copied());
    let prober = IcmpProber::new(policy);
    let scan = Scanner::new(targets.clone(), prober, store.clone(), policy)
        .with_max_concurrency(max_concurrency)
        .spawn();
    info!(targets = targets.len(), ?max_concurrency, "Scanner started");

    let presented = match presenter {
        Presenter::Web(addr) => http::serve(addr, store).await,
        Presenter::Terminal => {
            tokio::select! {
                res = terminal::run(targets, store, policy.redraw_interval) => res,
                () = shutdown_signal() => Ok(()),
            }
        }
    };

    scan.stop().await?;
    presented
}
