//! Library entry for the `ipwatch` monitor.
//!
//! Exposes `inner_main` so the workspace-level binary can call into the monitor logic.
//!
//! Watches a fixed set of IPv4 addresses: every few seconds each one is probed
//! for reachability and hostname, and the results are shown either as a table
//! in the terminal or through a small web dashboard.
#![cfg_attr(
    test,
    expect(clippy::indexing_slicing, reason = "This is not problematic in tests",)
)]

extern crate alloc;
extern crate core;

pub mod cli;
pub mod config;
pub mod http;
pub mod probe;
mod run;
pub mod scan;
pub mod store;
pub mod terminal;

use std::{io, process, sync::Once};

use tracing::{Instrument as _, info};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use cli::{Cli, LogFormat};
use config::MonitorConfig;

static INIT_TRACING: Once = Once::new();

/// Installs the global tracing subscriber, writing to stderr. Later calls are no-ops.
fn init_tracing(default_level: &'static str, log_format: LogFormat) {
    INIT_TRACING.call_once(move || {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_timer(ChronoLocal::rfc_3339())
            .with_writer(io::stderr);

        match log_format {
            LogFormat::Compact => builder.compact().init(),
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.pretty().init(),
        }
    });
}

/// The monitor's main function; can be called from a shim binary.
///
/// Expands the targets, then scans and presents until shutdown.
///
/// # Errors
///
/// Returns an error if a target specification does not parse (before any
/// scanning starts) or if the presenter fails.
pub async fn inner_main(invocation: Cli) -> eyre::Result<()> {
    let config = MonitorConfig::from_cli(&invocation)?;

    init_tracing(config.default_log_level(), invocation.log_format);

    let startup_span = tracing::info_span!(
        "ipwatch.startup",
        targets = config.targets.len(),
        pid = process::id(),
        version = env!("CARGO_PKG_VERSION")
    );

    async move {
        info!(presenter = ?config.presenter, "Starting monitor");
        run::start(config).await
    }
    .instrument(startup_span)
    .await
}
