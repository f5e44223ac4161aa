//! Runtime configuration, assembled once from the command line.
//!
//! There is no config file: probe timing is a fixed policy, and everything
//! else comes from the CLI flags.

use alloc::sync::Arc;
use core::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroUsize,
    time::Duration,
};

use eyre::WrapErr as _;
use ipwatch_common::expand_all;

use crate::cli::Cli;

/// Fixed probing and refresh cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbePolicy {
    /// Echo requests sent per probe.
    pub echo_count: u16,
    /// Upper bound on one probe, echo and reverse lookup together.
    pub timeout: Duration,
    /// Time between the starts of two sweeps (sweeps never overlap).
    pub sweep_interval: Duration,
    /// Time between two terminal redraws.
    pub redraw_interval: Duration,
}

impl Default for ProbePolicy {
    fn default() -> Self {
        Self {
            echo_count: 3,
            timeout: Duration::from_secs(2),
            sweep_interval: Duration::from_secs(5),
            redraw_interval: Duration::from_secs(5),
        }
    }
}

impl ProbePolicy {
    /// Delay between sending two consecutive echo requests of one probe.
    ///
    /// Every request keeps listening until the end of the probe budget, so a
    /// late reply to the first request still counts.
    #[must_use]
    pub fn echo_spacing(&self) -> Duration {
        self.timeout / u32::from(self.echo_count.max(1))
    }
}

/// How results are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presenter {
    /// Redraw a table in the terminal.
    Terminal,
    /// Serve the dashboard and `/api/status` on this address.
    Web(SocketAddr),
}

/// Everything the monitor needs to run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Expanded targets in command-line order, without repeats.
    pub targets: Arc<[Ipv4Addr]>,
    pub presenter: Presenter,
    pub policy: ProbePolicy,
    /// Cap on probes in flight within one sweep, `None` for no cap.
    pub max_concurrency: Option<NonZeroUsize>,
}

impl MonitorConfig {
    /// Expands the target specifications and resolves the presenter.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first target specification that does not parse.
    pub fn from_cli(cli: &Cli) -> eyre::Result<Self> {
        let targets = expand_all(&cli.targets).wrap_err("Error parsing targets")?;

        let presenter = if cli.web {
            Presenter::Web(SocketAddr::new(cli.bind, cli.port))
        } else {
            Presenter::Terminal
        };

        Ok(Self {
            targets: targets.into(),
            presenter,
            policy: ProbePolicy::default(),
            max_concurrency: cli.max_concurrency,
        })
    }

    /// Default log level when `RUST_LOG` is unset. Terminal mode stays quiet so
    /// log lines don't interleave with the table.
    #[must_use]
    pub const fn default_log_level(&self) -> &'static str {
        match self.presenter {
            Presenter::Terminal => "warn",
            Presenter::Web(_) => "info",
        }
    }
}

/// Listen address used when `--bind` is not given.
pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
/// Listen port used when `--port` is not given.
pub const DEFAULT_PORT: u16 = 8080;
