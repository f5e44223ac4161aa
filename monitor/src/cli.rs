//! Command-line interface definitions for the monitor.
//!
//! This module contains the CLI argument parsing structures and enums
//! used by the `ipwatch` binary.

use core::{net::IpAddr, num::NonZeroUsize};
use std::env;

use clap::{Parser, ValueEnum};

use crate::config::{DEFAULT_BIND, DEFAULT_PORT};

/// Top-level command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Hosts to watch: a single address (10.0.0.7), a last-octet range (10.0.0.5-20)
    /// or a CIDR block (192.168.1.0/24, network and broadcast addresses skipped).
    #[arg(required = true, value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Serve a live web dashboard instead of drawing the table in the terminal.
    #[arg(long)]
    pub web: bool,

    /// Bind address for the web dashboard.
    #[arg(long, default_value_t = DEFAULT_BIND)]
    pub bind: IpAddr,

    /// Listen port for the web dashboard.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Maximum number of hosts probed at the same time. Unlimited by default.
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Format of the log output on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log output formats supported by the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}
