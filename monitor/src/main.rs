//! Entrypoint for the `ipwatch` binary.

use std::process;

use clap::Parser as _;
use eyre::Result;
use ipwatch_monitor::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Usage errors exit with 1 rather than clap's default of 2; help and version still exit 0.
    let invocation = match Cli::try_parse() {
        Ok(invocation) => invocation,
        Err(e) if e.use_stderr() => {
            e.print()?;
            process::exit(1);
        }
        Err(e) => e.exit(),
    };

    ipwatch_monitor::inner_main(invocation).await
}
