//! Periodic sweeps over the fixed target list.
//!
//! A sweep probes every target concurrently and applies each result to the
//! [`StatusStore`] as soon as it arrives. Sweeps never overlap: the next one
//! starts one interval after the previous one started, or right away when the
//! previous one ran longer than that.

use alloc::sync::Arc;
use core::{net::Ipv4Addr, num::NonZeroUsize, time::Duration};

use eyre::WrapErr as _;
use futures::future;
use tokio::{
    sync::{Semaphore, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tracing::{Instrument as _, debug, info};

use crate::{
    config::ProbePolicy,
    probe::Probe,
    store::{StatusChange, StatusStore},
};

/// Counters for one finished sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub probed: usize,
    pub reachable: usize,
    pub elapsed: Duration,
}

/// Drives probing of the target list into the status store.
pub struct Scanner<P> {
    targets: Arc<[Ipv4Addr]>,
    prober: P,
    store: StatusStore,
    policy: ProbePolicy,
    max_concurrency: Option<NonZeroUsize>,
}

impl<P: Probe> Scanner<P> {
    /// `store` must hold a record for every target.
    pub fn new(
        targets: Arc<[Ipv4Addr]>,
        prober: P,
        store: StatusStore,
        policy: ProbePolicy,
    ) -> Self {
        Self {
            targets,
            prober,
            store,
            policy,
            max_concurrency: None,
        }
    }

    /// Limits how many probes of one sweep may be in flight at once.
    #[must_use]
    pub const fn with_max_concurrency(mut self, limit: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = limit;
        self
    }

    /// Runs one sweep over all targets and waits for every probe to finish.
    pub async fn sweep(&self) -> SweepSummary {
        let started = Instant::now();
        let limiter = self.max_concurrency.map(|limit| Semaphore::new(limit.get()));

        let probes = self.targets.iter().map(|&address| {
            let limiter = limiter.as_ref();
            async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire().await.ok(),
                    None => None,
                };
                let outcome = self.prober.probe(address).await;
                let reachable = outcome.reachable;
                debug!(%address, reachable, hostname = ?outcome.hostname, "probed");

                match self.store.apply_probe_result(address, outcome) {
                    StatusChange::CameUp => info!(%address, "host is up"),
                    StatusChange::WentDown => info!(%address, "host went down"),
                    StatusChange::Unchanged => {}
                }
                reachable
            }
        });

        let results = future::join_all(probes).await;
        SweepSummary {
            probed: results.len(),
            reachable: results.into_iter().filter(|&up| up).count(),
            elapsed: started.elapsed(),
        }
    }

    /// Starts sweeping on the policy's interval in a background task.
    ///
    /// The first sweep starts immediately.
    pub fn spawn(self) -> ScanHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let task = tokio::spawn(
            async move {
                let mut ticker = interval(self.policy.sweep_interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        biased;
                        _ = stop_rx.changed() => break,
                        _ = ticker.tick() => {}
                    }
                    let summary = self.sweep().await;
                    debug!(
                        probed = summary.probed,
                        reachable = summary.reachable,
                        elapsed = ?summary.elapsed,
                        "sweep finished"
                    );
                    if summary.elapsed > self.policy.sweep_interval {
                        info!(
                            elapsed = ?summary.elapsed,
                            interval = ?self.policy.sweep_interval,
                            "sweep took longer than the interval, starting the next one right away"
                        );
                    }
                }
                debug!("scanner stopped");
            }
            .in_current_span(),
        );
        ScanHandle { stop_tx, task }
    }
}

/// Handle to a running scanner.
///
/// Dropping it stops the scanner once the sweep in progress has finished.
pub struct ScanHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Asks the scanner to stop and waits until it did. A sweep in progress is completed first.
    ///
    /// # Errors
    ///
    /// Returns an error if the scanner task panicked.
    pub async fn stop(self) -> eyre::Result<()> {
        self.stop_tx.send_replace(true);
        self.task.await.wrap_err("scanner task failed")
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
