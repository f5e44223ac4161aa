//! Shared status table holding one record per watched address.
//!
//! The table lives in a [`watch`] channel: each probe result is applied inside the
//! channel's exclusive write section, one record at a time, and readers take
//! copy-on-write snapshots of the whole table that they can hold as long as they like.

use alloc::sync::Arc;
use core::net::Ipv4Addr;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tokio::sync::watch;

use crate::probe::ProbeOutcome;

/// Hostname shown until a reverse lookup succeeds.
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// What `LastSeen` serializes to when a host never answered.
pub const NEVER_SEEN: &str = "0001-01-01T00:00:00Z";

/// Current knowledge about one address.
///
/// The serialized field names are what the dashboard sorts and filters on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusRecord {
    #[serde(rename = "IP")]
    pub ip: Ipv4Addr,
    /// Last resolved name; kept when a later probe fails or cannot resolve.
    pub hostname: String,
    /// Outcome of the most recent probe.
    pub reachable: bool,
    /// Time of the most recent successful probe; kept when a later probe fails.
    #[serde(serialize_with = "serialize_last_seen")]
    pub last_seen: Option<DateTime<Utc>>,
}

fn serialize_last_seen<S: Serializer>(
    last_seen: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match *last_seen {
        Some(ref at) => at.serialize(serializer),
        None => serializer.serialize_str(NEVER_SEEN),
    }
}

/// Reachability transition caused by a single probe result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Unchanged,
    CameUp,
    WentDown,
}

impl StatusRecord {
    #[must_use]
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            hostname: UNKNOWN_HOSTNAME.to_owned(),
            reachable: false,
            last_seen: None,
        }
    }

    fn apply(&mut self, outcome: ProbeOutcome, now: DateTime<Utc>) -> StatusChange {
        let was_reachable = self.reachable;
        self.reachable = outcome.reachable;
        if outcome.reachable {
            self.last_seen = Some(now);
            if let Some(hostname) = outcome.hostname {
                self.hostname = hostname;
            }
        }
        match (was_reachable, self.reachable) {
            (false, true) => StatusChange::CameUp,
            (true, false) => StatusChange::WentDown,
            _ => StatusChange::Unchanged,
        }
    }
}

/// address => status record, in ascending address order.
pub type StatusMap = BTreeMap<Ipv4Addr, StatusRecord>;
/// Point-in-time copy of the whole table.
pub type Snapshot = Arc<StatusMap>;
pub type StatusRx = watch::Receiver<Snapshot>;

/// Concurrency-safe status table. Cloning gives another handle to the same table.
///
/// The set of addresses is fixed at construction; only record fields change afterwards.
#[derive(Debug, Clone)]
pub struct StatusStore {
    tx: watch::Sender<Snapshot>,
}

impl StatusStore {
    /// Creates one unreachable, never-seen record per address. Repeated addresses share a record.
    pub fn new(addresses: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        let table: StatusMap = addresses
            .into_iter()
            .map(|ip| (ip, StatusRecord::new(ip)))
            .collect();
        let (tx, _) = watch::channel(Arc::new(table));
        Self { tx }
    }

    /// Applies one probe result to the record of `address`.
    ///
    /// A reachable outcome sets `last_seen` to now and replaces the hostname when
    /// one was resolved; an unreachable outcome only clears `reachable`.
    ///
    /// # Panics
    ///
    /// Panics if `address` was not part of the initial address set.
    pub fn apply_probe_result(&self, address: Ipv4Addr, outcome: ProbeOutcome) -> StatusChange {
        let mut change = StatusChange::Unchanged;
        self.tx.send_modify(|table| {
            let now = Utc::now();
            let Some(record) = Arc::make_mut(table).get_mut(&address) else {
                panic!("no status record for {address}, the watched address set is fixed at startup");
            };
            change = record.apply(outcome, now);
        });
        change
    }

    /// Consistent copy of every record. Never observes a half-applied update.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified after every applied probe result.
    #[must_use]
    pub fn subscribe(&self) -> StatusRx {
        self.tx.subscribe()
    }
}
