//! Reachability and hostname probing for a single address.
//!
//! Probing is a capability behind the [`Probe`] trait; the scanner is generic
//! over it. [`IcmpProber`] is the real implementation: unprivileged ICMP echo
//! over a datagram socket, followed by a reverse DNS lookup when the host answered.
//!
//! One probe sends a few echo requests spread over its time budget. Each
//! request listens for its reply until the budget runs out, and the first
//! reply to any of them makes the host reachable.

use alloc::sync::Arc;
use core::{
    net::{IpAddr, Ipv4Addr},
    sync::atomic::{AtomicU16, Ordering},
    time::Duration,
};
use std::io;

use futures::stream::{FuturesUnordered, StreamExt as _};
use surge_ping::{Client, Config, PingIdentifier, PingSequence};
use tokio::{
    task,
    time::{Instant, sleep_until, timeout, timeout_at},
};
use tracing::{debug, warn};

use crate::config::ProbePolicy;

const PAYLOAD: [u8; 56] = [0; 56];

/// Result of probing one address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// At least one echo reply arrived within the probe budget.
    pub reachable: bool,
    /// Reverse DNS name, only ever present when `reachable`.
    pub hostname: Option<String>,
}

impl ProbeOutcome {
    #[must_use]
    pub const fn unreachable() -> Self {
        Self {
            reachable: false,
            hostname: None,
        }
    }

    #[must_use]
    pub const fn reachable(hostname: Option<String>) -> Self {
        Self {
            reachable: true,
            hostname,
        }
    }
}

/// Something that can tell whether an address is up.
///
/// Implementations must not fail and must bound their own running time: every
/// problem (timeout, unreachable network, failed lookup) is reported as an
/// unreachable outcome or a missing hostname.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, address: Ipv4Addr) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Sends a single echo request and waits up to `wait` for its reply.
pub trait Echo: Send + Sync + 'static {
    fn echo(&self, address: Ipv4Addr, seq: u16, wait: Duration)
    -> impl Future<Output = bool> + Send;
}

/// Reverse name lookup, giving up after `budget`.
pub trait Resolve: Send + Sync + 'static {
    fn reverse(
        &self,
        address: Ipv4Addr,
        budget: Duration,
    ) -> impl Future<Output = Option<String>> + Send;
}

/// ICMP echo over a shared `SOCK_DGRAM` socket, which Linux allows for groups
/// listed in `net.ipv4.ping_group_range` and macOS allows for everyone.
#[derive(Clone)]
pub struct IcmpEcho {
    client: Client,
    next_ident: Arc<AtomicU16>,
}

impl IcmpEcho {
    /// Opens the socket. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the socket error, e.g. when unprivileged ICMP is not permitted.
    pub fn open() -> io::Result<Self> {
        Ok(Self {
            client: Client::new(&Config::default())?,
            next_ident: Arc::new(AtomicU16::new(1)),
        })
    }
}

impl Echo for IcmpEcho {
    async fn echo(&self, address: Ipv4Addr, seq: u16, wait: Duration) -> bool {
        // Requests of one probe are in flight together, so each gets its own identifier.
        let ident = PingIdentifier(self.next_ident.fetch_add(1, Ordering::Relaxed));
        let mut pinger = self.client.pinger(IpAddr::V4(address), ident).await;
        pinger.timeout(wait);

        match pinger.ping(PingSequence(seq), &PAYLOAD).await {
            Ok((_, rtt)) => {
                debug!(%address, seq, ?rtt, "echo reply");
                true
            }
            Err(e) => {
                debug!(%address, seq, "no echo reply: {e}");
                false
            }
        }
    }
}

/// Reverse DNS through the system resolver, run on the blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolve for SystemResolver {
    async fn reverse(&self, address: Ipv4Addr, budget: Duration) -> Option<String> {
        reverse_lookup(address, budget).await
    }
}

/// Echo followed by a reverse lookup, all within one [`ProbePolicy::timeout`].
#[derive(Clone)]
pub struct EchoProber<E, R> {
    /// `None` when no echo mechanism is available; every probe is then unreachable.
    echo: Option<E>,
    resolver: R,
    policy: ProbePolicy,
}

/// The prober the binary uses.
pub type IcmpProber = EchoProber<IcmpEcho, SystemResolver>;

impl IcmpProber {
    /// Opens the shared ICMP socket. Must be called from within a tokio runtime.
    ///
    /// Failing to open the socket is not fatal; it is logged and all hosts will show as down.
    #[must_use]
    pub fn new(policy: ProbePolicy) -> Self {
        let echo = match IcmpEcho::open() {
            Ok(echo) => Some(echo),
            Err(e) => {
                warn!(
                    "Unable to open an unprivileged ICMP socket ({e}); every host will be reported as down. \
                     On Linux, check that your group is within net.ipv4.ping_group_range."
                );
                None
            }
        };
        Self::with_parts(echo, SystemResolver, policy)
    }
}

impl<E: Echo, R: Resolve> EchoProber<E, R> {
    #[must_use]
    pub const fn with_parts(echo: Option<E>, resolver: R, policy: ProbePolicy) -> Self {
        Self {
            echo,
            resolver,
            policy,
        }
    }

    /// Sends `echo_count` requests, `echo_spacing` apart, each listening until `deadline`.
    ///
    /// Returns on the first reply; requests not yet sent by then are never sent.
    async fn any_reply(&self, echo: &E, address: Ipv4Addr, deadline: Instant) -> bool {
        let start = Instant::now();
        let spacing = self.policy.echo_spacing();

        let mut requests: FuturesUnordered<_> = (0..self.policy.echo_count)
            .map(|seq| (seq, start + spacing * u32::from(seq)))
            .filter(|&(_, send_at)| send_at < deadline)
            .map(move |(seq, send_at)| async move {
                sleep_until(send_at).await;
                echo.echo(address, seq, deadline.saturating_duration_since(Instant::now()))
                    .await
            })
            .collect();

        while let Some(replied) = requests.next().await {
            if replied {
                return true;
            }
        }
        false
    }
}

impl<E: Echo, R: Resolve> Probe for EchoProber<E, R> {
    async fn probe(&self, address: Ipv4Addr) -> ProbeOutcome {
        let Some(ref echo) = self.echo else {
            return ProbeOutcome::unreachable();
        };

        let deadline = Instant::now() + self.policy.timeout;
        let reachable = timeout_at(deadline, self.any_reply(echo, address, deadline))
            .await
            .unwrap_or(false);
        if !reachable {
            return ProbeOutcome::unreachable();
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        let hostname = timeout_at(deadline, self.resolver.reverse(address, remaining))
            .await
            .ok()
            .flatten();
        ProbeOutcome::reachable(hostname)
    }
}

/// Reverse DNS for `address`, giving up after `budget`.
async fn reverse_lookup(address: Ipv4Addr, budget: Duration) -> Option<String> {
    let lookup = task::spawn_blocking(move || dns_lookup::lookup_addr(&IpAddr::V4(address)));
    match timeout(budget, lookup).await {
        Ok(Ok(Ok(name))) => clean_hostname(&name, address),
        Ok(Ok(Err(e))) => {
            debug!(%address, "reverse lookup failed: {e}");
            None
        }
        Ok(Err(e)) => {
            warn!(%address, "reverse lookup task failed: {e}");
            None
        }
        Err(_) => {
            debug!(%address, ?budget, "reverse lookup timed out");
            None
        }
    }
}

/// Strips the root label separator and drops answers that are just the address echoed back.
fn clean_hostname(name: &str, address: Ipv4Addr) -> Option<String> {
    let name = name.strip_suffix('.').unwrap_or(name);
    (!name.is_empty() && name != address.to_string()).then(|| name.to_owned())
}
