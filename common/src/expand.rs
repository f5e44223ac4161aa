//! Expansion of target specifications into concrete IPv4 addresses.
//!
//! Three forms are accepted:
//! - a single literal, `192.168.1.10`
//! - a last-octet range, `10.0.0.5-8` (first three octets fixed, inclusive)
//! - a CIDR block, `192.168.1.0/24` (host addresses only)

use core::{fmt, net::Ipv4Addr, num::IntErrorKind, str::FromStr};
use std::collections::HashSet;

use ipnet::Ipv4Net;

use crate::ExpandError;

/// One parsed target specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    Single(Ipv4Addr),
    /// `start`'s last octet through `end_octet`, inclusive. `end_octet` is never below `start`'s last octet.
    Range { start: Ipv4Addr, end_octet: u8 },
    /// Network and broadcast addresses of the block are never yielded.
    Cidr(Ipv4Net),
}

impl TargetSpec {
    /// First and last address as inclusive numeric bounds, `None` if the spec yields nothing.
    fn bounds(&self) -> Option<(u32, u32)> {
        match *self {
            Self::Single(addr) => Some((addr.into(), addr.into())),
            Self::Range { start, end_octet } => {
                let [a, b, c, _] = start.octets();
                Some((start.into(), Ipv4Addr::new(a, b, c, end_octet).into()))
            }
            Self::Cidr(net) => {
                let first = u32::from(net.network()).checked_add(1)?;
                let last = u32::from(net.broadcast()).checked_sub(1)?;
                (first <= last).then_some((first, last))
            }
        }
    }

    /// Every address this spec covers, in ascending numeric order.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        self.bounds()
            .into_iter()
            .flat_map(|(first, last)| first..=last)
            .map(Ipv4Addr::from)
    }
}

impl FromStr for TargetSpec {
    type Err = ExpandError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        if spec.contains('/') {
            spec.parse::<Ipv4Net>()
                .map(Self::Cidr)
                .map_err(|e| ExpandError::address(spec, e))
        } else if spec.contains('-') {
            parse_range(spec)
        } else {
            spec.parse::<Ipv4Addr>()
                .map(Self::Single)
                .map_err(|e| ExpandError::address(spec, e))
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Single(addr) => write!(f, "{addr}"),
            Self::Range { start, end_octet } => write!(f, "{start}-{end_octet}"),
            Self::Cidr(net) => write!(f, "{net}"),
        }
    }
}

fn parse_range(spec: &str) -> Result<TargetSpec, ExpandError> {
    let mut parts = spec.split('-');
    let (Some(start), Some(end), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ExpandError::range(
            spec,
            "expected <start address>-<end octet>",
        ));
    };

    let start: Ipv4Addr = start
        .parse()
        .map_err(|e| ExpandError::range(spec, format_args!("start '{start}': {e}")))?;

    let end_octet: u8 = end.parse().map_err(|e: core::num::ParseIntError| {
        match *e.kind() {
            IntErrorKind::PosOverflow => {
                ExpandError::range(spec, format_args!("end octet {end} is above 255"))
            }
            _ => ExpandError::range(spec, format_args!("end octet '{end}' is not a number")),
        }
    })?;

    let [.., start_octet] = start.octets();
    if end_octet < start_octet {
        return Err(ExpandError::range(
            spec,
            format_args!("end octet {end_octet} is below start octet {start_octet}"),
        ));
    }

    Ok(TargetSpec::Range { start, end_octet })
}

/// Expands one specification into its addresses.
///
/// A /31 or /32 block yields no addresses, since both of its addresses are the
/// network or broadcast address.
///
/// # Errors
///
/// Returns [`ExpandError::InvalidAddress`] for an unparsable literal or CIDR block
/// and [`ExpandError::InvalidRange`] for a malformed range.
pub fn expand(spec: &str) -> Result<Vec<Ipv4Addr>, ExpandError> {
    Ok(spec.parse::<TargetSpec>()?.addresses().collect())
}

/// Expands every specification and concatenates the results in input order.
///
/// Addresses already produced by an earlier specification are skipped, so the
/// result holds each address once, at its first position.
///
/// # Errors
///
/// Fails on the first specification that does not parse, see [`expand`].
pub fn expand_all<I, S>(specs: I) -> Result<Vec<Ipv4Addr>, ExpandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut addresses = Vec::new();
    for spec in specs {
        for addr in spec.as_ref().parse::<TargetSpec>()?.addresses() {
            if seen.insert(addr) {
                addresses.push(addr);
            }
        }
    }
    Ok(addresses)
}
