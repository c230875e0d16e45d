//! # Scan Target Model
//!
//! Defines what a scan is looking for and where it may start.
//!
//! * [`TargetSet`]: the ordered identifiers (ports) to resolve, parsed from
//!   lists like `5001,5002` or `5001-5004`.
//! * [`Candidate`]: one `(address, port)` pair a probe will dial.
//! * [`parse_seeds`]: the known peer addresses tried before any sweep.

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// An ordered, duplicate free set of identifiers to resolve.
///
/// Insertion order is kept because it is the dispatch order of every sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetSet {
    ports: Vec<u16>,
}

impl TargetSet {
    pub fn new<I: IntoIterator<Item = u16>>(ports: I) -> Self {
        let mut seen: BTreeSet<u16> = BTreeSet::new();
        let ports: Vec<u16> = ports.into_iter().filter(|port| seen.insert(*port)).collect();
        Self { ports }
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.contains(&port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// This set followed by every port of `extra` not already in it.
    pub fn union(&self, extra: &[u16]) -> TargetSet {
        TargetSet::new(self.iter().chain(extra.iter().copied()))
    }
}

impl FromStr for TargetSet {
    type Err = ConfigError;

    /// Parses a comma separated list of ports and inclusive port ranges.
    ///
    /// Supported formats:
    /// * **Single**: `5001`
    /// * **List**: `5001, 5002,5003`
    /// * **Range**: `5001-5004`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ports: Vec<u16> = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            match part.split_once('-') {
                Some((start, end)) => ports.extend(parse_port_range(start, end, part)?),
                None => ports.push(parse_port(part)?),
            }
        }

        Ok(TargetSet::new(ports))
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.ports.iter().map(u16::to_string).collect();
        write!(f, "{}", joined.join(","))
    }
}

fn parse_port(s: &str) -> Result<u16, ConfigError> {
    match s.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(s.trim().to_string())),
        Ok(port) => Ok(port),
    }
}

fn parse_port_range(start: &str, end: &str, original: &str) -> Result<Vec<u16>, ConfigError> {
    let start: u16 = parse_port(start)?;
    let end: u16 = parse_port(end)?;

    if start > end {
        return Err(ConfigError::InvalidPortRange(original.to_string()));
    }

    Ok((start..=end).collect())
}

/// One `(address, port)` pair to probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub addr: IpAddr,
    pub port: u16,
}

impl Candidate {
    pub fn new(addr: IpAddr, port: u16) -> Self {
        Self { addr, port }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            IpAddr::V4(v4) => write!(f, "{v4}:{}", self.port),
            IpAddr::V6(v6) => write!(f, "[{v6}]:{}", self.port),
        }
    }
}

/// Builds the address-major cross product of `addrs` and `ports`.
pub fn cross<I>(addrs: I, ports: &TargetSet) -> Vec<Candidate>
where
    I: IntoIterator<Item = IpAddr>,
{
    addrs
        .into_iter()
        .flat_map(|addr| ports.iter().map(move |port| Candidate::new(addr, port)))
        .collect()
}

/// Parses a comma separated list of seed addresses.
///
/// Malformed entries are skipped with a warning so one typo does not cost
/// the whole known-address phase.
pub fn parse_seeds(s: &str) -> Vec<IpAddr> {
    let mut seeds: Vec<IpAddr> = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        match part.parse::<IpAddr>() {
            Ok(addr) if !seeds.contains(&addr) => seeds.push(addr),
            Ok(_) => {}
            Err(e) => warn!("Ignoring seed address '{part}': {e}"),
        }
    }

    seeds
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
