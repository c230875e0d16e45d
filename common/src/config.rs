//! # Scan Configuration
//!
//! Every tunable of a discovery run, with defaults that match a small camera
//! rig (four peers on adjacent ports). Values can be loaded from the
//! environment with [`Config::from_env`] and then overridden field by field.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::network::target::{self, TargetSet};

pub const ENV_PORTS: &str = "LENSCOUT_PORTS";
pub const ENV_SEEDS: &str = "LENSCOUT_SEEDS";
pub const ENV_TIMEOUT: &str = "LENSCOUT_TIMEOUT";
pub const ENV_WORKERS: &str = "LENSCOUT_WORKERS";
pub const ENV_LOCAL_ADDR: &str = "LENSCOUT_LOCAL_ADDR";

pub const DEFAULT_PORTS: [u16; 4] = [5001, 5002, 5003, 5004];
pub const COMMON_SEED_PORTS: [u16; 5] = [5000, 5001, 5002, 5003, 5004];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_WORKERS: usize = 50;
pub const DEFAULT_NEARBY_WORKERS: usize = 10;
pub const DEFAULT_NEARBY_WINDOW: u8 = 20;
pub const DEFAULT_DESCRIPTOR_PATH: &str = "/info";

/// How much a single probe learns about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeKind {
    /// A TCP handshake: "is anything listening?"
    Reachability,
    /// An HTTP request for the peer's self-description document.
    #[default]
    Descriptor,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Identifiers (ports) to resolve.
    pub targets: TargetSet,
    /// Upper bound for a single probe, connection and response included.
    pub timeout: Duration,
    /// Concurrent probes during the primary and extended sweeps.
    pub max_workers: usize,
    /// Concurrent probes during a nearby-address pass.
    pub nearby_workers: usize,
    /// Addresses checked on each side of a hit.
    pub nearby_window: u8,
    /// Known peer addresses tried before any sweep.
    pub seeds: Vec<IpAddr>,
    /// Ports tried on every seed in addition to `targets`.
    pub seed_ports: Vec<u16>,
    /// Overrides local address detection. Kept as raw text: a malformed
    /// value empties the primary range instead of failing the scan.
    pub local_address: Option<String>,
    pub descriptor_path: String,
    pub probe_kind: ProbeKind,
    /// Allows the fallback sweep over common private ranges.
    pub extended: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: TargetSet::new(DEFAULT_PORTS),
            timeout: DEFAULT_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
            nearby_workers: DEFAULT_NEARBY_WORKERS,
            nearby_window: DEFAULT_NEARBY_WINDOW,
            seeds: Vec::new(),
            seed_ports: COMMON_SEED_PORTS.to_vec(),
            local_address: None,
            descriptor_path: DEFAULT_DESCRIPTOR_PATH.to_string(),
            probe_kind: ProbeKind::default(),
            extended: true,
        }
    }
}

impl Config {
    /// Defaults overridden by the `LENSCOUT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a pluggable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(ports) = non_empty(lookup(ENV_PORTS)) {
            cfg.targets = TargetSet::from_str(&ports)?;
        }
        if let Some(seeds) = non_empty(lookup(ENV_SEEDS)) {
            cfg.seeds = target::parse_seeds(&seeds);
        }
        if let Some(timeout) = non_empty(lookup(ENV_TIMEOUT)) {
            cfg.timeout = parse_timeout(&timeout)?;
        }
        if let Some(workers) = non_empty(lookup(ENV_WORKERS)) {
            cfg.max_workers = parse_workers(&workers)?;
        }
        if let Some(local) = non_empty(lookup(ENV_LOCAL_ADDR)) {
            cfg.local_address = Some(local);
        }

        Ok(cfg)
    }

    /// Rejects budgets that would stall a sweep.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 || self.nearby_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("0".into()));
        }
        Ok(())
    }
}

/// Parses a timeout given in (fractional) seconds, e.g. `0.5`.
pub fn parse_timeout(s: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidTimeout(s.to_string()))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(ConfigError::InvalidTimeout(s.to_string()));
    }

    Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(s.to_string()))
}

pub fn parse_workers(s: &str) -> Result<usize, ConfigError> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::ZeroWorkers),
        Ok(workers) => Ok(workers),
        Err(_) => Err(ConfigError::InvalidValue {
            key: ENV_WORKERS,
            value: s.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
