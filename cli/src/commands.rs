pub mod discover;
pub mod probe;
pub mod quick;
pub mod ranges;

use std::net::IpAddr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use lenscout_common::config::{self, Config, ProbeKind};
use lenscout_common::network::target::{self, TargetSet};

#[derive(Parser)]
#[command(name = "lenscout", version)]
#[command(about = "Finds which host serves each of a set of ports on the local network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less output (-q hides progress, -qq only prints results)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a full phased discovery
    #[command(alias = "d")]
    Discover(ScanArgs),
    /// Only check this machine (loopback and the local address)
    #[command(alias = "q")]
    Quick(ScanArgs),
    /// Probe a single address and port
    #[command(alias = "p")]
    Probe {
        addr: IpAddr,
        port: u16,
        /// Seconds to wait for each probe
        #[arg(short, long, value_parser = config::parse_timeout)]
        timeout: Option<Duration>,
        /// Path of the descriptor document
        #[arg(long, default_value = config::DEFAULT_DESCRIPTOR_PATH)]
        path: String,
    },
    /// Show the address blocks a discovery would sweep
    #[command(alias = "r")]
    Ranges {
        /// Local IPv4 address the primary range is derived from
        #[arg(short, long = "local-addr")]
        local_addr: Option<String>,
    },
}

/// Options shared by the scanning subcommands. Unset options fall back to
/// the `LENSCOUT_*` environment variables, then to the defaults.
#[derive(Args, Clone, Default)]
pub struct ScanArgs {
    /// Ports to resolve, e.g. `5001,5002` or `5001-5004`
    #[arg(short, long)]
    pub ports: Option<TargetSet>,

    /// Known peer addresses to try first, comma separated
    #[arg(short, long)]
    pub seeds: Option<String>,

    /// Seconds to wait for each probe
    #[arg(short, long, value_parser = config::parse_timeout)]
    pub timeout: Option<Duration>,

    /// Probes in flight during the broad sweeps
    #[arg(short, long, value_parser = config::parse_workers)]
    pub workers: Option<usize>,

    /// Local IPv4 address, skips interface detection
    #[arg(short, long = "local-addr")]
    pub local_addr: Option<String>,

    /// Only check that a port accepts connections, skip the descriptor
    #[arg(long)]
    pub connect_only: bool,

    /// Never sweep the common private ranges
    #[arg(long)]
    pub no_extended: bool,

    /// Path of the descriptor document
    #[arg(long)]
    pub path: Option<String>,
}

impl ScanArgs {
    /// Environment configuration with these arguments applied on top.
    pub fn to_config(&self) -> anyhow::Result<Config> {
        let mut cfg: Config = Config::from_env()?;
        self.apply(&mut cfg);
        cfg.validate()?;
        Ok(cfg)
    }

    fn apply(&self, cfg: &mut Config) {
        if let Some(ports) = &self.ports {
            cfg.targets = ports.clone();
        }
        if let Some(seeds) = &self.seeds {
            cfg.seeds = target::parse_seeds(seeds);
        }
        if let Some(timeout) = self.timeout {
            cfg.timeout = timeout;
        }
        if let Some(workers) = self.workers {
            cfg.max_workers = workers;
        }
        if let Some(local) = &self.local_addr {
            cfg.local_address = Some(local.clone());
        }
        if let Some(path) = &self.path {
            cfg.descriptor_path = path.clone();
        }
        if self.connect_only {
            cfg.probe_kind = ProbeKind::Reachability;
        }
        if self.no_extended {
            cfg.extended = false;
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
