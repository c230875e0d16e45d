//! # Discovery Service
//!
//! Implements the "find my peers" use case on top of the scanner.
//!
//! The service owns the configuration and the [`Prober`] and hands out fresh
//! [`Session`]s, so a caller that wants incremental results can subscribe to
//! a session (or attach a hook) before the run starts.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lenscout_common::config::Config;
use lenscout_common::network::interface;
use lenscout_common::network::target::TargetSet;
use tracing::info;

use crate::scanner::orchestrator::{Orchestrator, PhaseSummary};
use crate::scanner::session::{FoundHook, Session};
use crate::scanner::{NetProber, ProbeResult, Prober};

/// Outcome of one discovery run.
///
/// Only `mapping` carries meaning; everything else is for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub mapping: BTreeMap<u16, IpAddr>,
    pub detected: Vec<ProbeResult>,
    pub probes_issued: usize,
    pub elapsed: Duration,
    pub phases: Vec<PhaseSummary>,
    /// The address the primary range was derived from, if any.
    pub local_address: Option<String>,
}

impl ScanReport {
    fn collect(
        session: &Session,
        phases: Vec<PhaseSummary>,
        local_address: Option<String>,
        started: Instant,
    ) -> Self {
        Self {
            mapping: session.mapping(),
            detected: session.detected(),
            probes_issued: phases.iter().map(|phase| phase.probes_issued).sum(),
            elapsed: started.elapsed(),
            phases,
            local_address,
        }
    }

    /// Targets the run left without an address.
    pub fn unresolved(&self, targets: &TargetSet) -> Vec<u16> {
        targets
            .iter()
            .filter(|port| !self.mapping.contains_key(port))
            .collect()
    }
}

/// Application service for peer discovery.
pub struct DiscoveryService {
    cfg: Config,
    orchestrator: Orchestrator,
}

impl DiscoveryService {
    /// A service probing the real network.
    pub fn new(cfg: Config) -> anyhow::Result<Self> {
        cfg.validate()?;
        let prober = NetProber::new(&cfg.descriptor_path, cfg.timeout)?;
        Ok(Self::with_prober(Arc::new(prober), cfg))
    }

    pub fn with_prober(prober: Arc<dyn Prober>, cfg: Config) -> Self {
        let orchestrator = Orchestrator::new(prober, &cfg);
        Self { cfg, orchestrator }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// A fresh, empty session over the configured targets.
    pub fn session(&self) -> Session {
        Session::new(self.cfg.targets.clone())
    }

    /// The configured override, or the detected local IPv4 address.
    pub fn local_address(&self) -> Option<String> {
        match &self.cfg.local_address {
            Some(local) => Some(local.clone()),
            None => interface::local_ipv4().map(|ip| ip.to_string()),
        }
    }

    /// Runs every phase against `session`.
    pub async fn run(&self, session: &Session) -> ScanReport {
        let started = Instant::now();
        let local_address: Option<String> = self.local_address();

        info!(
            "Discovering port(s) {} from {}",
            session.targets(),
            local_address.as_deref().unwrap_or("an undetected local address")
        );
        let phases = self
            .orchestrator
            .run(session, &self.cfg.seeds, local_address.as_deref())
            .await;

        ScanReport::collect(session, phases, local_address, started)
    }

    /// Checks loopback and the local address only.
    pub async fn run_quick(&self, session: &Session) -> ScanReport {
        let started = Instant::now();
        let local_address: Option<String> = self.local_address();

        let phases = self
            .orchestrator
            .quick_scan(session, local_address.as_deref())
            .await;

        ScanReport::collect(session, phases, local_address, started)
    }

    /// Executes a full discovery run, reporting each accepted discovery to
    /// `on_found` as it happens.
    ///
    /// An empty target set is not an error: it yields an empty report.
    pub async fn perform_discovery(
        &self,
        on_found: Option<FoundHook>,
    ) -> anyhow::Result<ScanReport> {
        let session = self.hooked_session(on_found);
        Ok(self.run(&session).await)
    }

    pub async fn perform_quick_discovery(
        &self,
        on_found: Option<FoundHook>,
    ) -> anyhow::Result<ScanReport> {
        let session = self.hooked_session(on_found);
        Ok(self.run_quick(&session).await)
    }

    fn hooked_session(&self, on_found: Option<FoundHook>) -> Session {
        match on_found {
            Some(hook) => self.session().with_hook(hook),
            None => self.session(),
        }
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
