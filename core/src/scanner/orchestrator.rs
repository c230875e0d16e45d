//! # Scan Orchestrator
//!
//! Drives one discovery run through its phases, narrowest first:
//!
//! 1. **Known**: every seed address against the targets plus the commonly
//!    used ports, one probe at a time.
//! 2. **Primary**: the local /24 at full worker budget. Every accepted hit
//!    immediately triggers, inline and ahead of the remaining sweep results,
//!    a sequential **same-host** pass over the hit's address and then a
//!    **nearby** pass over its neighborhood at the smaller budget.
//! 3. **Extended**: the common private blocks not covered by the primary
//!    range, for the still unresolved targets only. No nested passes.
//!
//! Each phase stops as soon as the session is satisfied, and a wider phase is
//! only entered while something is still unresolved.

use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use lenscout_common::config::{Config, ProbeKind};
use lenscout_common::network::range;
use lenscout_common::network::target::{self, Candidate};
use lenscout_common::{debug, info, success, warn};

use super::session::Session;
use super::sweep::Sweep;
use super::{ProbeResult, Prober};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Known,
    Primary,
    SameHost,
    Nearby,
    Extended,
    Quick,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Known => "known",
            Phase::Primary => "primary",
            Phase::SameHost => "same-host",
            Phase::Nearby => "nearby",
            Phase::Extended => "extended",
            Phase::Quick => "quick",
        };
        f.write_str(name)
    }
}

/// What one phase (or nested pass) did. Observability only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSummary {
    pub phase: Phase,
    pub candidates: usize,
    pub probes_issued: usize,
    pub accepted: usize,
    pub elapsed: Duration,
}

impl PhaseSummary {
    fn new(
        phase: Phase,
        candidates: usize,
        probes_issued: usize,
        accepted: usize,
        started: Instant,
    ) -> Self {
        let summary = Self {
            phase,
            candidates,
            probes_issued,
            accepted,
            elapsed: started.elapsed(),
        };
        debug!("{summary}");
        summary
    }
}

impl fmt::Display for PhaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} phase: {}/{} candidates probed, {} accepted in {:.2?}",
            self.phase, self.probes_issued, self.candidates, self.accepted, self.elapsed
        )
    }
}

pub struct Orchestrator {
    prober: Arc<dyn Prober>,
    kind: ProbeKind,
    max_workers: usize,
    nearby_workers: usize,
    nearby_window: u8,
    seed_ports: Vec<u16>,
    extended: bool,
}

impl Orchestrator {
    pub fn new(prober: Arc<dyn Prober>, cfg: &Config) -> Self {
        Self {
            prober,
            kind: cfg.probe_kind,
            max_workers: cfg.max_workers,
            nearby_workers: cfg.nearby_workers,
            nearby_window: cfg.nearby_window,
            seed_ports: cfg.seed_ports.clone(),
            extended: cfg.extended,
        }
    }

    /// Runs every phase against `session` and returns what each one did.
    ///
    /// A `local_address` that is not an IPv4 address empties the primary
    /// range; the scan then goes straight to the extended phase. Without a
    /// local address at all the primary phase is skipped.
    pub async fn run(
        &self,
        session: &Session,
        seeds: &[IpAddr],
        local_address: Option<&str>,
    ) -> Vec<PhaseSummary> {
        let mut phases: Vec<PhaseSummary> = Vec::new();

        if session.targets().is_empty() {
            debug!("Nothing to discover");
            return phases;
        }

        if !seeds.is_empty() {
            let ports = session.targets().union(&self.seed_ports);
            let candidates = target::cross(seeds.iter().copied(), &ports);
            info!("Checking {} known address(es)", seeds.len());
            phases.push(self.sequential_pass(session, Phase::Known, candidates).await);
            if session.is_satisfied() {
                return phases;
            }
        }

        let primary: Vec<Ipv4Addr> = local_address.map(range::primary_range).unwrap_or_default();
        if local_address.is_some() {
            self.primary_phase(session, &primary, &mut phases).await;
            if session.is_satisfied() {
                return phases;
            }
        } else {
            warn!("No local address detected, primary range skipped");
        }

        if self.extended {
            self.extended_phase(session, local_address, &primary, &mut phases).await;
        } else {
            info!(
                "Port(s) {} unresolved, extended phase disabled",
                session.unresolved()
            );
        }

        phases
    }

    /// Probes loopback and `local_address` only, one probe at a time.
    pub async fn quick_scan(
        &self,
        session: &Session,
        local_address: Option<&str>,
    ) -> Vec<PhaseSummary> {
        if session.targets().is_empty() {
            return Vec::new();
        }

        let mut hosts: Vec<IpAddr> = vec![IpAddr::V4(Ipv4Addr::LOCALHOST)];
        if let Some(local) = local_address.and_then(range::parse_ipv4).map(IpAddr::V4) {
            if !hosts.contains(&local) {
                hosts.push(local);
            }
        }

        info!("Quick scan of {} host(s)", hosts.len());
        let candidates = target::cross(hosts, session.targets());
        vec![self.sequential_pass(session, Phase::Quick, candidates).await]
    }

    async fn primary_phase(
        &self,
        session: &Session,
        primary: &[Ipv4Addr],
        phases: &mut Vec<PhaseSummary>,
    ) {
        let started = Instant::now();
        let slot: usize = phases.len();
        let candidates = target::cross(primary.iter().copied().map(IpAddr::V4), session.targets());
        let total: usize = candidates.len();

        info!(
            "Sweeping {} host(s) of the primary range ({total} candidates)",
            primary.len()
        );

        let mut sweep = Sweep::new(
            Arc::clone(&self.prober),
            self.kind,
            candidates,
            self.max_workers,
        );
        let mut accepted: usize = 0;

        while let Some(hit) = sweep.next().await {
            let host: IpAddr = hit.reported_addr;
            if !self.offer(session, hit) {
                continue;
            }
            accepted += 1;

            // In-flight probes keep running, but their results wait until
            // both passes are done.
            if !session.is_satisfied() {
                let ports = session.unresolved();
                let candidates = target::cross([host], &ports);
                debug!("Checking {host} for port(s) {ports}");
                phases.push(self.sequential_pass(session, Phase::SameHost, candidates).await);
            }
            if !session.is_satisfied() {
                phases.push(self.nearby_pass(session, host).await);
            }

            if session.is_satisfied() {
                let discarded: usize = sweep.halt().len();
                debug!("Primary range satisfied, {discarded} completed result(s) discarded");
                break;
            }
        }

        phases.insert(
            slot,
            PhaseSummary::new(Phase::Primary, total, sweep.issued(), accepted, started),
        );
    }

    async fn nearby_pass(&self, session: &Session, host: IpAddr) -> PhaseSummary {
        let neighbors = range::nearby(host, self.nearby_window);
        let ports = session.unresolved();
        debug!(
            "Checking {} neighbor(s) of {host} for port(s) {ports}",
            neighbors.len()
        );

        let candidates = target::cross(neighbors.into_iter().map(IpAddr::V4), &ports);
        self.bounded_pass(session, Phase::Nearby, candidates, self.nearby_workers)
            .await
    }

    async fn extended_phase(
        &self,
        session: &Session,
        local_address: Option<&str>,
        primary: &[Ipv4Addr],
        phases: &mut Vec<PhaseSummary>,
    ) {
        let scanned: HashSet<Ipv4Addr> = primary.iter().copied().collect();
        let hosts: Vec<IpAddr> = range::common_ranges(local_address.unwrap_or_default())
            .into_iter()
            .filter(|addr| !scanned.contains(addr))
            .map(IpAddr::V4)
            .collect();
        let ports = session.unresolved();

        info!(
            "Extending to {} common private host(s) for port(s) {ports}",
            hosts.len()
        );

        let candidates = target::cross(hosts, &ports);
        phases.push(
            self.bounded_pass(session, Phase::Extended, candidates, self.max_workers)
                .await,
        );
    }

    /// Probes `candidates` in order, one at a time, until satisfied.
    async fn sequential_pass(
        &self,
        session: &Session,
        phase: Phase,
        candidates: Vec<Candidate>,
    ) -> PhaseSummary {
        let started = Instant::now();
        let mut issued: usize = 0;
        let mut accepted: usize = 0;

        for candidate in &candidates {
            if session.is_satisfied() {
                break;
            }

            issued += 1;
            if let Some(hit) = self.prober.probe(self.kind, *candidate).await {
                if self.offer(session, hit) {
                    accepted += 1;
                }
            }
        }

        PhaseSummary::new(phase, candidates.len(), issued, accepted, started)
    }

    /// Probes `candidates` at `budget` concurrency until exhausted or
    /// satisfied.
    async fn bounded_pass(
        &self,
        session: &Session,
        phase: Phase,
        candidates: Vec<Candidate>,
        budget: usize,
    ) -> PhaseSummary {
        let started = Instant::now();
        let total: usize = candidates.len();
        let mut sweep = Sweep::new(Arc::clone(&self.prober), self.kind, candidates, budget);
        let mut accepted: usize = 0;

        while !session.is_satisfied() {
            let Some(hit) = sweep.next().await else {
                break;
            };
            if self.offer(session, hit) {
                accepted += 1;
            }
        }
        sweep.halt();

        PhaseSummary::new(phase, total, sweep.issued(), accepted, started)
    }

    fn offer(&self, session: &Session, hit: ProbeResult) -> bool {
        let dialed: Candidate = hit.dialed;
        let (port, addr) = (hit.reported_port, hit.reported_addr);
        let remapped: bool = hit.is_remapped();

        if !session.record(hit) {
            debug!("{dialed} answered as port {port}, already resolved or not a target");
            return false;
        }

        if remapped {
            success!("Port {port} found at {addr} (dialed {dialed})");
        } else {
            success!("Port {port} found at {addr}");
        }
        true
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
