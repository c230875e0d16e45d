//! The central **abstraction** for probing candidates.
//!
//! This module defines the [`Prober`] seam every sweep dispatches through, the
//! [`ProbeResult`] it produces, and the network-backed [`NetProber`].
//!
//! **Architectural Note:**
//! The [`orchestrator`] only ever sees `Arc<dyn Prober>`. Probes are
//! stateless and independent, so the orchestrator is free to run any number
//! of them in parallel; tests swap in a scripted prober to drive the phase
//! logic without sockets.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use lenscout_common::config::ProbeKind;
use lenscout_common::network::target::Candidate;
use lenscout_protocols::descriptor::{PeerMetadata, ResolvedDescriptor};

use crate::network::{http::DescriptorClient, tcp};

pub mod orchestrator;
pub mod session;
mod sweep;

#[cfg(test)]
pub(crate) mod scripted;

/// What a successful probe learned.
///
/// `reported_*` is what the peer claims about itself and is authoritative
/// for indexing results. It equals the dialed values when the peer said
/// nothing, or when only reachability was probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub dialed: Candidate,
    pub reported_port: u16,
    pub reported_addr: IpAddr,
    pub metadata: PeerMetadata,
}

impl ProbeResult {
    /// A hit with no self-reported identity.
    pub fn dialed_only(dialed: Candidate) -> Self {
        Self {
            dialed,
            reported_port: dialed.port,
            reported_addr: dialed.addr,
            metadata: PeerMetadata::default(),
        }
    }

    pub fn from_descriptor(dialed: Candidate, descriptor: ResolvedDescriptor) -> Self {
        Self {
            dialed,
            reported_port: descriptor.port,
            reported_addr: descriptor.addr,
            metadata: descriptor.metadata,
        }
    }

    /// `true` if the peer claimed a different identity than the one dialed.
    pub fn is_remapped(&self) -> bool {
        self.reported_port != self.dialed.port || self.reported_addr != self.dialed.addr
    }
}

/// Determines whether a cooperating peer answers at a candidate.
///
/// Implementations must be side-effect free beyond their own result and
/// must never fail: every problem is reported as absence.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Is anything listening at `candidate`?
    async fn is_reachable(&self, candidate: Candidate) -> bool;

    /// The peer's self-description, if it serves one.
    async fn describe(&self, candidate: Candidate) -> Option<ProbeResult>;

    async fn probe(&self, kind: ProbeKind, candidate: Candidate) -> Option<ProbeResult> {
        match kind {
            ProbeKind::Reachability => self
                .is_reachable(candidate)
                .await
                .then(|| ProbeResult::dialed_only(candidate)),
            ProbeKind::Descriptor => self.describe(candidate).await,
        }
    }
}

/// Probes over the real network: TCP handshakes and HTTP descriptor fetches.
#[derive(Debug, Clone)]
pub struct NetProber {
    descriptor: DescriptorClient,
    timeout: Duration,
}

impl NetProber {
    pub fn new(descriptor_path: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            descriptor: DescriptorClient::new(descriptor_path, timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl Prober for NetProber {
    async fn is_reachable(&self, candidate: Candidate) -> bool {
        tcp::handshake_probe(candidate, self.timeout).await
    }

    async fn describe(&self, candidate: Candidate) -> Option<ProbeResult> {
        self.descriptor
            .fetch(candidate)
            .await
            .map(|descriptor| ProbeResult::from_descriptor(candidate, descriptor))
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
