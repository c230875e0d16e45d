//! Bounded-concurrency probe dispatch.
//!
//! A [`Sweep`] keeps at most `budget` probes in flight and hands back hits in
//! the order they complete. Probes run as spawned tasks, so work already in
//! flight keeps progressing while the caller is busy with a hit.

use std::collections::VecDeque;
use std::sync::Arc;

use lenscout_common::config::ProbeKind;
use lenscout_common::network::target::Candidate;
use tokio::task::JoinSet;
use tracing::trace;

use super::{ProbeResult, Prober};

pub(crate) struct Sweep {
    pending: VecDeque<Candidate>,
    in_flight: JoinSet<Option<ProbeResult>>,
    budget: usize,
    prober: Arc<dyn Prober>,
    kind: ProbeKind,
    issued: usize,
}

impl Sweep {
    pub fn new(
        prober: Arc<dyn Prober>,
        kind: ProbeKind,
        candidates: Vec<Candidate>,
        budget: usize,
    ) -> Self {
        Self {
            pending: candidates.into(),
            in_flight: JoinSet::new(),
            budget: budget.max(1),
            prober,
            kind,
            issued: 0,
        }
    }

    /// The next hit in completion order, or `None` once every candidate has
    /// been probed.
    pub async fn next(&mut self) -> Option<ProbeResult> {
        loop {
            self.fill();

            match self.in_flight.join_next().await? {
                Ok(Some(hit)) => return Some(hit),
                Ok(None) => {}
                Err(e) => trace!("Probe task ended abnormally: {e}"),
            }
        }
    }

    /// Stops dispatching, collects hits that already completed and abandons
    /// the rest.
    pub fn halt(&mut self) -> Vec<ProbeResult> {
        self.pending.clear();

        let mut completed: Vec<ProbeResult> = Vec::new();
        while let Some(joined) = self.in_flight.try_join_next() {
            if let Ok(Some(hit)) = joined {
                completed.push(hit);
            }
        }

        self.in_flight.abort_all();
        completed
    }

    /// Probes dispatched so far.
    pub fn issued(&self) -> usize {
        self.issued
    }

    fn fill(&mut self) {
        while self.in_flight.len() < self.budget {
            let Some(candidate) = self.pending.pop_front() else {
                break;
            };

            let prober = Arc::clone(&self.prober);
            let kind = self.kind;
            self.in_flight
                .spawn(async move { prober.probe(kind, candidate).await });
            self.issued += 1;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scripted::ScriptedProber;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn candidate(last: u8, port: u16) -> Candidate {
        Candidate::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, last)), port)
    }

    #[tokio::test]
    async fn sweep_yields_every_hit_and_probes_everything() {
        let prober = Arc::new(
            ScriptedProber::new()
                .answer(candidate(3, 5001))
                .answer(candidate(9, 5001)),
        );
        let candidates: Vec<Candidate> = (1..=20).map(|last| candidate(last, 5001)).collect();

        let mut sweep = Sweep::new(prober.clone(), ProbeKind::Descriptor, candidates, 4);
        let mut hits = Vec::new();
        while let Some(hit) = sweep.next().await {
            hits.push(hit.dialed);
        }

        hits.sort();
        assert_eq!(hits, vec![candidate(3, 5001), candidate(9, 5001)]);
        assert_eq!(sweep.issued(), 20);
        assert_eq!(prober.issued(), 20);
    }

    #[tokio::test]
    async fn sweep_never_exceeds_budget() {
        let prober = Arc::new(ScriptedProber::new().with_miss_delay(Duration::from_millis(5)));
        let candidates: Vec<Candidate> = (1..=30).map(|last| candidate(last, 5001)).collect();

        let mut sweep = Sweep::new(prober.clone(), ProbeKind::Descriptor, candidates, 3);
        while sweep.next().await.is_some() {}

        assert_eq!(prober.issued(), 30);
        assert!(prober.peak_in_flight() <= 3);
    }

    #[tokio::test]
    async fn halted_sweep_dispatches_nothing_more() {
        let prober = Arc::new(ScriptedProber::new().answer(candidate(1, 5001)));
        let candidates: Vec<Candidate> = (1..=100).map(|last| candidate(last, 5001)).collect();

        let mut sweep = Sweep::new(prober.clone(), ProbeKind::Descriptor, candidates, 5);
        assert!(sweep.next().await.is_some());
        sweep.halt();

        assert!(sweep.next().await.is_none());
        assert_eq!(sweep.issued(), 5);
    }
}
