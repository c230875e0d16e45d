//! An in-memory [`Prober`] that answers from a table.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lenscout_common::network::target::Candidate;

use super::{ProbeResult, Prober};

#[derive(Debug, Default)]
pub(crate) struct ScriptedProber {
    answers: HashMap<Candidate, (ProbeResult, Duration)>,
    miss_delay: Duration,
    issued: AtomicUsize,
    all: Gauge,
    watched_block: Option<[u8; 3]>,
    watched: Gauge,
    dialed: Mutex<Vec<Candidate>>,
}

/// Probes currently running and the most seen at once.
#[derive(Debug, Default)]
struct Gauge {
    now: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) -> InFlight<'_> {
        let now = self.now.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlight(self)
    }
}

/// Leaves the gauge on drop, so aborted probes are counted out too.
struct InFlight<'a>(&'a Gauge);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.now.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// A peer at `dialed` that reports nothing about itself.
    pub fn answer(self, dialed: Candidate) -> Self {
        self.answer_after(dialed, Duration::ZERO)
    }

    /// A peer at `dialed` that takes `delay` to answer.
    pub fn answer_after(mut self, dialed: Candidate, delay: Duration) -> Self {
        self.answers
            .insert(dialed, (ProbeResult::dialed_only(dialed), delay));
        self
    }

    /// A peer at `dialed` that claims to be `addr:port`.
    pub fn answer_as(self, dialed: Candidate, addr: IpAddr, port: u16) -> Self {
        self.answer_as_after(dialed, addr, port, Duration::ZERO)
    }

    pub fn answer_as_after(
        mut self,
        dialed: Candidate,
        addr: IpAddr,
        port: u16,
        delay: Duration,
    ) -> Self {
        let result = ProbeResult {
            reported_port: port,
            reported_addr: addr,
            ..ProbeResult::dialed_only(dialed)
        };
        self.answers.insert(dialed, (result, delay));
        self
    }

    /// How long an unanswered probe takes to fail.
    pub fn with_miss_delay(mut self, delay: Duration) -> Self {
        self.miss_delay = delay;
        self
    }

    /// Keeps a separate in-flight peak for probes into one /24.
    pub fn watching(mut self, block: [u8; 3]) -> Self {
        self.watched_block = Some(block);
        self
    }

    pub fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.all.peak.load(Ordering::SeqCst)
    }

    pub fn watched_peak_in_flight(&self) -> usize {
        self.watched.peak.load(Ordering::SeqCst)
    }

    /// Every candidate probed, in the order the probes started.
    pub fn dialed(&self) -> Vec<Candidate> {
        self.dialed.lock().unwrap().clone()
    }

    fn is_watched(&self, candidate: Candidate) -> bool {
        match (candidate.addr, self.watched_block) {
            (IpAddr::V4(v4), Some(block)) => v4.octets()[..3] == block,
            _ => false,
        }
    }

    async fn lookup(&self, candidate: Candidate) -> Option<ProbeResult> {
        self.issued.fetch_add(1, Ordering::SeqCst);
        self.dialed.lock().unwrap().push(candidate);

        let _all = self.all.enter();
        let _watched = self.is_watched(candidate).then(|| self.watched.enter());

        let answer = self.answers.get(&candidate);
        let delay = answer.map_or(self.miss_delay, |(_, delay)| *delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        answer.map(|(result, _)| result.clone())
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn is_reachable(&self, candidate: Candidate) -> bool {
        self.lookup(candidate).await.is_some()
    }

    async fn describe(&self, candidate: Candidate) -> Option<ProbeResult> {
        self.lookup(candidate).await
    }
}
