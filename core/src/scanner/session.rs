//! # Discovery Session
//!
//! The result accumulator of one scan. Every probe that succeeds is offered
//! to [`Session::record`]; the first peer to report an identifier owns it for
//! the rest of the session.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use lenscout_common::network::target::TargetSet;
use tokio::sync::broadcast;

use super::ProbeResult;

const EVENT_CAPACITY: usize = 64;

/// Called once per accepted record with the identifier and its address.
pub type FoundHook = Arc<dyn Fn(u16, IpAddr) + Send + Sync>;

/// An accepted record, as seen by [`Session::subscribe`] receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub port: u16,
    pub addr: IpAddr,
    pub result: ProbeResult,
}

#[derive(Debug, Default)]
struct SessionState {
    mapping: BTreeMap<u16, IpAddr>,
    confirmed: BTreeSet<IpAddr>,
    detected: Vec<ProbeResult>,
}

pub struct Session {
    targets: TargetSet,
    state: Mutex<SessionState>,
    on_found: Option<FoundHook>,
    events: broadcast::Sender<Discovery>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("targets", &self.targets)
            .field("state", &*self.lock())
            .field("on_found", &self.on_found.is_some())
            .finish()
    }
}

impl Session {
    pub fn new(targets: TargetSet) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            targets,
            state: Mutex::new(SessionState::default()),
            on_found: None,
            events,
        }
    }

    pub fn with_hook(mut self, on_found: FoundHook) -> Self {
        self.on_found = Some(on_found);
        self
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Offers a probe result to the session.
    ///
    /// Accepted only if the reported identifier is a target that has no
    /// address yet. An accepted record fires the hook and one broadcast event
    /// before this returns.
    pub fn record(&self, result: ProbeResult) -> bool {
        let port = result.reported_port;
        let addr = result.reported_addr;

        {
            let mut state = self.lock();
            if !self.targets.contains(port) || state.mapping.contains_key(&port) {
                return false;
            }
            state.mapping.insert(port, addr);
            state.confirmed.insert(addr);
            state.detected.push(result.clone());
        }

        if let Some(hook) = &self.on_found {
            hook(port, addr);
        }
        // No receivers is not an error.
        let _ = self.events.send(Discovery { port, addr, result });

        true
    }

    pub fn is_satisfied(&self) -> bool {
        let state = self.lock();
        self.targets.iter().all(|port| state.mapping.contains_key(&port))
    }

    pub fn is_resolved(&self, port: u16) -> bool {
        self.lock().mapping.contains_key(&port)
    }

    /// Targets still without an address, in target order.
    pub fn unresolved(&self) -> TargetSet {
        let state = self.lock();
        TargetSet::new(
            self.targets
                .iter()
                .filter(|port| !state.mapping.contains_key(port)),
        )
    }

    pub fn mapping(&self) -> BTreeMap<u16, IpAddr> {
        self.lock().mapping.clone()
    }

    pub fn confirmed(&self) -> BTreeSet<IpAddr> {
        self.lock().confirmed.clone()
    }

    pub fn detected(&self) -> Vec<ProbeResult> {
        self.lock().detected.clone()
    }

    /// A stream of accepted records. Only records made after subscribing are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<Discovery> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panicking hook never runs under the lock, so the state stays
        // consistent even if the mutex reports poisoning.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
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
    use lenscout_common::network::target::Candidate;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn hit(last: u8, port: u16) -> ProbeResult {
        ProbeResult::dialed_only(Candidate::new(ip(last), port))
    }

    fn remapped(last: u8, dialed: u16, reported: u16) -> ProbeResult {
        ProbeResult {
            reported_port: reported,
            ..hit(last, dialed)
        }
    }

    #[test]
    fn first_writer_wins() {
        let session = Session::new(TargetSet::new([5001]));

        assert!(session.record(hit(5, 5001)));
        assert!(!session.record(hit(9, 5001)));

        assert_eq!(session.mapping().get(&5001), Some(&ip(5)));
        assert_eq!(session.detected().len(), 1);
        assert!(!session.confirmed().contains(&ip(9)));
    }

    #[test]
    fn self_reported_identifier_is_indexed() {
        let session = Session::new(TargetSet::new([5001, 5002]));

        assert!(session.record(remapped(7, 5002, 5001)));

        assert_eq!(session.mapping().get(&5001), Some(&ip(7)));
        assert!(!session.is_resolved(5002));
        assert_eq!(session.unresolved(), TargetSet::new([5002]));
    }

    #[test]
    fn identifiers_outside_targets_are_rejected() {
        let session = Session::new(TargetSet::new([5001, 5002]));

        assert!(!session.record(hit(1, 5000)));
        for last in 1..=20 {
            for port in 4990..5010 {
                session.record(hit(last, port));
                assert!(session.mapping().len() <= session.targets().len());
            }
        }
        assert!(session.is_satisfied());
        assert_eq!(session.mapping().len(), 2);
    }

    #[test]
    fn satisfaction_tracks_every_target() {
        let session = Session::new(TargetSet::new([5001, 5002]));
        assert!(!session.is_satisfied());

        session.record(hit(1, 5001));
        assert!(!session.is_satisfied());

        session.record(hit(1, 5002));
        assert!(session.is_satisfied());
        assert_eq!(session.confirmed().len(), 1);
    }

    #[test]
    fn empty_target_set_is_trivially_satisfied() {
        let session = Session::new(TargetSet::default());
        assert!(session.is_satisfied());
        assert!(!session.record(hit(1, 5001)));
    }

    #[test]
    fn hook_fires_once_per_accepted_record() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let hook: FoundHook = Arc::new(move |port: u16, _: IpAddr| {
            assert_eq!(port, 5001);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let session = Session::new(TargetSet::new([5001])).with_hook(hook);

        session.record(hit(1, 5001));
        session.record(hit(2, 5001));
        session.record(hit(3, 5000));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_records_accept_exactly_one_writer() {
        let session = Arc::new(Session::new(TargetSet::new([5001])));
        let accepted = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (1..=16)
            .map(|last| {
                let session = Arc::clone(&session);
                let accepted = Arc::clone(&accepted);
                std::thread::spawn(move || {
                    if session.record(hit(last, 5001)) {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        assert_eq!(session.detected().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_receive_accepted_records() {
        let session = Session::new(TargetSet::new([5001, 5002]));
        let mut events = session.subscribe();

        session.record(hit(4, 5002));
        session.record(hit(5, 5002));

        let event = events.recv().await.unwrap();
        assert_eq!((event.port, event.addr), (5002, ip(4)));
        assert!(events.try_recv().is_err());
    }
}
