#![cfg(test)]
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lenscout_common::config::{Config, ProbeKind};
use lenscout_common::network::target::TargetSet;
use lenscout_core::discovery::{DiscoveryService, ScanReport};
use lenscout_core::scanner::orchestrator::Phase;
use lenscout_core::scanner::session::FoundHook;
use serde_json::json;

use crate::utils::{FakePeer, free_port, free_ports, loopback};

fn loopback_config(targets: TargetSet) -> Config {
    Config {
        targets,
        timeout: Duration::from_millis(500),
        local_address: Some("127.0.0.1".into()),
        extended: false,
        ..Config::default()
    }
}

/// Two peers on different loopback addresses are both found by the sweep
/// of 127.0.0.0/24, and the hook sees each of them once.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn discovery_finds_peers_on_loopback_range() {
    let ports = free_ports(2).await.unwrap();
    let (p1, p2) = (ports[0], ports[1]);
    let _a = FakePeer::describing(loopback(20), p1, json!({ "port": p1, "camera_id": 1 }))
        .await
        .unwrap();
    let _b = FakePeer::describing(loopback(21), p2, json!({ "port": p2, "camera_id": 2 }))
        .await
        .unwrap();

    let service = DiscoveryService::new(loopback_config(TargetSet::new([p1, p2]))).unwrap();
    let found: Arc<Mutex<Vec<(u16, IpAddr)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&found);
    let hook: FoundHook = Arc::new(move |port: u16, addr: IpAddr| {
        sink.lock().unwrap().push((port, addr));
    });

    let report: ScanReport = service.perform_discovery(Some(hook)).await.unwrap();

    assert_eq!(report.mapping.get(&p1), Some(&loopback(20)));
    assert_eq!(report.mapping.get(&p2), Some(&loopback(21)));
    assert_eq!(found.lock().unwrap().len(), 2);
    assert!(report.probes_issued < 254 * 2 + 2 * 41);
    assert!(report.phases.iter().all(|p| p.phase != Phase::Extended));

    let camera_ids: Vec<Option<&str>> = report
        .detected
        .iter()
        .map(|r| r.metadata.camera_id.as_deref())
        .collect();
    assert!(camera_ids.contains(&Some("1")));
    assert!(camera_ids.contains(&Some("2")));
}

/// A peer reachable at one address and port that reports another identity
/// is indexed by what it reports.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn self_reported_identity_wins() {
    let ports = free_ports(2).await.unwrap();
    let (dialed, reported) = (ports[0], ports[1]);
    let _peer = FakePeer::describing(
        loopback(30),
        dialed,
        json!({ "port": reported, "ip_address": "127.0.0.31" }),
    )
    .await
    .unwrap();

    let cfg = loopback_config(TargetSet::new([dialed, reported]));
    let service = DiscoveryService::new(cfg).unwrap();
    let report = service.perform_discovery(None).await.unwrap();

    assert_eq!(report.mapping.get(&reported), Some(&loopback(31)));
    assert_eq!(report.mapping.get(&dialed), None);
    assert_eq!(report.unresolved(&service.config().targets), vec![dialed]);
}

/// Connection-only probing finds a peer that serves no descriptor at all.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn reachability_probe_finds_silent_peer() {
    let port = free_port().await.unwrap();
    let _peer = FakePeer::silent(loopback(40), port).await.unwrap();

    let cfg = Config {
        probe_kind: ProbeKind::Reachability,
        ..loopback_config(TargetSet::new([port]))
    };
    let report = DiscoveryService::new(cfg)
        .unwrap()
        .perform_discovery(None)
        .await
        .unwrap();

    assert_eq!(report.mapping.get(&port), Some(&loopback(40)));
}

/// Known addresses are tried before any sweep and can satisfy the run on
/// their own, even when the local address is unusable.
#[tokio::test]
#[cfg(target_os = "linux")]
async fn seed_addresses_resolve_without_sweeping() {
    let port = free_port().await.unwrap();
    let _peer = FakePeer::describing(loopback(50), port, json!({})).await.unwrap();

    let cfg = Config {
        seeds: vec![loopback(50)],
        local_address: Some("not-an-ip".into()),
        ..loopback_config(TargetSet::new([port]))
    };
    let report = DiscoveryService::new(cfg)
        .unwrap()
        .perform_discovery(None)
        .await
        .unwrap();

    assert_eq!(report.mapping.get(&port), Some(&loopback(50)));
    assert_eq!(report.phases.len(), 1);
    assert_eq!(report.phases[0].phase, Phase::Known);
}

#[tokio::test]
async fn quick_discovery_finds_local_peer() {
    let port = free_port().await.unwrap();
    let _peer = FakePeer::describing(loopback(1), port, json!({ "status": "streaming" }))
        .await
        .unwrap();

    let service = DiscoveryService::new(loopback_config(TargetSet::new([port]))).unwrap();
    let report = service.perform_quick_discovery(None).await.unwrap();

    assert_eq!(report.mapping.get(&port), Some(&loopback(1)));
    assert_eq!(report.detected[0].metadata.status, "streaming");
}

#[tokio::test]
#[cfg(target_os = "linux")]
async fn session_subscribers_see_discoveries() {
    let port = free_port().await.unwrap();
    let _peer = FakePeer::describing(loopback(60), port, json!({})).await.unwrap();

    let service = DiscoveryService::new(loopback_config(TargetSet::new([port]))).unwrap();
    let session = service.session();
    let mut events = session.subscribe();

    let report = service.run(&session).await;

    let event = events.try_recv().unwrap();
    assert_eq!((event.port, event.addr), (port, loopback(60)));
    assert_eq!(report.mapping.len(), 1);
}

#[tokio::test]
async fn nothing_to_find_is_not_an_error() {
    let service = DiscoveryService::new(loopback_config(TargetSet::default())).unwrap();
    let report = service.perform_discovery(None).await.unwrap();

    assert!(report.mapping.is_empty());
    assert_eq!(report.probes_issued, 0);
}
