//! Picks the local IPv4 address the primary sweep is centered on.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::IpNetwork;
use tracing::debug;

use crate::utils::interface::NetworkInterfaceExtension;

#[cfg(target_os = "linux")]
use linux_impl::{is_physical, is_wireless};
#[cfg(not(target_os = "linux"))]
use portable_impl::{is_physical, is_wireless};

/// Routed, never contacted: connecting a UDP socket sends nothing.
const ROUTE_PROBE: Ipv4Addr = Ipv4Addr::new(8, 8, 8, 8);

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ViabilityError {
    /// The interface is operationally down.
    IsDown,
    /// The interface was filtered out as "not physical" by the provided logic.
    NotPhysical,
    /// The interface does not support broadcast.
    NotBroadcast,
    /// The interface is a point-to-point link (e.g., a VPN).
    IsPointToPoint,
    /// The interface has no private IPv4 address.
    NoPrivateIpv4,
}

/// Returns the address the scan should treat as "local".
///
/// Preference order:
/// 1. the private IPv4 of the best LAN interface (wired before wireless),
/// 2. the source address the kernel would route public traffic from.
///
/// `None` when neither exists; loopback is never a LAN to sweep.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    if let Some(ip) = lan_ipv4() {
        debug!("Using LAN interface address {ip}");
        return Some(ip);
    }

    if let Some(ip) = resolve_route_source_ip(ROUTE_PROBE) {
        debug!("Using routed source address {ip}");
        return Some(ip);
    }

    debug!("No usable interface or route found");
    None
}

fn lan_ipv4() -> Option<Ipv4Addr> {
    let interfaces: Vec<NetworkInterface> = datalink::interfaces()
        .into_iter()
        .filter(|interface| is_viable_lan_interface(interface, is_physical).is_ok())
        .collect();

    select_best_lan_interface(interfaces, is_wired)?.get_private_ipv4()
}

fn is_viable_lan_interface(
    interface: &NetworkInterface,
    is_physical: impl Fn(&NetworkInterface) -> bool,
) -> Result<(), ViabilityError> {
    if !interface.is_up() {
        return Err(ViabilityError::IsDown);
    }
    if interface.is_loopback() || !is_physical(interface) {
        return Err(ViabilityError::NotPhysical);
    }
    if !interface.is_broadcast() {
        return Err(ViabilityError::NotBroadcast);
    }
    if interface.is_point_to_point() {
        return Err(ViabilityError::IsPointToPoint);
    }
    let has_private_v4 = interface.ips.iter().any(|net| match net {
        IpNetwork::V4(ipv4) => ipv4.ip().is_private(),
        IpNetwork::V6(_) => false,
    });
    if !has_private_v4 {
        return Err(ViabilityError::NoPrivateIpv4);
    }

    Ok(())
}

fn select_best_lan_interface(
    interfaces: Vec<NetworkInterface>,
    is_wired: impl Fn(&NetworkInterface) -> bool,
) -> Option<NetworkInterface> {
    let wired = interfaces.iter().position(is_wired);
    let mut interfaces = interfaces;

    match wired {
        Some(idx) => Some(interfaces.swap_remove(idx)),
        None => interfaces.into_iter().next(),
    }
}

fn resolve_route_source_ip(target: Ipv4Addr) -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((target, 53)).ok()?;

    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

fn is_wired(interface: &NetworkInterface) -> bool {
    is_physical(interface) && !is_wireless(interface)
}

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::path::Path;

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/device", interface.name)).exists()
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        Path::new(&format!("/sys/class/net/{}/wireless", interface.name)).exists()
    }
}

// Without sysfs, fall back to the usual interface naming schemes.
#[cfg(not(target_os = "linux"))]
mod portable_impl {
    use super::*;

    const VIRTUAL_PREFIXES: &[&str] = &["lo", "utun", "tun", "tap", "bridge", "awdl", "llw", "vmnet"];

    pub fn is_physical(interface: &NetworkInterface) -> bool {
        !VIRTUAL_PREFIXES
            .iter()
            .any(|prefix| interface.name.starts_with(prefix))
    }

    pub fn is_wireless(interface: &NetworkInterface) -> bool {
        interface.name.starts_with("wl")
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
