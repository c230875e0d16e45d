use std::net::IpAddr;

use colored::*;
use lenscout_core::scanner::ProbeResult;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ip_to_value(addr: &IpAddr) -> ColoredString {
    match addr {
        IpAddr::V4(v4) => v4.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(v6) => v6.to_string().color(colors::IPV6_ADDR),
    }
}

/// Tree details of one resolved port, enriched with whatever the peer
/// reported about itself.
pub fn discovery_to_details(addr: &IpAddr, result: Option<&ProbeResult>) -> Vec<Detail> {
    let mut details: Vec<Detail> = vec![("Address".to_string(), ip_to_value(addr))];

    let Some(result) = result else {
        return details;
    };

    if result.is_remapped() {
        details.push(("Dialed".to_string(), result.dialed.to_string().color(colors::SEPARATOR)));
    }
    if let Some(camera_id) = &result.metadata.camera_id {
        details.push(("Camera".to_string(), camera_id.color(colors::ACCENT)));
    }
    if let Some(stream_url) = &result.metadata.stream_url {
        details.push(("Stream".to_string(), stream_url.normal().underline()));
    }
    if !result.metadata.status.is_empty() {
        details.push(("Status".to_string(), result.metadata.status.green()));
    }

    details
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
