use std::net::IpAddr;
use std::time::Duration;

use colored::*;
use lenscout_common::config::DEFAULT_TIMEOUT;
use lenscout_common::network::target::Candidate;
use lenscout_core::scanner::{NetProber, ProbeResult, Prober};
use tracing::info;

use crate::terminal::{colors, format, print};

const KEY_WIDTH: usize = 10;

pub async fn probe(
    addr: IpAddr,
    port: u16,
    timeout: Option<Duration>,
    path: &str,
    quiet: u8,
) -> anyhow::Result<()> {
    let timeout: Duration = timeout.unwrap_or(DEFAULT_TIMEOUT);
    let prober = NetProber::new(path, timeout)?;
    let candidate = Candidate::new(addr, port);

    info!("Probing {candidate} (timeout {timeout:?})");
    let reachable: bool = prober.is_reachable(candidate).await;
    let described: Option<ProbeResult> = if reachable {
        prober.describe(candidate).await
    } else {
        None
    };

    print::header(&format!("Probe {candidate}"), quiet);
    let reachable_value: ColoredString = match reachable {
        true => "yes".green().bold(),
        false => "no".red().bold(),
    };
    print::field("Reachable", reachable_value, KEY_WIDTH);

    let Some(result) = described else {
        print::field("Descriptor", "none".dimmed(), KEY_WIDTH);
        return Ok(());
    };

    print::field("Port", result.reported_port.to_string().color(colors::PORT), KEY_WIDTH);
    print::field("Address", format::ip_to_value(&result.reported_addr), KEY_WIDTH);
    if let Some(camera_id) = &result.metadata.camera_id {
        print::field("Camera", camera_id.color(colors::ACCENT), KEY_WIDTH);
    }
    if let Some(stream_url) = &result.metadata.stream_url {
        print::field("Stream", stream_url.normal().underline(), KEY_WIDTH);
    }
    print::field("Status", result.metadata.status.color(colors::TEXT_DEFAULT), KEY_WIDTH);

    Ok(())
}
