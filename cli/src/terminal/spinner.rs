use std::net::IpAddr;

use colored::*;
use indicatif::ProgressStyle;
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::terminal::colors;

const TICK_STRINGS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// The style of every span that shows a progress indicator.
pub fn style() -> anyhow::Result<ProgressStyle> {
    Ok(ProgressStyle::with_template("{spinner:.blue} {wide_msg}")?.tick_strings(TICK_STRINGS))
}

pub fn waiting(span: &Span, targets: usize) {
    span.pb_set_message(
        &format!("Looking for {} ...", format!("{targets} port(s)").bold())
            .color(colors::TEXT_DEFAULT)
            .to_string(),
    );
}

pub fn report_discovery_progress(
    span: &Span,
    port: u16,
    addr: IpAddr,
    found: usize,
    targets: usize,
) {
    span.pb_set_message(
        &format!(
            "Resolved {} of {} so far, latest {} at {}",
            found.to_string().green().bold(),
            targets,
            port.to_string().color(colors::PORT),
            addr.to_string().color(colors::IPV4_ADDR),
        )
        .color(colors::TEXT_DEFAULT)
        .to_string(),
    );
}
