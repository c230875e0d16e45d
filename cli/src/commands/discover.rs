use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use colored::*;
use lenscout_common::network::target::TargetSet;
use lenscout_common::success;
use lenscout_core::discovery::{DiscoveryService, ScanReport};
use lenscout_core::scanner::session::FoundHook;
use tracing::{Span, info_span};

use crate::commands::ScanArgs;
use crate::lprint;
use crate::terminal::format::{self, Detail};
use crate::terminal::{colors, print, spinner};

pub async fn discover(args: &ScanArgs, quiet: u8) -> anyhow::Result<()> {
    let service = DiscoveryService::new(args.to_config()?)?;

    let span: Span = info_span!("discovery", indicatif.pb_show = true);
    let hook: FoundHook = progress_hook(&span, service.config().targets.len());
    spinner::waiting(&span, service.config().targets.len());

    let report: ScanReport = {
        let _guard = span.enter();
        service.perform_discovery(Some(hook)).await?
    };
    drop(span);

    discovery_ends(&report, &service.config().targets, quiet);
    Ok(())
}

/// Updates the spinner of `span` on every accepted discovery.
pub fn progress_hook(span: &Span, targets: usize) -> FoundHook {
    let span: Span = span.clone();
    let found: AtomicUsize = AtomicUsize::new(0);

    Arc::new(move |port: u16, addr: IpAddr| {
        let found: usize = found.fetch_add(1, Ordering::Relaxed) + 1;
        spinner::report_discovery_progress(&span, port, addr, found, targets);
    })
}

pub fn discovery_ends(report: &ScanReport, targets: &TargetSet, quiet: u8) {
    if report.mapping.is_empty() {
        no_peers_found(quiet);
        return;
    }

    if quiet > 0 {
        lprint!();
    }

    print::header("Discovered Peers", quiet);
    print_peers(report, quiet);
    print_summary(report, targets, quiet);
}

fn no_peers_found(quiet: u8) {
    print::header("ZERO PEERS DETECTED", quiet);
    print::no_results();
}

fn print_peers(report: &ScanReport, quiet: u8) {
    for (idx, (port, addr)) in report.mapping.iter().enumerate() {
        match quiet {
            2 => print::status(format!("{port} {addr}")),
            _ => {
                let result = report
                    .detected
                    .iter()
                    .find(|result| result.reported_port == *port);

                let details: Vec<Detail> = format::discovery_to_details(addr, result);
                print::tree(idx, &format!("Port {port}"), &details);

                if idx + 1 != report.mapping.len() {
                    lprint!();
                }
            }
        }
    }
}

fn print_summary(report: &ScanReport, targets: &TargetSet, quiet: u8) {
    let resolved: ColoredString = format!("{}/{} ports", report.mapping.len(), targets.len())
        .bold()
        .green();
    let total_time: ColoredString = format!("{:.2}s", report.elapsed.as_secs_f64())
        .bold()
        .yellow();
    let output: &ColoredString = &format!("Discovery Complete: {resolved} resolved in {total_time}")
        .color(colors::TEXT_DEFAULT);

    let unresolved: Vec<String> = report
        .unresolved(targets)
        .iter()
        .map(u16::to_string)
        .collect();

    match quiet {
        0 => {
            print::rule();
            print::centered(&output.to_string());
            if !unresolved.is_empty() {
                let missing: String = format!("Unresolved: {}", unresolved.join(", "));
                print::centered(&missing.red().to_string());
            }
        }
        _ => {
            lprint!();
            success!("{}", output)
        }
    }
}
