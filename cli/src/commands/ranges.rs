use colored::*;
use lenscout_common::network::interface;
use lenscout_common::network::range::{self, Ipv4Range};

use crate::lprint;
use crate::terminal::{colors, print};

pub fn ranges(local_addr: Option<String>, quiet: u8) {
    let local: Option<String> =
        local_addr.or_else(|| interface::local_ipv4().map(|ip| ip.to_string()));

    print::header("primary range", quiet);
    match local.as_deref() {
        Some(local) => match range::parse_ipv4(local) {
            Some(addr) => print_block(0, &Ipv4Range::host_block(range::block_prefix(addr))),
            None => print::status(format!("'{local}' is not an IPv4 address").red().to_string()),
        },
        None => print::status("no local address detected, skipped".yellow().to_string()),
    }

    lprint!();
    print::header("extended ranges", quiet);
    let excluding: &str = local.as_deref().unwrap_or_default();
    for (idx, block) in range::common_blocks(excluding).iter().enumerate() {
        print_block(idx, block);
    }
}

fn print_block(idx: usize, block: &Ipv4Range) {
    let hosts: usize = block.iter().count();
    print::tree(
        idx,
        &block.to_string(),
        &[("Hosts".to_string(), hosts.to_string().color(colors::ACCENT))],
    );
}
