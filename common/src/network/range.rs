//! # Candidate Address Space
//!
//! Pure generators for the host addresses a scan phase dials.
//!
//! Every generator works on /24 blocks and only ever yields host octets
//! `1..=254`, so network and broadcast addresses are never probed. All of
//! them are deterministic: calling one twice with the same input yields the
//! same sequence, which lets the orchestrator treat overlap between phases as
//! harmless.

use std::net::{IpAddr, Ipv4Addr};

use tracing::warn;

/// Usable host addresses in a /24 block.
pub const HOSTS_PER_BLOCK: usize = 254;

const FIRST_HOST: u8 = 1;
const LAST_HOST: u8 = 254;

/// Private /24 blocks where peers are commonly found when they are not on
/// the scanner's own subnet.
pub const COMMON_PRIVATE_BLOCKS: &[[u8; 3]] = &[
    [192, 168, 0],
    [192, 168, 1],
    [192, 168, 2],
    [192, 168, 3],
    [10, 0, 0],
    [10, 0, 1],
    [10, 0, 2],
    [172, 16, 0],
    [172, 16, 1],
    [172, 17, 0],
    [172, 18, 0],
];

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    /// The host portion (`.1` to `.254`) of the /24 identified by `prefix`.
    pub fn host_block(prefix: [u8; 3]) -> Self {
        let [a, b, c] = prefix;
        Self::new(
            Ipv4Addr::new(a, b, c, FIRST_HOST),
            Ipv4Addr::new(a, b, c, LAST_HOST),
        )
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }
}

impl std::fmt::Display for Ipv4Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_addr, self.end_addr)
    }
}

/// Parses a strict IPv4 dotted quad, surrounding whitespace allowed.
pub fn parse_ipv4(addr: &str) -> Option<Ipv4Addr> {
    addr.trim().parse::<Ipv4Addr>().ok()
}

/// The first three octets of `addr`, i.e. the /24 it lives in.
pub fn block_prefix(addr: Ipv4Addr) -> [u8; 3] {
    let [a, b, c, _] = addr.octets();
    [a, b, c]
}

/// The 254 host addresses of the /24 implied by `local_address`.
///
/// Yields nothing if `local_address` is not a well-formed IPv4 dotted quad.
pub fn primary_range(local_address: &str) -> Vec<Ipv4Addr> {
    match parse_ipv4(local_address) {
        Some(local) => Ipv4Range::host_block(block_prefix(local)).iter().collect(),
        None => {
            warn!("'{local_address}' is not an IPv4 address, primary range is empty");
            Vec::new()
        }
    }
}

/// The blocks of [`COMMON_PRIVATE_BLOCKS`] that [`common_ranges`] would cover.
pub fn common_blocks(excluding: &str) -> Vec<Ipv4Range> {
    let excluded: Option<[u8; 3]> = parse_ipv4(excluding).map(block_prefix);

    COMMON_PRIVATE_BLOCKS
        .iter()
        .filter(|prefix| Some(**prefix) != excluded)
        .map(|prefix| Ipv4Range::host_block(*prefix))
        .collect()
}

/// Host addresses of every common private block except the one `excluding`
/// lives in.
///
/// A malformed `excluding` address excludes nothing.
pub fn common_ranges(excluding: &str) -> Vec<Ipv4Addr> {
    common_blocks(excluding)
        .iter()
        .flat_map(|block| block.iter())
        .collect()
}

/// Up to `window` addresses on each side of `hit` within its /24, nearest
/// first, never leaving `.1..=.254` and never yielding `hit` itself.
///
/// IPv6 hits have no neighborhood and yield nothing.
pub fn nearby(hit: IpAddr, window: u8) -> Vec<Ipv4Addr> {
    let IpAddr::V4(hit) = hit else {
        return Vec::new();
    };

    let [a, b, c, host] = hit.octets();
    let mut neighbors: Vec<Ipv4Addr> = Vec::with_capacity(usize::from(window) * 2);

    for distance in 1..=window {
        let below = host.checked_sub(distance).filter(|h| *h >= FIRST_HOST);
        let above = host.checked_add(distance).filter(|h| *h <= LAST_HOST);

        neighbors.extend(
            [below, above]
                .into_iter()
                .flatten()
                .map(|h| Ipv4Addr::new(a, b, c, h)),
        );
    }

    neighbors
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
