use std::net::SocketAddr;
use std::time::Duration;

use lenscout_common::network::target::Candidate;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Returns `true` if a TCP handshake with `candidate` completes in time.
///
/// Refused, unreachable and timed out connections all read as `false`.
pub async fn handshake_probe(candidate: Candidate, probe_timeout: Duration) -> bool {
    let socket_addr: SocketAddr = SocketAddr::new(candidate.addr, candidate.port);

    match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            trace!("{candidate} refused handshake: {e}");
            false
        }
        Err(_elapsed) => {
            trace!("{candidate} timed out after {probe_timeout:?}");
            false
        }
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
