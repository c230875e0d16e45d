//! # Descriptor Document
//!
//! A peer describes itself with a small JSON object served over HTTP:
//!
//! ```json
//! {
//!   "port": 5001,
//!   "ip_address": "192.168.1.20",
//!   "camera_id": 1,
//!   "stream_url": "http://192.168.1.20:5001/stream",
//!   "status": "running"
//! }
//! ```
//!
//! Every field is optional. `port` and `ip_address` are authoritative when
//! present: a peer behind NAT or on a multi-homed host knows better than the
//! scanner which identifier and address it serves. Missing values fall back
//! to what was dialed.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

pub const DEFAULT_STATUS: &str = "running";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("malformed descriptor document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("descriptor document is not a JSON object")]
    NotAnObject,
}

/// The document exactly as the peer sent it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptorDocument {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub ip_address: Option<String>,
    /// Opaque application id; peers send either a number or a string.
    #[serde(default)]
    pub camera_id: Option<Value>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Optional, opaque details a peer reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeerMetadata {
    pub camera_id: Option<String>,
    pub stream_url: Option<String>,
    pub status: String,
}

/// Identity and metadata after applying the dialed-value fallbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDescriptor {
    pub port: u16,
    pub addr: IpAddr,
    pub metadata: PeerMetadata,
}

/// Parses a response body into a [`DescriptorDocument`].
pub fn parse(body: &[u8]) -> Result<DescriptorDocument, DescriptorError> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(DescriptorError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

impl DescriptorDocument {
    /// Fills in whatever the peer left out with the dialed values.
    ///
    /// An `ip_address` that is not an IP address counts as absent.
    pub fn resolve(self, dialed_addr: IpAddr, dialed_port: u16) -> ResolvedDescriptor {
        let addr: IpAddr = match self.ip_address.as_deref().map(str::trim) {
            Some(reported) => reported.parse().unwrap_or_else(|_| {
                trace!("{dialed_addr}:{dialed_port} reported unusable address '{reported}'");
                dialed_addr
            }),
            None => dialed_addr,
        };

        ResolvedDescriptor {
            port: self.port.unwrap_or(dialed_port),
            addr,
            metadata: PeerMetadata {
                camera_id: self.camera_id.and_then(opaque_id),
                stream_url: self.stream_url,
                status: self.status.unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            },
        }
    }
}

fn opaque_id(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
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
