//! The descriptor probe: asks a candidate to describe itself over HTTP.

use std::time::Duration;

use anyhow::Context;
use lenscout_common::network::target::Candidate;
use lenscout_protocols::descriptor::{self, ResolvedDescriptor};
use reqwest::Client;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct DescriptorClient {
    client: Client,
    path: String,
    timeout: Duration,
}

impl DescriptorClient {
    pub fn new(path: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("building HTTP client for descriptor probes")?;

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Ok(Self {
            client,
            path,
            timeout,
        })
    }

    pub fn url_for(&self, candidate: Candidate) -> String {
        format!("http://{candidate}{}", self.path)
    }

    /// Fetches and resolves the descriptor served by `candidate`.
    ///
    /// Any failure, whether transport, status or body, yields `None`.
    pub async fn fetch(&self, candidate: Candidate) -> Option<ResolvedDescriptor> {
        let url: String = self.url_for(candidate);

        let response = match self.client.get(&url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                trace!("{url}: {e}");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            trace!("{url}: HTTP status {status}");
            return None;
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                trace!("{url}: reading body failed: {e}");
                return None;
            }
        };

        match descriptor::parse(&body) {
            Ok(document) => Some(document.resolve(candidate.addr, candidate.port)),
            Err(e) => {
                trace!("{url}: {e}");
                None
            }
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
