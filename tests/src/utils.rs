#![cfg(test)]
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub fn loopback(last: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, last))
}

/// A port that was free on 127.0.0.1 a moment ago.
pub async fn free_port() -> anyhow::Result<u16> {
    Ok(free_ports(1).await?[0])
}

/// `n` distinct ports that were free on 127.0.0.1 a moment ago.
pub async fn free_ports(n: usize) -> anyhow::Result<Vec<u16>> {
    let mut listeners: Vec<TcpListener> = Vec::with_capacity(n);
    for _ in 0..n {
        listeners.push(TcpListener::bind((loopback(1), 0)).await?);
    }

    listeners
        .iter()
        .map(|listener| Ok(listener.local_addr()?.port()))
        .collect()
}

/// A fake peer serving `descriptor` as its self-description on every
/// request. Aborted when dropped.
pub struct FakePeer {
    pub addr: SocketAddr,
    task: JoinHandle<()>,
}

impl FakePeer {
    pub async fn describing(addr: IpAddr, port: u16, descriptor: Value) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((addr, port)).await?;
        let addr = listener.local_addr()?;
        let body: String = serde_json::to_string(&descriptor)?;

        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = stream.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Ok(Self { addr, task })
    }

    /// A peer that accepts connections and never says anything.
    pub async fn silent(addr: IpAddr, port: u16) -> anyhow::Result<Self> {
        let listener = TcpListener::bind((addr, port)).await?;
        let addr = listener.local_addr()?;

        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        Ok(Self { addr, task })
    }
}

impl Drop for FakePeer {
    fn drop(&mut self) {
        self.task.abort();
    }
}
