// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host reachability primitive for the CLI.
//!
//! There is no OS network-status API we can rely on from a terminal process,
//! so reachability means "a TCP connection to the ingest host succeeds".

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::ConnectivityMonitor;

/// Periodic TCP reachability check feeding a [`ConnectivityMonitor`].
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    /// `host:port` to connect to.
    target: String,
    interval: Duration,
    timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(target: impl Into<String>, interval: Duration, timeout: Duration) -> Self {
        ReachabilityProbe {
            target: target.into(),
            interval,
            timeout,
        }
    }

    /// Probe the host and port of an ingest URL.
    ///
    /// Returns `None` when the URL has no host or no known default port.
    pub fn for_url(url: &Url, interval: Duration, timeout: Duration) -> Option<Self> {
        let host = url.host_str()?;
        let port = url.port_or_known_default()?;
        Some(Self::new(format!("{host}:{port}"), interval, timeout))
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// One reachability check.
    pub async fn check(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(self.target.as_str())).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!(addr = %self.target, error = %e, "probe failed");
                false
            }
            Err(_) => {
                tracing::debug!(addr = %self.target, "probe timed out");
                false
            }
        }
    }

    /// Check every `interval` until cancelled, feeding each result to `monitor`.
    pub fn spawn(
        self,
        monitor: Arc<ConnectivityMonitor>,
        cancel_token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let reachable = tokio::select! {
                    _ = cancel_token.cancelled() => return,
                    reachable = self.check() => reachable,
                };
                monitor.set_reachable(reachable);

                tokio::select! {
                    _ = cancel_token.cancelled() => return,
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
