// Copyright 2026 Wayback Harvest Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken until the network went idle, in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for network idle, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<NavigationResult>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// A network request lifecycle event observed in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkActivity {
    Started(String),
    Finished(String),
}

/// Wait until no request has been in flight for `idle`.
///
/// Archived pages replay their sub-resources asynchronously after the load
/// event, so a page only counts as rendered once this returns. A request that
/// never finishes keeps this pending; callers bound it with a timeout.
pub async fn wait_for_network_idle<S>(events: &mut S, idle: Duration)
where
    S: Stream<Item = NetworkActivity> + Unpin,
{
    let mut in_flight: HashSet<String> = HashSet::new();

    loop {
        match tokio::time::timeout(idle, events.next()).await {
            Ok(Some(NetworkActivity::Started(id))) => {
                in_flight.insert(id);
            }
            Ok(Some(NetworkActivity::Finished(id))) => {
                in_flight.remove(&id);
            }
            Ok(None) => return,
            Err(_) if in_flight.is_empty() => return,
            Err(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    #[tokio::test]
    async fn test_idle_immediately_when_quiet() {
        let (_tx, rx) = mpsc::unbounded_channel::<NetworkActivity>();
        let mut events = UnboundedReceiverStream::new(rx);
        let start = Instant::now();
        wait_for_network_idle(&mut events, Duration::from_millis(30)).await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_waits_for_in_flight_requests() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = UnboundedReceiverStream::new(rx);

        tx.send(NetworkActivity::Started("1".into())).unwrap();
        tx.send(NetworkActivity::Started("2".into())).unwrap();
        tx.send(NetworkActivity::Finished("1".into())).unwrap();

        let finisher = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(120)).await;
            tx.send(NetworkActivity::Finished("2".into())).unwrap();
            // Keep the stream open so idle detection, not stream end, returns.
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(tx);
        });

        let start = Instant::now();
        wait_for_network_idle(&mut events, Duration::from_millis(30)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(140));
        assert!(elapsed < Duration::from_millis(500));
        finisher.abort();
    }

    #[tokio::test]
    async fn test_stream_end_returns() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut events = UnboundedReceiverStream::new(rx);
        tx.send(NetworkActivity::Started("1".into())).unwrap();
        drop(tx);
        wait_for_network_idle(&mut events, Duration::from_secs(10)).await;
    }
}
