//! The event-bus boundary.
//!
//! The pipeline consumes raw events and publishes alerts through the
//! [`EventBus`] trait; the transport behind it (Redis pub/sub in the
//! reference deployment) lives outside this crate. [`MemoryBus`] is an
//! in-process implementation over [`tokio::sync::broadcast`], used by the
//! test suite and by embedders running producer and consumer in one process.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tracing::warn;

use crate::core::PulseError;

/// A single subscription to one channel.
///
/// `recv` blocks the calling task until a payload is available and returns
/// `None` once the channel is closed.
pub trait BusSubscription: Send {
    fn recv(&mut self) -> impl Future<Output = Option<String>> + Send;
}

/// Publish/subscribe transport for raw events in and alerts out.
///
/// `publish` returns the number of subscribers the payload was delivered to;
/// zero subscribers is a successful no-op, not an error.
pub trait EventBus: Send + Sync {
    type Subscription: BusSubscription;

    fn publish(
        &self,
        channel: &str,
        payload: &str,
    ) -> impl Future<Output = Result<usize, PulseError>> + Send;

    fn subscribe(
        &self,
        channel: &str,
    ) -> impl Future<Output = Result<Self::Subscription, PulseError>> + Send;
}

const CHANNEL_CAPACITY: usize = 256;

/// In-process bus over tokio broadcast channels.
#[derive(Clone, Default)]
pub struct MemoryBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, channel: &str) -> broadcast::Sender<String> {
        let mut guard = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl EventBus for MemoryBus {
    type Subscription = MemorySubscription;

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, PulseError> {
        // send errors only when there are no receivers; the bus contract
        // treats that as zero deliveries, not a failure.
        Ok(self
            .sender(channel)
            .send(payload.to_string())
            .unwrap_or(0))
    }

    async fn subscribe(&self, channel: &str) -> Result<MemorySubscription, PulseError> {
        Ok(MemorySubscription {
            channel: channel.to_string(),
            rx: self.sender(channel).subscribe(),
        })
    }
}

/// Receiving half of a [`MemoryBus`] channel.
pub struct MemorySubscription {
    channel: String,
    rx: broadcast::Receiver<String>,
}

impl BusSubscription for MemorySubscription {
    async fn recv(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(channel = %self.channel, missed, "subscription lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
