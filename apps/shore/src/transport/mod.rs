use crate::protocol::Message;
use async_trait::async_trait;
use std::time::Duration;

pub mod mock;
pub mod websocket;

pub use websocket::WebSocketTransport;

/// Bounded-retry policy for the initial connect loop. Mirrors the server's
/// expectations: a handful of attempts with a fixed delay, then give up and
/// wait for the user to retry explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Lifecycle and data events surfaced by a transport. Delivered in connection
/// order over a single channel consumed by the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    ConnectError {
        reason: String,
        attempt: u32,
        /// Set on the final attempt; the transport stops retrying after this.
        fatal: bool,
    },
    Output(Vec<u8>),
    Disconnected,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Kick off (or restart) the bounded-retry connect loop. Completion is
    /// signalled through the event channel, never a return value.
    fn connect(&self);

    /// Hand a message to the live connection. Dropped silently when not
    /// connected; there is no outbound queue.
    fn send(&self, message: Message);

    fn is_connected(&self) -> bool;

    /// Release the connection and stop every task owned by this transport.
    /// Safe to call on any exit path, including after a failed connect.
    async fn disconnect(&mut self);
}
