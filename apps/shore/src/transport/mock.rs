use super::Transport;
use crate::protocol::Message;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory transport for exercising the session loop in tests. Connection
/// state is driven by hand; sends are recorded while "connected" and dropped
/// otherwise, matching the real transport's silent-drop contract.
#[derive(Clone, Default)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    connect_calls: Arc<AtomicU32>,
    disconnect_calls: Arc<AtomicU32>,
    sent: Arc<Mutex<Vec<Message>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    pub fn connect_calls(&self) -> u32 {
        self.connect_calls.load(Ordering::Acquire)
    }

    pub fn disconnect_calls(&self) -> u32 {
        self.disconnect_calls.load(Ordering::Acquire)
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn connect(&self) {
        self.connect_calls.fetch_add(1, Ordering::AcqRel);
    }

    fn send(&self, message: Message) {
        if !self.is_connected() {
            return;
        }
        self.sent.lock().unwrap().push(message);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn disconnect(&mut self) {
        self.connected.store(false, Ordering::Release);
        self.disconnect_calls.fetch_add(1, Ordering::AcqRel);
    }
}
