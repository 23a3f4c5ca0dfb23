//! Keepalive bookkeeping. Probes only ever go out while the link is up;
//! timestamps let diagnostics tell a quiet link from a dead one.

use std::time::Instant;

#[derive(Debug, Default)]
pub struct LivenessState {
    last_probe_at: Option<Instant>,
    connected: bool,
}

impl LivenessState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connected(&mut self) {
        self.connected = true;
    }

    pub fn on_disconnected(&mut self) {
        self.connected = false;
    }

    /// Whether a keepalive probe should be sent this tick.
    pub fn should_probe(&self) -> bool {
        self.connected
    }

    pub fn record_probe(&mut self) {
        self.last_probe_at = Some(Instant::now());
    }

    pub fn last_probe_at(&self) -> Option<Instant> {
        self.last_probe_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probes_are_gated_on_connection_state() {
        let mut liveness = LivenessState::new();
        assert!(!liveness.should_probe());
        liveness.on_connected();
        assert!(liveness.should_probe());
        liveness.on_disconnected();
        assert!(!liveness.should_probe());
    }

    #[test]
    fn probe_timestamps_survive_disconnects() {
        let mut liveness = LivenessState::new();
        liveness.on_connected();
        liveness.record_probe();
        let stamp = liveness.last_probe_at();
        assert!(stamp.is_some());
        liveness.on_disconnected();
        assert_eq!(liveness.last_probe_at(), stamp);
    }
}
