//! Session state machine. One task owns the session and drains every source
//! of change (transport events, host input, timers) through a single
//! `select!` loop, so handlers never race each other.

pub mod health;
pub mod liveness;

use std::io;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::input::HostEvent;
use crate::client::line_editor::{EditorEvent, KeyInput, LineEditor};
use crate::client::surface::Surface;
use crate::config::ClientConfig;
use crate::protocol::Message;
use crate::transport::{Transport, TransportEvent};

use self::liveness::LivenessState;

/// Viewport dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
}

impl Default for Geometry {
    fn default() -> Self {
        Self { cols: 80, rows: 24 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

/// What the local display currently reflects.
#[derive(Debug, Default)]
struct UiState {
    loading: bool,
    connected: bool,
}

enum Flow {
    Continue,
    /// Restart the loading deadline after an explicit reconnect.
    Reconnect,
    Quit,
}

const GREETING: &[u8] = b"\r\n\x1b[32mConnected to terminal server\x1b[0m\r\n\r\n$ ";
const DISCONNECTED_NOTICE: &[u8] =
    b"\r\n\x1b[31mDisconnected from terminal server. Press Ctrl-R to reconnect.\x1b[0m\r\n";
const FAILED_NOTICE: &[u8] =
    b"\r\n\x1b[31mGiving up after repeated connection failures. Press Ctrl-R to retry.\x1b[0m\r\n";
const SLOW_CONNECT_NOTICE: &[u8] =
    b"\r\n\x1b[33mStill waiting for the terminal server...\x1b[0m\r\n";

const CTRL_R: u8 = 0x12;

pub struct Session<T: Transport, S: Surface> {
    transport: T,
    surface: S,
    config: ClientConfig,
    status: SessionStatus,
    reconnect_attempt: u32,
    geometry: Geometry,
    last_sent_geometry: Option<Geometry>,
    liveness: LivenessState,
    ui: UiState,
    editor: LineEditor,
}

impl<T: Transport, S: Surface> Session<T, S> {
    pub fn new(transport: T, surface: S, config: ClientConfig) -> Self {
        Self {
            transport,
            surface,
            config,
            status: SessionStatus::Idle,
            reconnect_attempt: 0,
            geometry: Geometry::default(),
            last_sent_geometry: None,
            liveness: LivenessState::new(),
            ui: UiState::default(),
            editor: LineEditor::new(),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Kick off the first connection. The outcome arrives later as a
    /// `TransportEvent` on the session's event channel.
    pub fn connect(&mut self) {
        self.status = SessionStatus::Connecting;
        self.ui.loading = true;
        self.transport.connect();
    }

    /// Drive the session until the host quits or both channels close.
    pub async fn run(
        &mut self,
        events: &mut UnboundedReceiver<TransportEvent>,
        host_events: &mut UnboundedReceiver<HostEvent>,
    ) -> io::Result<()> {
        let mut ping = tokio::time::interval(self.config.ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick of a tokio interval fires immediately; swallow it so the
        // first real probe lands one full interval after connect.
        ping.tick().await;

        let loading_deadline = tokio::time::sleep(self.config.loading_timeout);
        tokio::pin!(loading_deadline);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_transport_event(event)?,
                    None => break,
                },
                host_event = host_events.recv() => match host_event {
                    Some(event) => match self.handle_host_event(event)? {
                        Flow::Continue => {}
                        Flow::Reconnect => {
                            loading_deadline
                                .as_mut()
                                .reset(Instant::now() + self.config.loading_timeout);
                        }
                        Flow::Quit => break,
                    },
                    None => break,
                },
                _ = ping.tick() => self.handle_ping_tick(),
                _ = &mut loading_deadline, if self.ui.loading => {
                    self.handle_loading_deadline()?;
                }
            }
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        self.transport.disconnect().await;
    }

    fn handle_transport_event(&mut self, event: TransportEvent) -> io::Result<()> {
        match event {
            TransportEvent::Connected => {
                info!("session connected");
                self.status = SessionStatus::Connected;
                self.reconnect_attempt = 0;
                self.ui.loading = false;
                self.ui.connected = true;
                self.liveness.on_connected();
                self.surface.write(GREETING)?;
                self.geometry = self.surface.fit();
                // Force a geometry announcement on every (re)connect.
                self.last_sent_geometry = None;
                self.maybe_send_geometry();
            }
            TransportEvent::ConnectError {
                reason,
                attempt,
                fatal,
            } => {
                warn!(%reason, attempt, fatal, "connection attempt failed");
                self.reconnect_attempt = attempt;
                let notice =
                    format!("\r\n\x1b[31mConnection error: {reason}\x1b[0m\r\n");
                self.surface.write(notice.as_bytes())?;
                if fatal {
                    self.status = SessionStatus::Failed;
                    self.ui.loading = false;
                    self.surface.write(FAILED_NOTICE)?;
                }
            }
            TransportEvent::Output(bytes) => {
                self.surface.write(&bytes)?;
            }
            TransportEvent::Disconnected => {
                info!("session disconnected");
                self.status = SessionStatus::Disconnected;
                self.ui.connected = false;
                self.liveness.on_disconnected();
                // A half-typed line never survives a reconnect.
                self.editor.reset();
                self.last_sent_geometry = None;
                self.surface.write(DISCONNECTED_NOTICE)?;
            }
        }
        Ok(())
    }

    fn handle_host_event(&mut self, event: HostEvent) -> io::Result<Flow> {
        match event {
            HostEvent::Quit => return Ok(Flow::Quit),
            HostEvent::ViewportChanged => self.handle_viewport_change(),
            HostEvent::Key(key) => {
                if is_reconnect_chord(&key)
                    && matches!(
                        self.status,
                        SessionStatus::Disconnected | SessionStatus::Failed
                    )
                {
                    self.reconnect();
                    return Ok(Flow::Reconnect);
                }
                if self.status != SessionStatus::Connected {
                    debug!(?key, status = ?self.status, "dropping key while offline");
                    return Ok(Flow::Continue);
                }
                for editor_event in self.editor.feed(key) {
                    match editor_event {
                        EditorEvent::Echo(bytes) => self.surface.write(&bytes)?,
                        EditorEvent::Line(text) => {
                            self.transport.send(Message::Input { text });
                        }
                    }
                }
            }
        }
        Ok(Flow::Continue)
    }

    fn handle_ping_tick(&mut self) {
        if !self.liveness.should_probe() || !self.transport.is_connected() {
            return;
        }
        self.transport.send(Message::Ping);
        self.liveness.record_probe();
    }

    fn handle_loading_deadline(&mut self) -> io::Result<()> {
        self.ui.loading = false;
        if !self.ui.connected {
            debug!("loading deadline elapsed before a connection was established");
            self.surface.write(SLOW_CONNECT_NOTICE)?;
        }
        Ok(())
    }

    fn handle_viewport_change(&mut self) {
        self.geometry = self.surface.fit();
        self.maybe_send_geometry();
    }

    fn reconnect(&mut self) {
        info!("host requested reconnect");
        self.reconnect_attempt = 0;
        self.status = SessionStatus::Connecting;
        self.ui.loading = true;
        self.transport.connect();
    }

    fn maybe_send_geometry(&mut self) {
        if self.status != SessionStatus::Connected {
            return;
        }
        if self.last_sent_geometry == Some(self.geometry) {
            return;
        }
        self.transport.send(Message::Resize {
            cols: self.geometry.cols,
            rows: self.geometry.rows,
        });
        self.last_sent_geometry = Some(self.geometry);
    }
}

fn is_reconnect_chord(key: &KeyInput) -> bool {
    matches!(key, KeyInput::Control(bytes) if bytes.as_slice() == [CTRL_R])
}
