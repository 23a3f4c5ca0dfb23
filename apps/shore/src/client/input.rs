//! Keyboard and resize capture. A dedicated thread polls crossterm events and
//! forwards them into the session's host channel; the async side never blocks
//! on the tty.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

use super::line_editor::KeyInput;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the local host can do to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Key(KeyInput),
    ViewportChanged,
    Quit,
}

pub struct InputListener {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputListener {
    pub fn spawn(events: UnboundedSender<HostEvent>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = shutdown.clone();
        let handle = std::thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) {
                match event::poll(POLL_INTERVAL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(err) => {
                        trace!(error = %err, "input poll failed; stopping listener");
                        break;
                    }
                }
                let host_event = match event::read() {
                    Ok(Event::Key(key)) => map_key(key),
                    Ok(Event::Resize(_, _)) => Some(HostEvent::ViewportChanged),
                    Ok(_) => None,
                    Err(err) => {
                        trace!(error = %err, "input read failed; stopping listener");
                        break;
                    }
                };
                if let Some(host_event) = host_event {
                    if events.send(host_event).is_err() {
                        break;
                    }
                }
            }
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signal the poll loop and wait for it to exit. Must run before the
    /// surface drops so no late event writes to a cooked terminal.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn map_key(key: KeyEvent) -> Option<HostEvent> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if let KeyCode::Char(c) = key.code {
            if c.eq_ignore_ascii_case(&'q') {
                return Some(HostEvent::Quit);
            }
            let byte = (c.to_ascii_uppercase() as u8).wrapping_sub(b'@');
            return Some(HostEvent::Key(KeyInput::Control(vec![byte])));
        }
    }
    let input = match key.code {
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Tab => KeyInput::Control(vec![0x09]),
        KeyCode::Esc => KeyInput::Control(vec![0x1b]),
        KeyCode::Up => KeyInput::Control(b"\x1b[A".to_vec()),
        KeyCode::Down => KeyInput::Control(b"\x1b[B".to_vec()),
        KeyCode::Right => KeyInput::Control(b"\x1b[C".to_vec()),
        KeyCode::Left => KeyInput::Control(b"\x1b[D".to_vec()),
        KeyCode::Home => KeyInput::Control(b"\x1b[H".to_vec()),
        KeyCode::End => KeyInput::Control(b"\x1b[F".to_vec()),
        _ => return None,
    };
    Some(HostEvent::Key(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn plain_characters_map_to_char_input() {
        assert_eq!(
            map_key(press(KeyCode::Char('a'))),
            Some(HostEvent::Key(KeyInput::Char('a')))
        );
        assert_eq!(
            map_key(press(KeyCode::Enter)),
            Some(HostEvent::Key(KeyInput::Enter))
        );
        assert_eq!(
            map_key(press(KeyCode::Backspace)),
            Some(HostEvent::Key(KeyInput::Backspace))
        );
    }

    #[test]
    fn ctrl_q_quits_rather_than_mapping_to_a_byte() {
        assert_eq!(map_key(ctrl('q')), Some(HostEvent::Quit));
        assert_eq!(map_key(ctrl('Q')), Some(HostEvent::Quit));
    }

    #[test]
    fn ctrl_letters_map_to_c0_control_bytes() {
        assert_eq!(
            map_key(ctrl('c')),
            Some(HostEvent::Key(KeyInput::Control(vec![0x03])))
        );
        assert_eq!(
            map_key(ctrl('r')),
            Some(HostEvent::Key(KeyInput::Control(vec![0x12])))
        );
        assert_eq!(
            map_key(ctrl('d')),
            Some(HostEvent::Key(KeyInput::Control(vec![0x04])))
        );
    }

    #[test]
    fn arrow_keys_map_to_csi_sequences() {
        assert_eq!(
            map_key(press(KeyCode::Up)),
            Some(HostEvent::Key(KeyInput::Control(b"\x1b[A".to_vec())))
        );
        assert_eq!(
            map_key(press(KeyCode::Left)),
            Some(HostEvent::Key(KeyInput::Control(b"\x1b[D".to_vec())))
        );
    }

    #[test]
    fn key_release_events_are_ignored() {
        let mut key = press(KeyCode::Char('a'));
        key.kind = KeyEventKind::Release;
        assert_eq!(map_key(key), None);
    }
}
