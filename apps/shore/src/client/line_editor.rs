//! Local line editing with immediate echo. The editor only tracks the end of
//! the line — there is no cursor position, so unhandled keys (arrows and the
//! like) pass straight through to the display without touching the buffer.

/// One keystroke, as the session loop sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Enter,
    Backspace,
    /// Unhandled control bytes (arrows, tabs, Ctrl-<x>), passed through
    /// verbatim.
    Control(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// Bytes to display locally, ahead of any remote echo.
    Echo(Vec<u8>),
    /// A finished command line, ready to send upstream.
    Line(String),
}

#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, key: KeyInput) -> Vec<EditorEvent> {
        match key {
            KeyInput::Char(c) => {
                self.buffer.push(c);
                vec![EditorEvent::Echo(c.to_string().into_bytes())]
            }
            KeyInput::Enter => {
                let line = std::mem::take(&mut self.buffer);
                vec![EditorEvent::Line(line), EditorEvent::Echo(b"\r\n".to_vec())]
            }
            KeyInput::Backspace => {
                // Erase-in-place: move left, blank, move left. Nothing happens
                // on an empty buffer, so this can never underflow.
                if self.buffer.pop().is_some() {
                    vec![EditorEvent::Echo(b"\x08 \x08".to_vec())]
                } else {
                    Vec::new()
                }
            }
            KeyInput::Control(bytes) => vec![EditorEvent::Echo(bytes)],
        }
    }

    /// Discard the unsent line. Called when the connection drops — a buffer in
    /// flight is never resent.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    pub fn pending(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_of(events: &[EditorEvent]) -> Option<&str> {
        events.iter().find_map(|event| match event {
            EditorEvent::Line(line) => Some(line.as_str()),
            _ => None,
        })
    }

    #[test]
    fn submit_yields_typed_characters_in_order() {
        let mut editor = LineEditor::new();
        for c in "echo hello".chars() {
            let events = editor.feed(KeyInput::Char(c));
            assert_eq!(
                events,
                vec![EditorEvent::Echo(c.to_string().into_bytes())],
                "each character echoes itself"
            );
        }
        let events = editor.feed(KeyInput::Enter);
        assert_eq!(line_of(&events), Some("echo hello"));
        assert!(events.contains(&EditorEvent::Echo(b"\r\n".to_vec())));
        assert_eq!(editor.pending(), "");
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_no_op() {
        let mut editor = LineEditor::new();
        assert!(editor.feed(KeyInput::Backspace).is_empty());
        assert_eq!(editor.pending(), "");
    }

    #[test]
    fn typo_correction_scenario() {
        // l, s, backspace, s, enter: "" -> "l" -> "ls" -> "l" -> "ls"
        let mut editor = LineEditor::new();
        editor.feed(KeyInput::Char('l'));
        assert_eq!(editor.pending(), "l");
        editor.feed(KeyInput::Char('s'));
        assert_eq!(editor.pending(), "ls");
        let events = editor.feed(KeyInput::Backspace);
        assert_eq!(events, vec![EditorEvent::Echo(b"\x08 \x08".to_vec())]);
        assert_eq!(editor.pending(), "l");
        editor.feed(KeyInput::Char('s'));
        assert_eq!(editor.pending(), "ls");
        let events = editor.feed(KeyInput::Enter);
        assert_eq!(line_of(&events), Some("ls"));
    }

    #[test]
    fn control_bytes_pass_through_without_buffer_mutation() {
        let mut editor = LineEditor::new();
        editor.feed(KeyInput::Char('x'));
        let events = editor.feed(KeyInput::Control(b"\x1b[A".to_vec()));
        assert_eq!(events, vec![EditorEvent::Echo(b"\x1b[A".to_vec())]);
        assert_eq!(editor.pending(), "x");
    }

    #[test]
    fn reset_discards_the_in_flight_line() {
        let mut editor = LineEditor::new();
        editor.feed(KeyInput::Char('r'));
        editor.feed(KeyInput::Char('m'));
        editor.reset();
        assert_eq!(editor.pending(), "");
        let events = editor.feed(KeyInput::Enter);
        assert_eq!(line_of(&events), Some(""));
    }
}
