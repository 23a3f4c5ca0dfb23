//! Wire vocabulary shared with the terminal server. Messages travel as tagged
//! JSON text frames; ordering within a direction is whatever the socket
//! delivers, which is FIFO per connection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// A finished command line from the client.
    Input { text: String },
    /// Raw terminal output from the remote shell. Escape-sequence
    /// interpretation is the renderer's job, not ours.
    Output { data: String },
    /// Negotiated character-grid geometry.
    Resize { cols: u16, rows: u16 },
    /// Fire-and-forget keepalive; no pong is matched.
    Ping,
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn encode(message: &Message) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode(text: &str) -> Result<Message, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The tag strings are the wire contract with the server; changing them is
    // a protocol break, so pin them down.
    #[test]
    fn wire_identity_is_stable() {
        assert_eq!(
            encode(&Message::Input { text: "ls".into() }).unwrap(),
            r#"{"type":"input","text":"ls"}"#
        );
        assert_eq!(
            encode(&Message::Resize { cols: 120, rows: 30 }).unwrap(),
            r#"{"type":"resize","cols":120,"rows":30}"#
        );
        assert_eq!(encode(&Message::Ping).unwrap(), r#"{"type":"ping"}"#);
    }

    #[test]
    fn decodes_output_frames() {
        let message = decode(r#"{"type":"output","data":"total 0\r\n"}"#).unwrap();
        assert_eq!(
            message,
            Message::Output {
                data: "total 0\r\n".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(decode(r#"{"type":"shutdown"}"#).is_err());
        assert!(decode("not json").is_err());
    }
}
