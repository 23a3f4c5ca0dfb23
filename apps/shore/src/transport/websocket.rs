use super::{RetryPolicy, Transport, TransportEvent};
use crate::protocol::{self, Message};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, trace, warn};
use url::Url;

/// WebSocket-backed session transport. Owns the connection task and the retry
/// loop; everything the session layer needs to know arrives as a
/// [`TransportEvent`] on the channel handed to [`WebSocketTransport::new`].
pub struct WebSocketTransport {
    url: Url,
    retry: RetryPolicy,
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: Arc<AtomicBool>,
    outbound: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
    task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl WebSocketTransport {
    pub fn new(
        url: Url,
        retry: RetryPolicy,
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Self {
        Self {
            url,
            retry,
            events,
            connected: Arc::new(AtomicBool::new(false)),
            outbound: Arc::new(Mutex::new(None)),
            task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    fn connect(&self) {
        let mut slot = self.task.lock().unwrap();
        // At most one live connection per session: a restart replaces any
        // in-flight attempt or established socket.
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        self.connected.store(false, Ordering::Release);
        self.outbound.lock().unwrap().take();

        let url = self.url.clone();
        let retry = self.retry;
        let events = self.events.clone();
        let connected = Arc::clone(&self.connected);
        let outbound = Arc::clone(&self.outbound);
        *slot = Some(tokio::spawn(async move {
            run_connection(url, retry, events, connected, outbound).await;
        }));
    }

    fn send(&self, message: Message) {
        if !self.connected.load(Ordering::Acquire) {
            trace!(target: "shore::transport", ?message, "dropping send while disconnected");
            return;
        }
        let guard = self.outbound.lock().unwrap();
        if let Some(tx) = guard.as_ref() {
            // A closed channel means the socket task is mid-teardown; the
            // message is dropped just like any other disconnected send.
            let _ = tx.send(message);
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn disconnect(&mut self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
        self.connected.store(false, Ordering::Release);
        self.outbound.lock().unwrap().take();
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }
}

async fn run_connection(
    url: Url,
    retry: RetryPolicy,
    events: mpsc::UnboundedSender<TransportEvent>,
    connected: Arc<AtomicBool>,
    outbound: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
) {
    for attempt in 1..=retry.attempts.max(1) {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                debug!(target: "shore::transport", %url, attempt, "websocket connected");
                pump(stream, &events, &connected, &outbound).await;
                // No automatic reconnect after an established connection
                // drops; only the initial connect loop retries.
                return;
            }
            Err(err) => {
                let fatal = attempt == retry.attempts;
                warn!(
                    target: "shore::transport",
                    %url,
                    attempt,
                    fatal,
                    error = %err,
                    "websocket connect failed"
                );
                if events
                    .send(TransportEvent::ConnectError {
                        reason: err.to_string(),
                        attempt,
                        fatal,
                    })
                    .is_err()
                {
                    // Session is gone; stop retrying against nobody.
                    return;
                }
                if !fatal {
                    sleep(retry.delay).await;
                }
            }
        }
    }
}

async fn pump(
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    events: &mpsc::UnboundedSender<TransportEvent>,
    connected: &Arc<AtomicBool>,
    outbound: &Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
) {
    let (mut sink, mut source) = stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    *outbound.lock().unwrap() = Some(tx);
    connected.store(true, Ordering::Release);

    if events.send(TransportEvent::Connected).is_ok() {
        loop {
            tokio::select! {
                queued = rx.recv() => match queued {
                    Some(message) => {
                        let text = match protocol::encode(&message) {
                            Ok(text) => text,
                            Err(err) => {
                                warn!(target: "shore::transport", error = %err, "failed to encode message");
                                continue;
                            }
                        };
                        if sink.send(WsMessage::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                frame = source.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => match protocol::decode(&text) {
                        Ok(Message::Output { data }) => {
                            if events.send(TransportEvent::Output(data.into_bytes())).is_err() {
                                break;
                            }
                        }
                        Ok(other) => {
                            trace!(target: "shore::transport", ?other, "ignoring non-output message");
                        }
                        Err(err) => {
                            debug!(target: "shore::transport", error = %err, "discarding malformed frame");
                        }
                    },
                    // Some servers ship output as binary frames; pass the raw
                    // bytes straight through to the renderer.
                    Some(Ok(WsMessage::Binary(data))) => {
                        if events.send(TransportEvent::Output(data)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    connected.store(false, Ordering::Release);
    outbound.lock().unwrap().take();
    let _ = events.send(TransportEvent::Disconnected);
}
