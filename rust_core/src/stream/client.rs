//! Bayeux-over-websocket livestream client.
//!
//! Each connection runs handshake -> connect -> subscribe, then a keep-alive
//! loop and the frame reader race in one `select!` until either ends. The
//! outer loop reopens the transport with backoff, forever.

use crate::config::LivestreamConfig;
use crate::error::{PlayWarning, StreamError};
use crate::models::message::HandshakeReply;
use crate::models::{MessageBody, MessageIds, ProtocolMessage, SessionContext};
use crate::stream::aggregator::{Game, PlayOutcome};
use crate::stream::router::MessageRouter;
use crate::stream::state::{ProtocolState, StreamStats};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, COOKIE, USER_AGENT};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Serialized writer for one connection.
///
/// The id is drawn while the sink lock is held, so ids hit the wire in order.
struct Outbox {
    sink: Mutex<WsSink>,
    ids: MessageIds,
    ext: Map<String, Value>,
}

impl Outbox {
    fn new(sink: WsSink, ids: MessageIds, ext: Map<String, Value>) -> Self {
        Self {
            sink: Mutex::new(sink),
            ids,
            ext,
        }
    }

    async fn send(&self, body: MessageBody) -> Result<(), StreamError> {
        let mut sink = self.sink.lock().await;
        let message = ProtocolMessage::new(&self.ids, self.ext.clone(), body);
        let text = message
            .to_json()
            .map_err(|e| StreamError::Encode(e.to_string()))?;
        debug!("Sending {} (id {})", message.channel, message.id);
        sink.send(Message::Text(text)).await?;
        Ok(())
    }
}

/// Failure count after a connection ends; reaching `Streaming` starts the
/// count over so the next retry waits only the base delay.
fn failures_after(previous: u32, streamed: bool) -> u32 {
    if streamed {
        1
    } else {
        previous.saturating_add(1)
    }
}

/// Client id from the first element of a handshake answer
fn parse_handshake_ack(frame: &str) -> Result<String, StreamError> {
    let malformed = |e: serde_json::Error| {
        StreamError::HandshakeRejected(format!("malformed acknowledgement: {e}"))
    };

    let value: Value = serde_json::from_str(frame).map_err(malformed)?;
    let first = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        obj @ Value::Object(_) => obj,
        _ => {
            return Err(StreamError::HandshakeRejected(
                "empty acknowledgement".to_string(),
            ))
        }
    };

    let reply: HandshakeReply = serde_json::from_value(first).map_err(malformed)?;
    match reply.client_id {
        Some(client_id) if reply.successful && !client_id.is_empty() => Ok(client_id),
        _ => Err(StreamError::HandshakeRejected(
            reply
                .error
                .unwrap_or_else(|| "server reported unsuccessful handshake".to_string()),
        )),
    }
}

pub struct LivestreamClient {
    config: LivestreamConfig,
    session: SessionContext,
    router: MessageRouter,
    game: Arc<RwLock<Game>>,
    ids: MessageIds,
    stats: Arc<StreamStats>,
    state: RwLock<ProtocolState>,
}

impl LivestreamClient {
    pub fn new(
        config: LivestreamConfig,
        session: SessionContext,
        router: MessageRouter,
        game: Game,
    ) -> Self {
        Self {
            config,
            session,
            router,
            game: Arc::new(RwLock::new(game)),
            ids: MessageIds::new(),
            stats: Arc::new(StreamStats::default()),
            state: RwLock::new(ProtocolState::Disconnected),
        }
    }

    pub fn state(&self) -> ProtocolState {
        *self.state.read()
    }

    /// Shared handle to the game ledger; readers must not hold the lock
    /// across an await.
    pub fn game(&self) -> Arc<RwLock<Game>> {
        self.game.clone()
    }

    pub fn stats(&self) -> Arc<StreamStats> {
        self.stats.clone()
    }

    fn set_state(&self, next: ProtocolState) {
        let prev = std::mem::replace(&mut *self.state.write(), next);
        if prev != next {
            debug!("Livestream state {} -> {}", prev, next);
        }
    }

    /// Stream the game until the task is dropped.
    ///
    /// Connection failures never escape; they are logged and the connection
    /// is reopened after a backoff that resets once a session streams.
    pub async fn run(&self) {
        let mut consecutive_failures: u32 = 0;

        loop {
            self.stats.connection_attempts.fetch_add(1, Ordering::Relaxed);
            let reason = self.run_connection().await;
            let streamed = self.state().is_streaming();
            self.set_state(ProtocolState::Disconnected);

            consecutive_failures = failures_after(consecutive_failures, streamed);
            let delay = self.config.reconnect.calculate_delay(consecutive_failures);

            if streamed {
                warn!("Livestream connection lost: {}. Reconnecting in {:?}", reason, delay);
            } else {
                error!(
                    "Failed to open livestream (attempt {}): {}. Retrying in {:?}...",
                    consecutive_failures, reason, delay
                );
            }
            tokio::time::sleep(delay).await;
        }
    }

    async fn open(&self) -> Result<WsStream, StreamError> {
        let mut request = self.config.livestream_url.as_str().into_client_request()?;
        let headers = request.headers_mut();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .map_err(|e| StreamError::InvalidRequest(format!("user agent: {e}")))?,
        );
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.session.cookie())
                .map_err(|e| StreamError::InvalidRequest(format!("cookie: {e}")))?,
        );

        let (ws, response) = connect_async(request).await?;
        debug!(
            "Websocket open to {} ({})",
            self.config.livestream_url,
            response.status()
        );
        Ok(ws)
    }

    /// One connection, start to finish. Returns why it ended.
    async fn run_connection(&self) -> StreamError {
        self.set_state(ProtocolState::Handshaking);
        let ws = match self.open().await {
            Ok(ws) => ws,
            Err(e) => return e,
        };
        let (sink, mut source) = ws.split();
        let outbox = Outbox::new(sink, self.ids.clone(), self.session.message_ext());

        let client_id = match self.subscribe(&outbox, &mut source).await {
            Ok(client_id) => client_id,
            Err(e) => return e,
        };

        self.set_state(ProtocolState::Streaming);
        self.stats
            .sessions_established
            .fetch_add(1, Ordering::Relaxed);
        info!(
            "Streaming {} as client {}",
            self.router.channel(),
            client_id
        );

        tokio::select! {
            reason = self.keep_alive(&outbox, &client_id) => reason,
            reason = self.process_frames(&mut source) => reason,
        }
    }

    /// Handshake, connect and subscribe; yields the server-assigned client id
    async fn subscribe(
        &self,
        outbox: &Outbox,
        source: &mut WsSource,
    ) -> Result<String, StreamError> {
        outbox.send(MessageBody::handshake()).await?;
        self.set_state(ProtocolState::AwaitingHandshakeAck);

        let ack = next_text(source).await?;
        let client_id = parse_handshake_ack(&ack)?;

        outbox.send(MessageBody::connect(client_id.as_str())).await?;
        self.set_state(ProtocolState::Connected);

        self.set_state(ProtocolState::Subscribing);
        outbox
            .send(MessageBody::subscribe(client_id.as_str(), self.router.channel()))
            .await?;

        Ok(client_id)
    }

    async fn keep_alive(&self, outbox: &Outbox, client_id: &str) -> StreamError {
        loop {
            tokio::time::sleep(self.config.refresh_interval).await;
            if let Err(e) = outbox.send(MessageBody::connect(client_id)).await {
                return e;
            }
        }
    }

    async fn process_frames(&self, source: &mut WsSource) -> StreamError {
        while let Some(message) = source.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if let Err(e) = self.handle_frame(&text) {
                        if e.ends_connection() {
                            return e;
                        }
                        self.stats.malformed_frames.fetch_add(1, Ordering::Relaxed);
                        warn!("Skipping frame: {}", e);
                    }
                }
                Ok(Message::Close(frame)) => {
                    let reason = frame
                        .map(|f| format!("{} {}", f.code, f.reason))
                        .unwrap_or_else(|| "close frame".to_string());
                    return StreamError::ConnectionClosed(reason);
                }
                Ok(_) => {}
                Err(e) => return e.into(),
            }
        }
        StreamError::ConnectionClosed("stream ended".to_string())
    }

    fn handle_frame(&self, text: &str) -> Result<(), StreamError> {
        self.stats.record_frame();

        let plays = self.router.decode(text)?;
        if plays.is_empty() {
            return Ok(());
        }

        let mut game = self.game.write();
        for play in &plays {
            self.stats.plays_forwarded.fetch_add(1, Ordering::Relaxed);
            for outcome in game.submit(play) {
                let counter = match outcome {
                    PlayOutcome::Applied { .. } => &self.stats.plays_applied,
                    PlayOutcome::Duplicate { .. } => &self.stats.duplicate_plays,
                    PlayOutcome::Warning(PlayWarning::UnresolvedPlayReference { .. }) => {
                        &self.stats.unresolved_references
                    }
                    PlayOutcome::Warning(PlayWarning::UnmatchedPlayText { .. }) => {
                        &self.stats.unmatched_plays
                    }
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

/// Next text frame, skipping control frames
async fn next_text(source: &mut WsSource) -> Result<String, StreamError> {
    while let Some(message) = source.next().await {
        match message? {
            Message::Text(text) => return Ok(text),
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err(StreamError::ConnectionClosed(
        "closed before handshake acknowledgement".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_ack_accepted() {
        let ack = r#"[{"channel":"/meta/handshake","successful":true,"clientId":"abc123","version":"1.0"}]"#;
        assert_eq!(parse_handshake_ack(ack).unwrap(), "abc123");

        let single = r#"{"channel":"/meta/handshake","successful":true,"clientId":"xyz"}"#;
        assert_eq!(parse_handshake_ack(single).unwrap(), "xyz");
    }

    #[test]
    fn test_handshake_ack_rejected() {
        let denied = r#"[{"channel":"/meta/handshake","successful":false,"error":"403::denied"}]"#;
        match parse_handshake_ack(denied) {
            Err(StreamError::HandshakeRejected(reason)) => assert_eq!(reason, "403::denied"),
            other => panic!("unexpected {:?}", other),
        }

        let no_id = r#"[{"channel":"/meta/handshake","successful":true}]"#;
        assert!(matches!(
            parse_handshake_ack(no_id),
            Err(StreamError::HandshakeRejected(_))
        ));
    }

    #[test]
    fn test_malformed_ack_ends_attempt() {
        for frame in ["not json", "[]", "42"] {
            let err = parse_handshake_ack(frame).unwrap_err();
            assert!(matches!(err, StreamError::HandshakeRejected(_)), "{frame}");
            assert!(err.ends_connection());
        }
    }

    #[test]
    fn test_streamed_connection_resets_backoff() {
        let reconnect = crate::config::ReconnectConfig {
            base_delay_ms: 100,
            max_delay_ms: 10_000,
            jitter_pct: 0.0,
        };

        let mut failures = 0;
        for _ in 0..4 {
            failures = failures_after(failures, false);
        }
        assert_eq!(failures, 4);
        assert_eq!(reconnect.calculate_delay(failures), std::time::Duration::from_millis(800));

        failures = failures_after(failures, true);
        assert_eq!(failures, 1);
        assert_eq!(reconnect.calculate_delay(failures), std::time::Duration::from_millis(100));

        assert_eq!(failures_after(u32::MAX, false), u32::MAX);
    }

    fn idle_client() -> LivestreamClient {
        LivestreamClient::new(
            LivestreamConfig::default(),
            SessionContext::new("u", "s"),
            MessageRouter::for_channel("/MBB/box_score/1"),
            Game::new(
                crate::models::Scoreboard::new("A", Vec::new()),
                crate::models::Scoreboard::new("B", Vec::new()),
            ),
        )
    }

    #[test]
    fn test_initial_state() {
        let client = idle_client();
        assert_eq!(client.state(), ProtocolState::Disconnected);
        assert_eq!(client.stats().snapshot().frames_received, 0);
    }

    #[test]
    fn test_malformed_frame_does_not_end_connection() {
        let client = idle_client();
        let err = client.handle_frame("{not json").unwrap_err();
        assert!(matches!(err, StreamError::MalformedFrame(_)));
        assert!(!err.ends_connection());

        assert!(client.handle_frame(r#"[{"channel":"/meta/connect","successful":true}]"#).is_ok());
        assert_eq!(client.stats().snapshot().frames_received, 2);
    }
}
