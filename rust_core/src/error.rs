//! Error types for the livestream pipeline.
//!
//! Only [`BootstrapError`] is fatal. Everything raised once the stream is
//! running is logged and recovered from, either by skipping the offending
//! frame or by reconnecting.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} still failing after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to fetch box score: {0}")]
    Fetch(#[from] FetchError),

    #[error("box score roster unavailable: {0}")]
    Roster(String),
}

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    #[error("handshake rejected: {0}")]
    HandshakeRejected(String),

    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    #[error("failed to encode control message: {0}")]
    Encode(String),

    #[error("invalid livestream request: {0}")]
    InvalidRequest(String),
}

impl StreamError {
    /// Connection-level failures end the current connection and trigger a
    /// reconnect; a malformed frame only costs that frame.
    pub fn ends_connection(&self) -> bool {
        !matches!(self, StreamError::MalformedFrame(_))
    }
}

/// Non-fatal conditions raised while attributing plays
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayWarning {
    #[error("unresolved play reference {player} ({team}) in play {play_id}")]
    UnresolvedPlayReference {
        play_id: u64,
        player: String,
        team: String,
    },

    #[error("unmatched play text for {player}: {text}")]
    UnmatchedPlayText { player: String, text: String },
}
