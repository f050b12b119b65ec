//! Bayeux control messages sent to the livestream server.
//!
//! Every message shares an envelope (`ext`, `channel`, `id`); the variant
//! decides the channel and the extra fields. Ids come from a [`MessageIds`]
//! counter owned by whoever sends the messages.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const HANDSHAKE_CHANNEL: &str = "/meta/handshake";
pub const CONNECT_CHANNEL: &str = "/meta/connect";
pub const SUBSCRIBE_CHANNEL: &str = "/meta/subscribe";

pub const BAYEUX_VERSION: &str = "1.0";
pub const WEBSOCKET_CONNECTION_TYPE: &str = "websocket";

pub const SUPPORTED_CONNECTION_TYPES: [&str; 5] = [
    "websocket",
    "eventsource",
    "long-polling",
    "cross-origin-long-polling",
    "callback-polling",
];

/// Monotonic message id source.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct MessageIds {
    next: Arc<AtomicU64>,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// Variant-specific part of a control message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    Handshake {
        version: String,
        #[serde(rename = "supportedConnectionTypes")]
        supported_connection_types: Vec<String>,
    },
    Connect {
        #[serde(rename = "clientId")]
        client_id: String,
        #[serde(rename = "connectionType")]
        connection_type: String,
    },
    Subscribe {
        #[serde(rename = "clientId")]
        client_id: String,
        subscription: String,
    },
}

impl MessageBody {
    pub fn handshake() -> Self {
        MessageBody::Handshake {
            version: BAYEUX_VERSION.to_string(),
            supported_connection_types: SUPPORTED_CONNECTION_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn connect(client_id: impl Into<String>) -> Self {
        MessageBody::Connect {
            client_id: client_id.into(),
            connection_type: WEBSOCKET_CONNECTION_TYPE.to_string(),
        }
    }

    pub fn subscribe(client_id: impl Into<String>, subscription: impl Into<String>) -> Self {
        MessageBody::Subscribe {
            client_id: client_id.into(),
            subscription: subscription.into(),
        }
    }

    pub fn channel(&self) -> &'static str {
        match self {
            MessageBody::Handshake { .. } => HANDSHAKE_CHANNEL,
            MessageBody::Connect { .. } => CONNECT_CHANNEL,
            MessageBody::Subscribe { .. } => SUBSCRIBE_CHANNEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMessage {
    pub ext: Map<String, Value>,
    pub channel: String,
    pub id: String,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl ProtocolMessage {
    /// Build a message, drawing its id from `ids`
    pub fn new(ids: &MessageIds, ext: Map<String, Value>, body: MessageBody) -> Self {
        Self {
            ext,
            channel: body.channel().to_string(),
            id: ids.next_id().to_string(),
            body,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Server reply to a handshake, the first element of the answer frame
#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeReply {
    #[serde(default)]
    pub successful: bool,
    #[serde(rename = "clientId")]
    pub client_id: Option<String>,
    pub error: Option<String>,
}
