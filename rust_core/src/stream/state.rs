//! Connection state and stream health counters.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Where a livestream connection is in the Bayeux exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolState {
    Disconnected,
    Handshaking,
    AwaitingHandshakeAck,
    Connected,
    Subscribing,
    Streaming,
}

impl ProtocolState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, ProtocolState::Streaming)
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolState::Disconnected => write!(f, "disconnected"),
            ProtocolState::Handshaking => write!(f, "handshaking"),
            ProtocolState::AwaitingHandshakeAck => write!(f, "awaiting_handshake_ack"),
            ProtocolState::Connected => write!(f, "connected"),
            ProtocolState::Subscribing => write!(f, "subscribing"),
            ProtocolState::Streaming => write!(f, "streaming"),
        }
    }
}

/// Statistics for monitoring livestream health
#[derive(Debug, Default)]
pub struct StreamStats {
    /// Text frames received across all connections
    pub frames_received: AtomicU64,
    /// Frames that were not valid JSON
    pub malformed_frames: AtomicU64,
    /// Play submissions handed to the aggregator
    pub plays_forwarded: AtomicU64,
    /// Player references that changed a stat line or play log
    pub plays_applied: AtomicU64,
    /// References already present in the player's play log
    pub duplicate_plays: AtomicU64,
    pub unresolved_references: AtomicU64,
    pub unmatched_plays: AtomicU64,
    /// Transport connections opened, successful or not
    pub connection_attempts: AtomicU64,
    /// Connections that reached `Streaming`
    pub sessions_established: AtomicU64,
    /// Unix millis of the last frame, 0 if none yet
    last_frame_ms: AtomicI64,
}

impl StreamStats {
    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
        self.last_frame_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Take a snapshot of current statistics
    pub fn snapshot(&self) -> StreamStatsSnapshot {
        let last_frame_ms = self.last_frame_ms.load(Ordering::Relaxed);
        StreamStatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            malformed_frames: self.malformed_frames.load(Ordering::Relaxed),
            plays_forwarded: self.plays_forwarded.load(Ordering::Relaxed),
            plays_applied: self.plays_applied.load(Ordering::Relaxed),
            duplicate_plays: self.duplicate_plays.load(Ordering::Relaxed),
            unresolved_references: self.unresolved_references.load(Ordering::Relaxed),
            unmatched_plays: self.unmatched_plays.load(Ordering::Relaxed),
            connection_attempts: self.connection_attempts.load(Ordering::Relaxed),
            reconnects: self
                .sessions_established
                .load(Ordering::Relaxed)
                .saturating_sub(1),
            last_frame_at: (last_frame_ms > 0)
                .then(|| Utc.timestamp_millis_opt(last_frame_ms).single())
                .flatten(),
        }
    }
}

/// Snapshot of stream statistics at a point in time
#[derive(Debug, Clone, Serialize)]
pub struct StreamStatsSnapshot {
    pub frames_received: u64,
    pub malformed_frames: u64,
    pub plays_forwarded: u64,
    pub plays_applied: u64,
    pub duplicate_plays: u64,
    pub unresolved_references: u64,
    pub unmatched_plays: u64,
    pub connection_attempts: u64,
    /// Sessions established after the first one
    pub reconnects: u64,
    pub last_frame_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(ProtocolState::AwaitingHandshakeAck.to_string(), "awaiting_handshake_ack");
        assert!(ProtocolState::Streaming.is_streaming());
        assert!(!ProtocolState::Subscribing.is_streaming());
    }

    #[test]
    fn test_snapshot() {
        let stats = StreamStats::default();
        assert!(stats.snapshot().last_frame_at.is_none());

        stats.record_frame();
        stats.record_frame();
        stats.malformed_frames.fetch_add(1, Ordering::Relaxed);

        let snap = stats.snapshot();
        assert_eq!(snap.frames_received, 2);
        assert_eq!(snap.malformed_frames, 1);
        assert!(snap.last_frame_at.is_some());
        assert_eq!(snap.reconnects, 0);

        stats.sessions_established.fetch_add(3, Ordering::Relaxed);
        assert_eq!(stats.snapshot().reconnects, 2);
    }
}
