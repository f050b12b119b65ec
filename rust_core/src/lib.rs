//! Rebound Core - live basketball box scores from the play-by-play stream.
//!
//! This module provides:
//! - Box-score bootstrap (session cookies and team rosters)
//! - Bayeux-over-websocket livestream client with keep-alive and reconnect
//! - Routing of livestream frames to the subscribed game
//! - Play text parsing and the stat rule table
//! - Idempotent per-player stat aggregation

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod stream;

pub use config::{HttpConfig, LivestreamConfig, ReconnectConfig};
pub use error::{BootstrapError, FetchError, PlayWarning, StreamError};
pub use models::{Player, Play, RawPlay, Scoreboard, SportCode, StatCounter, StatLine};
