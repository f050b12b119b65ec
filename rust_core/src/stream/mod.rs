//! Livestream pipeline: bootstrap, protocol client, routing, parsing and
//! aggregation.

pub mod aggregator;
pub mod bootstrap;
pub mod client;
pub mod parser;
pub mod router;
pub mod rules;
pub mod state;

pub use aggregator::{Game, PlayOutcome, Side};
pub use bootstrap::{bootstrap, extract_session_tokens, Bootstrap};
pub use client::LivestreamClient;
pub use parser::{parse_references, split_sub_events, PlayReference};
pub use router::{box_score_channel, MessageRouter};
pub use rules::{StatRule, StatRules};
pub use state::{ProtocolState, StreamStats, StreamStatsSnapshot};
