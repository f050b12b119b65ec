//! Inbound frame routing.
//!
//! A frame is a JSON array of Bayeux messages. Only messages on the game's
//! box-score channel that carry a play payload are of interest; everything
//! else (meta replies, chart telemetry, other channels) is dropped here.

use crate::error::StreamError;
use crate::models::{RawPlay, SportCode};
use serde_json::{Map, Value};

const PLAY_KEY_PREFIX: &str = "play_";
const EXCLUDED_KEYS: [&str; 2] = ["chart", "shot_chart"];

/// Channel the livestream publishes a game's box score on
pub fn box_score_channel(sport_code: SportCode, game_id: u64) -> String {
    format!("/{}/box_score/{}", sport_code, game_id)
}

#[derive(Debug, Clone)]
pub struct MessageRouter {
    channel: String,
}

impl MessageRouter {
    pub fn new(sport_code: SportCode, game_id: u64) -> Self {
        Self::for_channel(box_score_channel(sport_code, game_id))
    }

    pub fn for_channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Decode a text frame and pull out its play submissions
    pub fn decode(&self, frame: &str) -> Result<Vec<RawPlay>, StreamError> {
        let value: Value = serde_json::from_str(frame)?;
        Ok(self.route(&value))
    }

    /// Play submissions carried by an already-decoded frame, ordered by play id
    pub fn route(&self, frame: &Value) -> Vec<RawPlay> {
        let items: &[Value] = match frame {
            Value::Array(items) => items,
            Value::Object(_) => std::slice::from_ref(frame),
            _ => return Vec::new(),
        };

        let mut plays: Vec<RawPlay> = items
            .iter()
            .filter_map(|item| self.relevant_payload(item))
            .flat_map(extract_plays)
            .collect();
        plays.sort_by_key(|p| p.play_id);
        plays
    }

    fn relevant_payload<'a>(&self, item: &'a Value) -> Option<&'a Map<String, Value>> {
        let object = item.as_object()?;
        if object.get("channel").and_then(Value::as_str) != Some(self.channel.as_str()) {
            return None;
        }
        if EXCLUDED_KEYS.iter().any(|k| object.contains_key(*k)) {
            return None;
        }
        let payload = object.get("data")?.as_object()?;
        if payload.is_empty() || EXCLUDED_KEYS.iter().any(|k| payload.contains_key(*k)) {
            return None;
        }
        Some(payload)
    }
}

/// `play_<digits>` keys only; `play_text_<id>` and friends are siblings
fn play_id_from_key(key: &str) -> Option<u64> {
    let digits = key.strip_prefix(PLAY_KEY_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn extract_plays(payload: &Map<String, Value>) -> Vec<RawPlay> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let play_id = play_id_from_key(key)?;
            // Siblings may sit beside the play key or inside its value
            let scope = value.as_object();
            let lookup = move |field: &str| {
                let key = format!("{}_{}", field, play_id);
                scope
                    .and_then(|s| s.get(&key))
                    .or_else(|| payload.get(&key))
            };

            Some(RawPlay {
                play_id,
                text: lookup("play_text").map(value_to_string).unwrap_or_default(),
                clock: lookup("clock").map(value_to_string).unwrap_or_default(),
                period: lookup("period").and_then(value_to_period).unwrap_or(0),
            })
        })
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_to_period(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
