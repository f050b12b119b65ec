use serde_json::{json, Map, Value};

/// Session identity obtained at bootstrap.
///
/// Built once and shared read-only by every connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: String,
    stats_session: String,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, stats_session: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            stats_session: stats_session.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn stats_session(&self) -> &str {
        &self.stats_session
    }

    /// Cookie header value presented when opening the websocket
    pub fn cookie(&self) -> String {
        format!(
            "livestream_user_id={}; _stats_session={}",
            self.user_id, self.stats_session
        )
    }

    /// `ext` payload attached to every control message
    pub fn message_ext(&self) -> Map<String, Value> {
        let mut ext = Map::new();
        ext.insert("livestream_token".to_string(), json!(""));
        ext.insert("livestream_user_id".to_string(), json!(self.user_id));
        ext
    }
}
