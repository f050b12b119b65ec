pub mod box_score;
pub mod http;

// Re-export commonly used types
pub use box_score::{parse_scoreboards, BoxScorePage, BoxScoreSource, HttpBoxScoreSource};
pub use http::HttpClient;
