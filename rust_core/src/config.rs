//! Configuration constants and environment loading.
//!
//! Every setting has a default and can be overridden through the
//! environment; see each `from_env` for the variable names.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Box-score pages live under `{base}/{game_id}/box_score`
pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.ncaa.org/contests";

/// Bayeux websocket endpoint
pub const DEFAULT_LIVESTREAM_URL: &str = "wss://livestream.ncaa.org/stream";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Interval between keep-alive connect messages
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 25;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_RETRIES: u32 = 3;
pub const DEFAULT_HTTP_BACKOFF_FACTOR: f64 = 0.3;
pub const DEFAULT_HTTP_RETRY_STATUSES: [u16; 3] = [500, 502, 504];

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Retry behaviour for the box-score fetch
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub retries: u32,
    pub backoff_factor: f64,
    pub retry_statuses: Vec<u16>,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            retries: DEFAULT_HTTP_RETRIES,
            backoff_factor: DEFAULT_HTTP_BACKOFF_FACTOR,
            retry_statuses: DEFAULT_HTTP_RETRY_STATUSES.to_vec(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn from_env() -> Self {
        let retry_statuses = env::var("HTTP_RETRY_STATUSES")
            .ok()
            .map(|v| {
                v.split(',')
                    .filter_map(|s| s.trim().parse::<u16>().ok())
                    .collect::<Vec<_>>()
            })
            .filter(|statuses| !statuses.is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_RETRY_STATUSES.to_vec());

        Self {
            timeout: Duration::from_secs(env_or("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)),
            retries: env_or("HTTP_RETRIES", DEFAULT_HTTP_RETRIES),
            backoff_factor: Some(env_or("HTTP_BACKOFF_FACTOR", DEFAULT_HTTP_BACKOFF_FACTOR))
                .filter(|f| f.is_finite())
                .unwrap_or(DEFAULT_HTTP_BACKOFF_FACTOR)
                .max(0.0),
            retry_statuses,
            user_agent: env::var("LIVESTREAM_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        }
    }

    /// Delay before retry number `attempt` (1-based): `factor * 2^(attempt-1)` seconds.
    ///
    /// Saturates at `Duration::MAX` when the product overflows.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }
}

/// Endpoints and pacing for the livestream session
#[derive(Debug, Clone, PartialEq)]
pub struct LivestreamConfig {
    pub stats_base_url: String,
    pub livestream_url: String,
    pub user_agent: String,
    pub refresh_interval: Duration,
    pub reconnect: ReconnectConfig,
}

impl Default for LivestreamConfig {
    fn default() -> Self {
        Self {
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            livestream_url: DEFAULT_LIVESTREAM_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl LivestreamConfig {
    pub fn from_env() -> Self {
        Self {
            stats_base_url: env::var("STATS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_STATS_BASE_URL.to_string()),
            livestream_url: env::var("LIVESTREAM_URL")
                .unwrap_or_else(|_| DEFAULT_LIVESTREAM_URL.to_string()),
            user_agent: env::var("LIVESTREAM_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            refresh_interval: Duration::from_secs(
                env_or("LIVESTREAM_REFRESH_SECS", DEFAULT_REFRESH_INTERVAL_SECS).max(1),
            ),
            reconnect: ReconnectConfig::from_env(),
        }
    }
}

/// Backoff between failed livestream connection attempts
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Base delay in milliseconds for exponential backoff (default: 1000ms)
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (default: 60000ms = 1 minute)
    pub max_delay_ms: u64,
    /// Jitter percentage to prevent thundering herd (default: 0.1 = ±10%)
    pub jitter_pct: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 1000,
            max_delay_ms: 60000,
            jitter_pct: 0.1,
        }
    }
}

impl ReconnectConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_delay_ms: env_or("STREAM_RECONNECT_BASE_DELAY_MS", defaults.base_delay_ms),
            max_delay_ms: env_or("STREAM_RECONNECT_MAX_DELAY_MS", defaults.max_delay_ms),
            jitter_pct: env_or("STREAM_RECONNECT_JITTER_PCT", defaults.jitter_pct).clamp(0.0, 1.0),
        }
    }

    /// Calculate exponential backoff delay with jitter
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay_ms as f64;
        let exponential_ms = base_ms * 2f64.powi(attempt.saturating_sub(1).min(32) as i32);
        let capped_ms = exponential_ms.min(self.max_delay_ms as f64);

        // Add jitter: ±jitter_pct%
        let jitter_range = capped_ms * self.jitter_pct;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_ms = (capped_ms + jitter).max(0.0);

        Duration::from_millis(final_ms as u64)
    }
}
