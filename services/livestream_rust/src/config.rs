use anyhow::{Context, Result};
use rebound_core::{HttpConfig, LivestreamConfig, SportCode};
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub sport_code: SportCode,
    pub game_id: u64,
    pub summary_interval_secs: u64,
    pub http: HttpConfig,
    pub livestream: LivestreamConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let sport_code = env::var("SPORT_CODE")
            .context("SPORT_CODE must be set (MBB or WBB)")?
            .parse::<SportCode>()
            .map_err(anyhow::Error::msg)?;
        let game_id = env::var("GAME_ID")
            .context("GAME_ID must be set")?
            .trim()
            .parse::<u64>()
            .context("GAME_ID must be a numeric contest id")?;

        Ok(Self {
            sport_code,
            game_id,
            summary_interval_secs: env::var("SUMMARY_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60)
                .max(1),
            http: HttpConfig::from_env(),
            livestream: LivestreamConfig::from_env(),
        })
    }
}
