mod config;
mod summary;

use crate::config::Config;
use anyhow::{Context, Result};
use dotenv::dotenv;
use rebound_core::clients::{HttpBoxScoreSource, HttpClient};
use rebound_core::stream::{bootstrap, LivestreamClient, MessageRouter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting Rust Livestream Service...");

    let config = Config::from_env()?;
    info!(
        "Following {} game {} via {}",
        config.sport_code, config.game_id, config.livestream.livestream_url
    );

    // Bootstrap: session cookies and rosters
    let source = HttpBoxScoreSource::new(
        HttpClient::new(config.http.clone()),
        config.livestream.stats_base_url.clone(),
    );
    let boot = bootstrap(&source, config.sport_code, config.game_id)
        .await
        .context("Failed to bootstrap livestream session")?;

    let client = Arc::new(LivestreamClient::new(
        config.livestream.clone(),
        boot.session,
        MessageRouter::new(config.sport_code, config.game_id),
        boot.game,
    ));

    // Summary Loop
    let game = client.game();
    let stats = client.stats();
    let summary_client = client.clone();
    let interval_secs = config.summary_interval_secs;
    tokio::spawn(async move {
        info!("Summary loop started (interval: {}s)", interval_secs);
        loop {
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;

            let lines = {
                let game = game.read();
                let mut lines = summary::scoreboard_lines(game.away());
                lines.extend(summary::scoreboard_lines(game.home()));
                lines
            };
            for line in lines {
                info!("{}", line);
            }

            let snapshot = stats.snapshot();
            info!(
                "Livestream {}: {}",
                summary_client.state(),
                serde_json::to_string(&snapshot).unwrap_or_default()
            );
        }
    });

    // Stream until shutdown
    let stream_client = client.clone();
    let stream_task = tokio::spawn(async move { stream_client.run().await });

    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal");
        }
        Err(err) => {
            error!("Unable to listen for shutdown signal: {}", err);
        }
    }
    stream_task.abort();

    Ok(())
}
