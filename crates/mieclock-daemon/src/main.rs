//! Mi e-ink Clock Daemon
//!
//! Polls a Xiaomi Mi e-ink clock and exposes its temperature, humidity and
//! battery readings as sensor entities.

mod config;
mod platform;
mod sensors;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use sensors::{Entity, MetricSensor};
use state::EntityState;

#[derive(Parser)]
#[command(name = "mieclockd")]
#[command(about = "Polls a Mi e-ink clock and exposes its readings")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(default_value = "config/default.toml")]
    config: PathBuf,

    /// Run a single refresh round, print entity states as JSON and exit
    #[arg(long)]
    once: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    // Load configuration
    let config = Config::load(&args.config).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", args.config.display());

    let client = platform::build_client(&config)?;
    let sensors = platform::setup_platform(&config, client);
    info!("Exposing {} sensors for {}", sensors.len(), config.mac);

    if args.once {
        let sensors = refresh_all(sensors).await?;
        let states: Vec<EntityState> = sensors
            .iter()
            .map(|sensor| EntityState::from_entity(sensor))
            .collect();
        println!("{}", serde_json::to_string_pretty(&states)?);
        return Ok(());
    }

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        result = poll_loop(sensors, config.scan_interval()) => {
            result?;
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
    }

    Ok(())
}

/// Refreshes every sensor in order on the blocking pool.
async fn refresh_all(mut sensors: Vec<MetricSensor>) -> Result<Vec<MetricSensor>> {
    tokio::task::spawn_blocking(move || {
        for sensor in &mut sensors {
            let outcome = sensor.refresh();
            debug!("Refreshed {} sensor: {}", sensor.metric(), outcome);
        }
        sensors
    })
    .await
    .context("Sensor refresh task failed")
}

async fn poll_loop(mut sensors: Vec<MetricSensor>, interval: Duration) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut reported: Vec<Option<String>> = vec![None; sensors.len()];

    loop {
        ticker.tick().await;
        sensors = refresh_all(sensors).await?;

        for (sensor, last) in sensors.iter().zip(reported.iter_mut()) {
            let state = EntityState::from_entity(sensor);
            let json = serde_json::to_string(&state)?;
            if last.as_deref() == Some(state.state.as_str()) {
                debug!("{}", json);
            } else {
                info!("{}", json);
                *last = Some(state.state);
            }
        }
    }
}
