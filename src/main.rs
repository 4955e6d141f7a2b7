//! Sensorwatch
//!
//! Run with: cargo run -- [CONFIG]
//!
//! The config path is the first argument, else SENSORWATCH_CONFIG, else
//! `sensorwatch.toml` in the working directory.
//!
//! Environment variables:
//! - SENSORWATCH_CONFIG: Config file path
//! - RUST_LOG: Log level (default: info)

use sensorwatch::{Checker, Config, NotificationStatus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sensorwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let path = Config::resolve_path(std::env::args().nth(1));
    let config = Config::load(&path)?;

    tracing::info!("Sensorwatch configuration:");
    tracing::info!("  Config: {}", path.display());
    tracing::info!("  Store: {}/{}", config.influx.base_url(), config.influx.database);
    tracing::info!(
        "  Channel: {} (last {} readings)",
        config.influx.tag,
        config.influx.number
    );
    tracing::info!("  Outlier deviations: {}", config.outlierfilter.deviations);
    tracing::info!(
        "  Thresholds: {} .. {} {}",
        config.failurethreshold.minimum,
        config.failurethreshold.maximum,
        config.unit.unit
    );

    let checker = Checker::new(config)?;
    let report = checker.run().await.map_err(|e| {
        tracing::error!(error = %e, "Check failed");
        e
    })?;

    if report.outcome.has_failures() {
        tracing::warn!(
            failures = report.outcome.failures.len(),
            "Check complete: threshold failures found"
        );
    }
    match report.notification {
        NotificationStatus::NotNeeded => tracing::info!("Check complete: all clear"),
        NotificationStatus::Sent => tracing::info!("Check complete: warning sent"),
        NotificationStatus::Failed => {
            tracing::warn!("Check complete: warning could not be delivered")
        }
    }

    Ok(())
}
