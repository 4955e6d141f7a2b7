//! Sensorwatch: one-shot sensor threshold check
//!
//! Pulls the most recent readings of a channel from InfluxDB, replaces
//! statistical outliers with the median, compares the filtered readings
//! against a fixed threshold pair and emails an operator when a reading
//! falls outside it.
//!
//! # Example
//!
//! ```no_run
//! use sensorwatch::alerts::Checker;
//! use sensorwatch::Config;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("sensorwatch.toml")?;
//! let report = Checker::new(config)?.run().await?;
//! println!("Failures: {:?}", report.outcome.failures);
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod analysis;
pub mod config;
pub mod influx;

// Re-export commonly used types
pub use alerts::{CheckError, CheckReport, Checker, NotificationStatus};
pub use analysis::{detect_failures, filter_outliers, AnalysisError, Thresholds};
pub use config::{Config, ConfigError};
