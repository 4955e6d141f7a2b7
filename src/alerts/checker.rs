//! Single-pass threshold check

use chrono::{DateTime, Local, TimeZone};

use super::message::WarningMessage;
use super::notifier::EmailNotifier;
use crate::analysis::{detect_failures, filter_outliers, AnalysisError, OutlierReport};
use crate::config::Config;
use crate::influx::{FetchError, InfluxClient};

/// Result of analysing one window of readings
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// Readings as fetched, newest first
    pub readings: Vec<f64>,
    /// Outlier filter pass over `readings`
    pub outliers: OutlierReport,
    /// Indices of filtered readings outside the thresholds
    pub failures: Vec<usize>,
    /// Warning to send, present only when `failures` is non-empty
    pub warning: Option<WarningMessage>,
}

impl CheckOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// What happened to the warning email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    /// No failures, nothing sent
    NotNeeded,
    Sent,
    /// Delivery failed and was logged
    Failed,
}

impl NotificationStatus {
    /// Status for an attempted delivery
    pub fn from_delivery(delivered: bool) -> Self {
        if delivered {
            NotificationStatus::Sent
        } else {
            NotificationStatus::Failed
        }
    }
}

/// Outcome of a full run, including delivery
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub outcome: CheckOutcome,
    pub notification: NotificationStatus,
}

/// Filter, detect and build the warning for a window of readings
pub fn evaluate<Tz>(
    readings: Vec<f64>,
    config: &Config,
    now: &DateTime<Tz>,
) -> Result<CheckOutcome, AnalysisError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let outliers = filter_outliers(&readings, config.outlierfilter.deviations)?;
    let failures = detect_failures(&outliers.filtered, &config.failurethreshold);

    let warning = WarningMessage::build(
        &failures,
        &readings,
        &config.unit.unit,
        now,
        &config.failurethreshold,
    );

    Ok(CheckOutcome {
        readings,
        outliers,
        failures,
        warning,
    })
}

/// Fetches a window of readings and emails a warning on threshold failures
pub struct Checker {
    config: Config,
    client: InfluxClient,
    notifier: EmailNotifier,
}

impl Checker {
    pub fn new(config: Config) -> Result<Self, CheckError> {
        let client = InfluxClient::new(&config.influx)?;
        let notifier = EmailNotifier::new(config.email.clone());
        Ok(Self {
            config,
            client,
            notifier,
        })
    }

    /// Fetch the latest window of readings and analyse it
    pub async fn fetch_and_evaluate(&self) -> Result<CheckOutcome, CheckError> {
        let readings = self.client.fetch_recent().await?;
        let outcome = evaluate(readings, &self.config, &Local::now())?;

        let thresholds = &self.config.failurethreshold;
        let in_range = outcome
            .outliers
            .filtered
            .iter()
            .filter(|&&v| thresholds.contains(v))
            .count();
        tracing::info!(
            channel = %self.config.influx.tag,
            readings = outcome.readings.len(),
            outliers = outcome.outliers.replaced_count(),
            in_range,
            "Readings analysed"
        );

        Ok(outcome)
    }

    /// Run the check once
    pub async fn run(&self) -> Result<CheckReport, CheckError> {
        let outcome = self.fetch_and_evaluate().await?;

        let notification = match &outcome.warning {
            Some(warning) => {
                tracing::warn!(
                    channel = %self.config.influx.tag,
                    failures = outcome.failures.len(),
                    "Threshold failures detected:\n{}",
                    warning
                );
                NotificationStatus::from_delivery(self.notifier.notify(warning).await)
            }
            None => {
                tracing::info!(channel = %self.config.influx.tag, "No failures were detected");
                NotificationStatus::NotNeeded
            }
        };

        Ok(CheckReport {
            outcome,
            notification,
        })
    }
}

/// Check errors
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}
