//! Threshold failure detection

use super::Thresholds;

/// Positions of readings outside the threshold pair
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FailureReport {
    /// Indices with a reading below the minimum, ascending
    pub below: Vec<usize>,
    /// Indices with a reading above the maximum, ascending
    pub above: Vec<usize>,
}

impl FailureReport {
    /// Scan readings against the thresholds
    pub fn scan(data: &[f64], thresholds: &Thresholds) -> Self {
        let below = data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v < thresholds.minimum)
            .map(|(i, _)| i)
            .collect();
        let above = data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v > thresholds.maximum)
            .map(|(i, _)| i)
            .collect();

        Self { below, above }
    }

    /// Below-minimum indices followed by above-maximum indices
    ///
    /// Not deduplicated: with an inverted threshold pair an index can appear
    /// in both halves.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices = Vec::with_capacity(self.below.len() + self.above.len());
        indices.extend_from_slice(&self.below);
        indices.extend_from_slice(&self.above);
        indices
    }

    pub fn is_empty(&self) -> bool {
        self.below.is_empty() && self.above.is_empty()
    }
}

/// Indices of readings outside `[minimum, maximum]`
pub fn detect_failures(data: &[f64], thresholds: &Thresholds) -> Vec<usize> {
    let report = FailureReport::scan(data, thresholds);
    let indices = report.indices();

    if report.is_empty() {
        tracing::info!("All readings within thresholds");
        return indices;
    }

    tracing::info!(failures = ?indices, "Index of failures");
    if !report.below.is_empty() {
        let values: Vec<f64> = report.below.iter().map(|&i| data[i]).collect();
        tracing::info!(values = ?values, "Failures below min threshold");
    }
    if !report.above.is_empty() {
        let values: Vec<f64> = report.above.iter().map(|&i| data[i]).collect();
        tracing::info!(values = ?values, "Failures above max threshold");
    }

    indices
}
