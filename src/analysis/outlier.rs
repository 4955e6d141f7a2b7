//! Median-based outlier filter
//!
//! Readings further than `MAD_SCALE * sigma_num` from the sequence median are
//! treated as sensor glitches and replaced with the median, so a single bad
//! sample cannot trigger a threshold failure on its own.

use super::AnalysisError;

/// Scale factor relating the MAD to the standard deviation of normally
/// distributed data
pub const MAD_SCALE: f64 = 1.4826;

/// Result of an outlier filter pass
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    /// Readings with outliers replaced by the median, same length as the input
    pub filtered: Vec<f64>,
    /// Median of the raw readings
    pub median: f64,
    /// Median absolute deviation of the raw readings (reported only)
    pub mad: f64,
    /// Lower outlier bound
    pub lower: f64,
    /// Upper outlier bound
    pub upper: f64,
    /// Indices replaced for falling below `lower`
    pub replaced_low: Vec<usize>,
    /// Indices replaced for rising above `upper`
    pub replaced_high: Vec<usize>,
}

impl OutlierReport {
    /// Number of readings replaced by the median
    pub fn replaced_count(&self) -> usize {
        self.replaced_low.len() + self.replaced_high.len()
    }
}

/// Median of a sequence; even lengths average the two middle values
pub fn median(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Replace readings outside `median ± MAD_SCALE * sigma_num` with the median
///
/// The bound is built from the scale constant and `sigma_num` alone; the MAD
/// of the sequence is computed and reported but does not widen or narrow it.
pub fn filter_outliers(data: &[f64], sigma_num: f64) -> Result<OutlierReport, AnalysisError> {
    let center = median(data).ok_or(AnalysisError::EmptySequence)?;

    let difference: Vec<f64> = data.iter().map(|v| (v - center).abs()).collect();
    let mad = median(&difference).unwrap_or(0.0);

    let dev = MAD_SCALE * sigma_num;
    let lower = center - dev;
    let upper = center + dev;
    tracing::debug!(lower, upper, median = center, mad, "Outlier thresholds");

    let mut filtered = Vec::with_capacity(data.len());
    let mut replaced_low = Vec::new();
    let mut replaced_high = Vec::new();

    for (i, &value) in data.iter().enumerate() {
        if value < lower {
            replaced_low.push(i);
            filtered.push(center);
        } else if value > upper {
            replaced_high.push(i);
            filtered.push(center);
        } else {
            filtered.push(value);
        }
    }

    if !replaced_low.is_empty() || !replaced_high.is_empty() {
        tracing::info!(
            lower_outliers = ?replaced_low,
            upper_outliers = ?replaced_high,
            "Replaced outliers with median {}",
            center
        );
    }
    tracing::debug!(filtered = ?filtered, "Readings after filtering");

    Ok(OutlierReport {
        filtered,
        median: center,
        mad,
        lower,
        upper,
        replaced_low,
        replaced_high,
    })
}
