//! Reading analysis: robust outlier filtering and threshold failure detection

pub mod failure;
pub mod outlier;

use serde::{Deserialize, Serialize};

pub use failure::{detect_failures, FailureReport};
pub use outlier::{filter_outliers, median, OutlierReport, MAD_SCALE};

/// Acceptable `[minimum, maximum]` range for a reading
///
/// Ordering of the bounds is not validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub minimum: f64,
    pub maximum: f64,
}

impl Thresholds {
    pub fn new(minimum: f64, maximum: f64) -> Self {
        Self { minimum, maximum }
    }

    /// Whether `value` lies inside the range, bounds inclusive
    pub fn contains(&self, value: f64) -> bool {
        !(value < self.minimum || value > self.maximum)
    }
}

/// Analysis errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AnalysisError {
    #[error("Reading sequence is empty")]
    EmptySequence,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_contains() {
        let thresholds = Thresholds::new(10.0, 20.0);
        assert!(thresholds.contains(10.0));
        assert!(thresholds.contains(20.0));
        assert!(!thresholds.contains(9.99));
        assert!(!thresholds.contains(20.01));
    }
}
