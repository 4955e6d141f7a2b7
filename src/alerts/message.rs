//! Warning message assembly

use std::fmt;

use chrono::{DateTime, TimeZone};

use crate::analysis::Thresholds;

/// Timestamp layout used in the warning body
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Body of a threshold warning email
#[derive(Debug, Clone, PartialEq)]
pub struct WarningMessage {
    body: String,
}

impl WarningMessage {
    /// Build the warning for the given failure indices
    ///
    /// Values are taken from `readings`, the unfiltered sequence, so the
    /// operator sees what the sensor actually reported. Returns `None` when
    /// there are no failures.
    pub fn build<Tz>(
        failures: &[usize],
        readings: &[f64],
        unit: &str,
        detected_at: &DateTime<Tz>,
        thresholds: &Thresholds,
    ) -> Option<Self>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        if failures.is_empty() {
            return None;
        }

        let mut body = String::from("The following errors were detected! \r\n");
        body.push_str("Failures detected with values: ");
        for value in failures.iter().filter_map(|&i| readings.get(i)) {
            body.push_str(&format!("{}{} ", value, unit));
        }
        body.push_str(" \r\n");
        body.push_str(&format!(
            "Errors were detected at time: {} \r\n",
            detected_at.format(TIMESTAMP_FORMAT)
        ));
        body.push_str(&format!(
            "Minimum threshold: {} {} \r\n",
            thresholds.minimum, unit
        ));
        body.push_str(&format!(
            "Maximum threshold: {} {} \r\n",
            thresholds.maximum, unit
        ));

        Some(Self { body })
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for WarningMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_no_failures_no_message() {
        let thresholds = Thresholds::new(10.0, 90.0);
        assert!(WarningMessage::build(&[], &[50.0], "C", &at(), &thresholds).is_none());
    }

    #[test]
    fn test_body_layout() {
        let thresholds = Thresholds::new(10.0, 90.0);
        let message =
            WarningMessage::build(&[0, 2], &[5.0, 50.0, 95.5], "C", &at(), &thresholds).unwrap();

        assert_eq!(
            message.body(),
            "The following errors were detected! \r\n\
             Failures detected with values: 5C 95.5C  \r\n\
             Errors were detected at time: 2024-03-01 12:30:05 \r\n\
             Minimum threshold: 10 C \r\n\
             Maximum threshold: 90 C \r\n"
        );
    }

    #[test]
    fn test_out_of_range_index_skipped() {
        let thresholds = Thresholds::new(10.0, 90.0);
        let message =
            WarningMessage::build(&[7, 0], &[5.0], "%", &at(), &thresholds).unwrap();
        assert!(message.body().contains("Failures detected with values: 5%  \r\n"));
    }
}
