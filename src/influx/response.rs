//! InfluxDB query response body

use serde::Deserialize;

use super::client::FetchError;

/// Name of the field holding the reading
pub const VALUE_COLUMN: &str = "value";

/// Top-level `/query` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub results: Vec<StatementResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementResult {
    #[serde(default)]
    pub statement_id: u32,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

impl QueryResponse {
    /// Extract the `value` column of every row, in response order
    ///
    /// A response without series (no matching points) yields no readings.
    pub fn readings(&self) -> Result<Vec<f64>, FetchError> {
        if let Some(error) = &self.error {
            return Err(FetchError::Query(error.clone()));
        }

        let mut readings = Vec::new();
        for result in &self.results {
            if let Some(error) = &result.error {
                return Err(FetchError::Query(error.clone()));
            }

            for series in &result.series {
                let col_idx = series
                    .columns
                    .iter()
                    .position(|c| c == VALUE_COLUMN)
                    .ok_or_else(|| FetchError::MissingValueColumn(series.name.clone()))?;

                for row in &series.values {
                    let value = row
                        .get(col_idx)
                        .ok_or_else(|| FetchError::MissingValueColumn(series.name.clone()))?;
                    let reading = value
                        .as_f64()
                        .ok_or_else(|| FetchError::NonNumeric(value.to_string()))?;
                    readings.push(reading);
                }
            }
        }

        Ok(readings)
    }
}
