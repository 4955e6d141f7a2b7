use std::time::Duration;

use super::response::QueryResponse;
use crate::config::InfluxConfig;

/// Client for the InfluxDB 1.x HTTP query API
#[derive(Debug, Clone)]
pub struct InfluxClient {
    http_client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    database: String,
    measurement: String,
    tag: String,
    number: usize,
}

impl InfluxClient {
    pub fn new(config: &InfluxConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            database: config.database.clone(),
            measurement: config.measurement.clone(),
            tag: config.tag.clone(),
            number: config.number,
        })
    }

    /// Query text selecting the most recent readings of the configured channel
    pub fn query_text(&self) -> String {
        build_query(&self.measurement, &self.tag, self.number)
    }

    /// Fetch the most recent readings, newest first
    pub async fn fetch_recent(&self) -> Result<Vec<f64>, FetchError> {
        let url = format!("{}/query", self.base_url);
        let query = self.query_text();
        tracing::debug!(url = %url, query = %query, "Querying readings");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("db", self.database.as_str()),
                ("u", self.username.as_str()),
                ("p", self.password.as_str()),
                ("q", query.as_str()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: QueryResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Deserialization(e.to_string()))?;

        let mut readings = body.readings()?;
        readings.truncate(self.number);

        tracing::info!(
            channel = %self.tag,
            count = readings.len(),
            "Fetched readings"
        );
        Ok(readings)
    }
}

/// Build the InfluxQL statement for the `limit` newest points of a channel
pub fn build_query(measurement: &str, tag: &str, limit: usize) -> String {
    format!(
        "SELECT * FROM {} WHERE \"channel_name\" = {} ORDER BY time DESC LIMIT {} OFFSET 0",
        quote_identifier(measurement),
        quote_literal(tag),
        limit
    )
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Series {0} has no value column")]
    MissingValueColumn(String),

    #[error("Non-numeric reading: {0}")]
    NonNumeric(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    fn influx_config(port: u16) -> InfluxConfig {
        InfluxConfig {
            url: "http://127.0.0.1".to_string(),
            port,
            username: "reader".to_string(),
            password: "secret".to_string(),
            database: "sensors".to_string(),
            tag: "probe-1".to_string(),
            number: 3,
            measurement: "temperature".to_string(),
            timeout_secs: 5,
        }
    }

    async fn serve(router: Router) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        port
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query("temperature", "probe-1", 10),
            "SELECT * FROM \"temperature\" WHERE \"channel_name\" = 'probe-1' ORDER BY time DESC LIMIT 10 OFFSET 0"
        );
    }

    #[test]
    fn test_build_query_escapes_tag() {
        let query = build_query("temperature", "o'brien", 1);
        assert!(query.contains("= 'o\\'brien'"));
    }

    #[tokio::test]
    async fn test_fetch_recent() {
        async fn handler(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
            assert_eq!(params.get("db").map(String::as_str), Some("sensors"));
            assert_eq!(params.get("u").map(String::as_str), Some("reader"));
            assert!(params["q"].contains("LIMIT 3"));
            Json(json!({
                "results": [{
                    "statement_id": 0,
                    "series": [{
                        "name": "temperature",
                        "columns": ["time", "channel_name", "value"],
                        "values": [
                            ["2024-01-01T00:00:03Z", "probe-1", 52.0],
                            ["2024-01-01T00:00:02Z", "probe-1", 48.5],
                            ["2024-01-01T00:00:01Z", "probe-1", 50.0]
                        ]
                    }]
                }]
            }))
        }

        let port = serve(Router::new().route("/query", get(handler))).await;
        let client = InfluxClient::new(&influx_config(port)).unwrap();

        let readings = client.fetch_recent().await.unwrap();
        assert_eq!(readings, vec![52.0, 48.5, 50.0]);
    }

    #[tokio::test]
    async fn test_fetch_recent_status_error() {
        async fn handler() -> (StatusCode, &'static str) {
            (StatusCode::UNAUTHORIZED, "authorization failed")
        }

        let port = serve(Router::new().route("/query", get(handler))).await;
        let client = InfluxClient::new(&influx_config(port)).unwrap();

        let err = client.fetch_recent().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_fetch_recent_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = InfluxClient::new(&influx_config(port)).unwrap();
        let err = client.fetch_recent().await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }
}
