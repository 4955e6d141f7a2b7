//! InfluxDB reading fetcher
//!
//! Talks to the InfluxDB 1.x HTTP query API and extracts the `value` field of
//! the most recent points for one channel.

pub mod client;
pub mod response;

pub use client::{build_query, FetchError, InfluxClient};
pub use response::QueryResponse;
