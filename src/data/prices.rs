use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{DataError, DataResult};

/// A single daily closing-price observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Source of closing-price series for a ticker over a date window.
/// The `end` bound is treated as exclusive by the concrete providers;
/// callers widen the window when they need the end date's close included.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch_close_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DataResult<Vec<ClosePoint>>;
}

/// Polygon.io aggregates response structures
#[derive(Debug, Deserialize)]
struct PolygonAggregatesResponse {
    results: Option<Vec<PolygonAggregate>>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct PolygonAggregate {
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "t")]
    timestamp: i64, // Unix milliseconds
}

/// Daily-close client backed by the Polygon.io aggregates endpoint
#[derive(Debug)]
pub struct PolygonClient {
    client: reqwest::Client,
    api_key: String,
}

impl PolygonClient {
    pub fn new(api_key: String, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent(concat!("marketbrief/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, api_key }
    }
}

#[async_trait]
impl PriceProvider for PolygonClient {
    async fn fetch_close_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DataResult<Vec<ClosePoint>> {
        let url = format!(
            "https://api.polygon.io/v2/aggs/ticker/{}/range/1/day/{}/{}?adjusted=true&sort=asc&apiKey={}",
            symbol,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            self.api_key
        );

        debug!(
            "Polygon API request: GET {}",
            url.replace(&self.api_key, "***")
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::api_error(
                status_code,
                format!("Polygon.io: {}", error_text),
            ));
        }

        let polygon_response: PolygonAggregatesResponse = response.json().await?;

        // DELAYED is returned for free/basic tier subscriptions; the closes
        // are still usable for a period recap
        match polygon_response.status.as_str() {
            "OK" => {}
            "DELAYED" => {
                warn!("Polygon.io returned delayed data for {}", symbol);
            }
            status => {
                return Err(DataError::Provider(format!(
                    "Polygon.io returned error status: {}",
                    status
                )));
            }
        }

        // An absent or empty result set is "no data in window", not an error;
        // the aggregator decides what to do with thin series
        let results = polygon_response.results.unwrap_or_default();

        let closes = closes_before(results, end)?;

        info!(
            "Fetched {} daily closes from Polygon.io for {}",
            closes.len(),
            symbol
        );

        Ok(closes)
    }
}

/// Map Polygon aggregates to close points, enforcing the trait's exclusive
/// end bound. Polygon's `to` parameter is inclusive, so a bar dated `end`
/// itself can come back and must be dropped.
fn closes_before(
    results: Vec<PolygonAggregate>,
    end: NaiveDate,
) -> DataResult<Vec<ClosePoint>> {
    let mut closes = Vec::with_capacity(results.len());
    for agg in results {
        let datetime = DateTime::from_timestamp_millis(agg.timestamp).ok_or_else(|| {
            DataError::parse_error(format!("Invalid timestamp: {}", agg.timestamp))
        })?;
        let date = datetime.date_naive();
        if date < end {
            closes.push(ClosePoint {
                date,
                close: agg.close,
            });
        }
    }
    Ok(closes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(date: NaiveDate, close: f64) -> PolygonAggregate {
        PolygonAggregate {
            close,
            timestamp: date
                .and_hms_opt(0, 0, 0)
                .expect("valid time")
                .and_utc()
                .timestamp_millis(),
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, day).expect("valid date")
    }

    #[test]
    fn test_exclusive_end_bound_drops_end_date_bar() {
        // Polygon's inclusive `to` can return a bar dated `end` itself;
        // the last close must stay the one from the day before `end`
        let results = vec![
            aggregate(date(11), 100.0),
            aggregate(date(12), 110.0),
            aggregate(date(13), 120.0),
            aggregate(date(14), 130.0),
        ];

        let closes = closes_before(results, date(14)).expect("parses cleanly");
        assert_eq!(closes.len(), 3);
        assert_eq!(closes.last().map(|c| c.close), Some(120.0));
    }

    #[test]
    fn test_bars_within_window_are_kept_in_order() {
        let results = vec![aggregate(date(11), 100.0), aggregate(date(12), 110.0)];

        let closes = closes_before(results, date(14)).expect("parses cleanly");
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].close, 100.0);
        assert_eq!(closes[1].close, 110.0);
    }

    #[test]
    fn test_invalid_timestamp_is_a_parse_error() {
        let results = vec![PolygonAggregate {
            close: 100.0,
            timestamp: i64::MAX,
        }];

        let err = closes_before(results, date(14)).expect_err("timestamp out of range");
        assert!(matches!(err, DataError::Parse { .. }));
    }
}
