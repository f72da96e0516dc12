use super::util::with_retry;
use crate::core::rates::RateTable;
use crate::core::source::RateSource;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, error, instrument, warn};

const USER_AGENT: &str = "fxmate/0.1";

#[derive(Debug, Deserialize)]
struct FrankfurterRates {
    base: String,
    date: NaiveDate,
    rates: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct FrankfurterSeries {
    rates: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
}

/// [`RateSource`] backed by the Frankfurter API (ECB reference rates).
pub struct FrankfurterSource {
    base_url: String,
    retries: usize,
    retry_delay_ms: u64,
}

impl FrankfurterSource {
    pub fn new(base_url: &str) -> Self {
        FrankfurterSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            retries: 3,
            retry_delay_ms: 500,
        }
    }

    pub fn with_retries(mut self, retries: usize, retry_delay_ms: u64) -> Self {
        self.retries = retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("Requesting rates from {}", url);

        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        let response = with_retry(|| client.get(url).send(), self.retries, self.retry_delay_ms)
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} URL: {}", response.status(), url));
        }

        response
            .text()
            .await
            .context("Failed to get response text")
    }

    async fn fetch_table(&self, url: &str) -> Result<RateTable> {
        let text = self.get_text(url).await?;

        let data: FrankfurterRates = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(error = ?e, response = %text, "Failed to parse rates response");
                return Err(e).context("Failed to parse rates response");
            }
        };

        RateTable::new(data.base, data.date, data.rates).context("Invalid rates in response")
    }

    async fn fetch_series(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        target: &str,
    ) -> Result<BTreeMap<NaiveDate, f64>> {
        let url = format!(
            "{}/{start}..{end}?from={base}&to={target}",
            self.base_url
        );
        let text = self.get_text(&url).await?;
        let data: FrankfurterSeries =
            serde_json::from_str(&text).context("Failed to parse time series response")?;

        Ok(data
            .rates
            .into_iter()
            .filter_map(|(date, rates)| {
                rates
                    .get(target)
                    .copied()
                    .filter(|rate| rate.is_finite() && *rate > 0.0)
                    .map(|rate| (date, rate))
            })
            .collect())
    }
}

#[async_trait]
impl RateSource for FrankfurterSource {
    #[instrument(name = "FrankfurterLatest", skip(self))]
    async fn get_latest(&self, base: &str) -> Result<RateTable> {
        let url = format!("{}/latest?from={base}", self.base_url);
        self.fetch_table(&url)
            .await
            .with_context(|| format!("No latest rates for {base}"))
    }

    #[instrument(name = "FrankfurterHistorical", skip(self))]
    async fn get_historical(&self, base: &str, date: NaiveDate) -> Result<RateTable> {
        let url = format!("{}/{date}?from={base}", self.base_url);
        self.fetch_table(&url)
            .await
            .with_context(|| format!("No rates for {base} on {date}"))
    }

    #[instrument(name = "FrankfurterTimeSeries", skip(self))]
    async fn get_time_series(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        target: &str,
    ) -> BTreeMap<NaiveDate, f64> {
        match self.fetch_series(base, start, end, target).await {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "Time series request failed");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST_JSON: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "date": "2025-03-14",
        "rates": {"EUR": 0.9197, "JPY": 148.62, "TWD": 32.91}
    }"#;

    const SERIES_JSON: &str = r#"{
        "amount": 1.0,
        "base": "USD",
        "start_date": "2025-03-10",
        "end_date": "2025-03-14",
        "rates": {
            "2025-03-14": {"JPY": 148.62},
            "2025-03-10": {"JPY": 147.25},
            "2025-03-12": {"JPY": 148.1}
        }
    }"#;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn create_mock_server(request_path: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider(server: &MockServer) -> FrankfurterSource {
        FrankfurterSource::new(&server.uri()).with_retries(0, 0)
    }

    #[tokio::test]
    async fn test_successful_latest_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("from", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LATEST_JSON))
            .mount(&mock_server)
            .await;

        let table = provider(&mock_server).get_latest("USD").await.unwrap();
        assert_eq!(table.base(), "USD");
        assert_eq!(table.date(), date("2025-03-14"));
        assert_eq!(table.rate("JPY"), Some(148.62));
        assert_eq!(table.rate("USD"), Some(1.0));
        assert_eq!(table.rates().len(), 3);
    }

    #[tokio::test]
    async fn test_successful_historical_fetch() {
        let mock_server = create_mock_server("/2025-03-13", 200, LATEST_JSON).await;

        let table = provider(&mock_server)
            .get_historical("USD", date("2025-03-13"))
            .await
            .unwrap();
        assert_eq!(table.rate("EUR"), Some(0.9197));
    }

    #[tokio::test]
    async fn test_latest_api_error_response() {
        let mock_server = create_mock_server("/latest", 500, "").await;

        let result = provider(&mock_server).get_latest("USD").await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("No latest rates for USD"));
        assert!(message.contains("500"));
    }

    #[tokio::test]
    async fn test_latest_not_found() {
        let mock_server =
            create_mock_server("/latest", 404, r#"{"message":"not found"}"#).await;

        let result = provider(&mock_server).get_latest("XXX").await;
        assert!(format!("{:#}", result.unwrap_err()).contains("HTTP error: 404"));
    }

    #[tokio::test]
    async fn test_latest_malformed_response() {
        let mock_server =
            create_mock_server("/latest", 200, r#"{"base": "USD", "results": {}}"#).await;

        let result = provider(&mock_server).get_latest("USD").await;
        assert!(
            format!("{:#}", result.unwrap_err()).contains("Failed to parse rates response")
        );
    }

    #[tokio::test]
    async fn test_latest_invalid_rate_is_rejected() {
        let body = r#"{"base": "USD", "date": "2025-03-14", "rates": {"JPY": -1}}"#;
        let mock_server = create_mock_server("/latest", 200, body).await;

        let result = provider(&mock_server).get_latest("USD").await;
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid rates in response"));
    }

    #[tokio::test]
    async fn test_time_series_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2025-03-10..2025-03-14"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "JPY"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SERIES_JSON))
            .mount(&mock_server)
            .await;

        let series = provider(&mock_server)
            .get_time_series("USD", date("2025-03-10"), date("2025-03-14"), "JPY")
            .await;

        let dates: Vec<_> = series.keys().copied().collect();
        assert_eq!(
            dates,
            vec![date("2025-03-10"), date("2025-03-12"), date("2025-03-14")]
        );
        assert_eq!(series[&date("2025-03-12")], 148.1);
    }

    #[tokio::test]
    async fn test_time_series_failure_is_empty() {
        let mock_server = create_mock_server("/2025-03-10..2025-03-14", 503, "").await;

        let series = provider(&mock_server)
            .get_time_series("USD", date("2025-03-10"), date("2025-03-14"), "JPY")
            .await;
        assert!(series.is_empty());
    }
}
