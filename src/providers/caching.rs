use crate::core::cache::Cache;
use crate::core::rates::RateTable;
use crate::core::source::RateSource;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

type SeriesKey = (String, String, NaiveDate, NaiveDate);

/// Wraps a [`RateSource`] and remembers past snapshots.
///
/// Latest rates always go to the inner source so a refresh sees new data.
/// Historical tables and non-empty time series are kept for the lifetime of
/// the wrapper; failures are never cached.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    historical: Cache<(String, NaiveDate), RateTable>,
    series: Cache<SeriesKey, BTreeMap<NaiveDate, f64>>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            historical: Cache::new(),
            series: Cache::new(),
        }
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    async fn get_latest(&self, base: &str) -> Result<RateTable> {
        self.inner.get_latest(base).await
    }

    async fn get_historical(&self, base: &str, date: NaiveDate) -> Result<RateTable> {
        let key = (base.to_string(), date);
        if let Some(table) = self.historical.get(&key).await {
            return Ok(table);
        }
        let table = self.inner.get_historical(base, date).await?;
        self.historical.put(key, table.clone()).await;
        Ok(table)
    }

    async fn get_time_series(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        target: &str,
    ) -> BTreeMap<NaiveDate, f64> {
        let key = (base.to_string(), target.to_string(), start, end);
        if let Some(series) = self.series.get(&key).await {
            return series;
        }
        let series = self.inner.get_time_series(base, start, end, target).await;
        if series.is_empty() {
            debug!(?key, "Not caching empty time series");
        } else {
            self.series.put(key, series.clone()).await;
        }
        series
    }
}
