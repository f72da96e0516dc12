//! Rate source abstraction

use super::rates::RateTable;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Latest published rates relative to `base`.
    async fn get_latest(&self, base: &str) -> Result<RateTable>;

    /// Rates relative to `base` as published on `date`.
    async fn get_historical(&self, base: &str, date: NaiveDate) -> Result<RateTable>;

    /// Daily rate of `target` in `base` between `start` and `end`, inclusive.
    ///
    /// Failures are reported as an empty map.
    async fn get_time_series(
        &self,
        base: &str,
        start: NaiveDate,
        end: NaiveDate,
        target: &str,
    ) -> BTreeMap<NaiveDate, f64>;
}
