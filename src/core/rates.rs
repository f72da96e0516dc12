//! Rate tables and the conversion calculator.
//!
//! All rates in a [`RateTable`] are expressed relative to its single base
//! currency. Converting between two non-base currencies pivots through that
//! base: `amount / rates[from] * rates[to]`.

use chrono::NaiveDate;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Number of decimal digits kept by [`convert`].
pub const CONVERSION_DECIMALS: u32 = 4;

#[derive(Debug, Error, PartialEq)]
pub enum RateTableError {
    #[error("rate for {code} must be a positive finite number, got {rate}")]
    InvalidRate { code: String, rate: f64 },
    #[error("rate for base currency {base} must be 1, got {rate}")]
    BaseRateNotOne { base: String, rate: f64 },
}

/// Immutable snapshot of exchange rates relative to one base currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateTable {
    base: String,
    date: NaiveDate,
    rates: BTreeMap<String, f64>,
}

impl RateTable {
    pub fn new(
        base: impl Into<String>,
        date: NaiveDate,
        rates: BTreeMap<String, f64>,
    ) -> Result<Self, RateTableError> {
        let base = base.into();

        for (code, rate) in &rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(RateTableError::InvalidRate {
                    code: code.clone(),
                    rate: *rate,
                });
            }
        }
        if let Some(rate) = rates.get(&base) {
            if (*rate - 1.0).abs() > f64::EPSILON {
                return Err(RateTableError::BaseRateNotOne {
                    base,
                    rate: *rate,
                });
            }
        }

        Ok(Self { base, date, rates })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    /// Rate of `code` relative to the base. The base itself is always 1.
    pub fn rate(&self, code: &str) -> Option<f64> {
        match self.rates.get(code) {
            Some(rate) => Some(*rate),
            None if code == self.base => Some(1.0),
            None => None,
        }
    }

    /// Every code this table knows about, including the base, in ascending order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        if !self.rates.contains_key(&self.base) {
            let pos = codes.partition_point(|c| *c < self.base.as_str());
            codes.insert(pos, self.base.as_str());
        }
        codes
    }
}

impl<'de> Deserialize<'de> for RateTable {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            base: String,
            date: NaiveDate,
            rates: BTreeMap<String, f64>,
        }

        let raw = Raw::deserialize(deserializer)?;
        RateTable::new(raw.base, raw.date, raw.rates).map_err(serde::de::Error::custom)
    }
}

/// Rounds to [`CONVERSION_DECIMALS`] digits, half away from zero.
pub fn round4(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(CONVERSION_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// Converts `amount` from a currency with `from_rate` to one with `to_rate`.
///
/// Both rates must be relative to the same base. A zero `from_rate` yields 0.
pub fn convert(amount: f64, from_rate: f64, to_rate: f64) -> f64 {
    if from_rate == 0.0 {
        return 0.0;
    }
    round4((amount / from_rate) * to_rate)
}

/// Converts between two codes of `table`, pivoting through its base.
///
/// A code missing from the table is treated as the base (rate 1).
pub fn calculate_exchange(table: &RateTable, amount: f64, source: &str, target: &str) -> f64 {
    let source_rate = table.rates.get(source).copied().unwrap_or(1.0);
    let target_rate = table.rates.get(target).copied().unwrap_or(1.0);
    convert(amount, source_rate, target_rate)
}
