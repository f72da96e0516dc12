//! Day-over-day rate change between two snapshots of the same base.

use super::rates::RateTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateChange {
    /// `current - previous`, in units of the quoted currency.
    pub value: f64,
    /// Signed percentage with two decimals, e.g. `+1.25%`.
    pub percent: String,
    /// Zero change counts as up.
    pub is_up: bool,
}

impl RateChange {
    pub fn between(current: f64, previous: f64) -> Self {
        let value = current - previous;
        let is_up = value >= 0.0;
        let pct = (value / previous) * 100.0;
        let percent = if is_up {
            format!("+{pct:.2}%")
        } else {
            format!("{pct:.2}%")
        };
        Self {
            value,
            percent,
            is_up,
        }
    }
}

/// Change of `code` between `previous` and `current`.
///
/// Returns `None` when either table is missing, the tables use different
/// bases, or `code` is absent from either of them.
pub fn get_rate_change(
    code: &str,
    current: Option<&RateTable>,
    previous: Option<&RateTable>,
) -> Option<RateChange> {
    let (current, previous) = (current?, previous?);
    if current.base() != previous.base() {
        return None;
    }
    let now = current.rate(code)?;
    let before = previous.rate(code)?;
    Some(RateChange::between(now, before))
}
