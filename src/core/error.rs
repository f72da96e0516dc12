use thiserror::Error;

/// Failures a [`RateSession`](super::session::RateSession) turns into state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Unable to load exchange rates: {0}")]
    SourceUnavailable(String),
    #[error("Previous-day rates unavailable: {0}")]
    TrendUnavailable(String),
    #[error("No rate history for {base}/{target}")]
    HistoryUnavailable { base: String, target: String },
}
