pub mod plaid;

use axum::async_trait;
use chrono::{Duration, NaiveDate};
use serde_json::Value;
use thiserror::Error;

pub use self::plaid::PlaidGateway;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider rejected {endpoint} with status {status}")]
    Provider {
        endpoint: &'static str,
        status: u16,
        /// Error body exactly as the provider returned it.
        body: Value,
    },
}

/// Inclusive range of posting dates to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start > end {
            return None;
        }

        Some(Self { start, end })
    }

    /// The `days` long window that ends on `end`.
    pub fn ending(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days)),
            end,
        }
    }
}

/// Raw access to the aggregation provider. Responses are returned untouched;
/// interpreting them is left to the caller.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn create_link_token(&self, client_user_id: &str) -> Result<Value, UpstreamError>;

    async fn exchange_public_token(&self, public_token: &str) -> Result<Value, UpstreamError>;

    async fn accounts(&self, access_token: &str) -> Result<Value, UpstreamError>;

    /// Every transaction in `range`, merged into a single response.
    async fn transactions(&self, access_token: &str, range: DateRange)
        -> Result<Value, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_inverted_dates() {
        let start = NaiveDate::from_ymd_opt(2022, 12, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();

        assert_eq!(DateRange::new(start, end), None);
        assert!(DateRange::new(end, start).is_some());
        assert!(DateRange::new(end, end).is_some());
    }

    #[test]
    fn window_ends_on_given_day() {
        let end = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let range = DateRange::ending(end, 28);

        assert_eq!(range.start, NaiveDate::from_ymd_opt(2022, 2, 1).unwrap());
        assert_eq!(range.end, end);
    }
}
