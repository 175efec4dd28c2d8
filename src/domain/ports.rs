use crate::domain::model::BankNoteObservation;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;

/// Upstream statistics API as seen by the aggregation core. Implementations
/// own transport concerns (endpoints, paging, timeouts); the core only sees
/// observations and rate tables.
#[async_trait]
pub trait BankNoteApi: Send + Sync {
    /// Circulation observations for one denomination series between two
    /// instants, oldest first. A non-success upstream response is an error.
    async fn fetch_banknote_observations(
        &self,
        denomination_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BankNoteObservation>>;

    /// Daily EUR reference rates for `date`, keyed by currency code. Rate
    /// text keeps the upstream comma decimal separator; parsing is the
    /// caller's concern.
    async fn fetch_daily_exchange_rates(
        &self,
        date: NaiveDate,
        currencies: Option<&[String]>,
    ) -> Result<HashMap<String, String>>;
}
