use crate::cache::{Cache, CacheExt};
use crate::domain::model::{
    parse_upstream_decimal, BankNoteFilters, BankNoteSummary, CurrencyValue, DENOMINATIONS,
};
use crate::domain::ports::BankNoteApi;
use crate::utils::error::Result;
use chrono::Utc;
use futures::future::join_all;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// The daily rate table is keyed by UTC date, so anything shorter than a day
/// just wastes upstream calls.
const RATE_TABLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Aggregates euro banknote circulation into one summary per denomination,
/// each converted into every currency in the day's exchange-rate table.
pub struct EuroNoteService {
    api: Arc<dyn BankNoteApi>,
    cache: Arc<dyn Cache>,
    currencies: Option<Vec<String>>,
}

impl EuroNoteService {
    pub fn new(
        api: Arc<dyn BankNoteApi>,
        cache: Arc<dyn Cache>,
        currencies: Option<Vec<String>>,
    ) -> Self {
        Self {
            api,
            cache,
            currencies,
        }
    }

    /// Builds one summary per denomination for the requested range, sorted
    /// ascending by face value.
    ///
    /// The exchange-rate table is resolved cache-aside once per UTC day and
    /// shared by every denomination in the pass. A failed rate fetch fails
    /// the whole call, since every summary embeds conversions from that
    /// shared table; a failed observation fetch only drops its own
    /// denomination from the result.
    pub async fn get_note_summaries(
        &self,
        filters: &BankNoteFilters,
    ) -> Result<Vec<BankNoteSummary>> {
        let today = Utc::now().date_naive();
        let cache_key = format!("fx:{}", today.format("%Y%m%d"));

        let exchange_rates: HashMap<String, String> = self
            .cache
            .get_or_add(
                &cache_key,
                || {
                    self.api
                        .fetch_daily_exchange_rates(today, self.currencies.as_deref())
                },
                Some(RATE_TABLE_TTL),
            )
            .await?;

        // The per-denomination fetches are independent; run them concurrently
        // and let each fail on its own.
        let fetches = DENOMINATIONS.iter().map(|&(code, nominal)| {
            self.summarize_denomination(code, nominal, filters, &exchange_rates)
        });

        let mut summaries: Vec<BankNoteSummary> = join_all(fetches)
            .await
            .into_iter()
            .zip(DENOMINATIONS.iter())
            .filter_map(|(outcome, &(code, _))| match outcome {
                Ok(summary) => Some(summary),
                Err(e) => {
                    tracing::error!("Error fetching banknote data for {}: {}", code, e);
                    None
                }
            })
            .collect();

        summaries.sort_by_key(|summary| summary.denomination);
        Ok(summaries)
    }

    async fn summarize_denomination(
        &self,
        code: &str,
        nominal: u32,
        filters: &BankNoteFilters,
        exchange_rates: &HashMap<String, String>,
    ) -> Result<BankNoteSummary> {
        let observations = self
            .api
            .fetch_banknote_observations(code, filters.start_period, filters.end_period)
            .await?;

        // The last observation in range is the representative circulation
        // count; no data reported means zero notes, not an error.
        let count = observations
            .last()
            .map(|obs| obs.value)
            .unwrap_or(Decimal::ZERO);
        let total_value = count * Decimal::from(nominal);

        build_summary(code, nominal, count, total_value, exchange_rates)
    }
}

fn build_summary(
    code: &str,
    nominal: u32,
    count: Decimal,
    total_value: Decimal,
    exchange_rates: &HashMap<String, String>,
) -> Result<BankNoteSummary> {
    let mut currency_values = Vec::with_capacity(exchange_rates.len());
    for (currency_code, rate_text) in exchange_rates {
        let rate = parse_upstream_decimal(Some(rate_text))?;
        let converted = total_value * rate;

        currency_values.push(CurrencyValue {
            currency_code: currency_code.clone(),
            value: converted.to_string(),
            exchange_rate: rate.to_string(),
        });
    }

    Ok(BankNoteSummary {
        denomination: nominal,
        denomination_code: code.to_string(),
        currency_code: "EUR".to_string(),
        count: count.trunc().to_i64().unwrap_or_default(),
        value: total_value,
        currency_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::domain::model::BankNoteObservation;
    use crate::utils::error::NoteError;
    use async_trait::async_trait;
    use chrono::{DateTime, NaiveDate};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubApi {
        rates: HashMap<String, String>,
        counts: HashMap<&'static str, Decimal>,
        failing_code: Option<&'static str>,
        rate_calls: AtomicUsize,
    }

    impl StubApi {
        fn new(rates: &[(&str, &str)]) -> Self {
            Self {
                rates: rates
                    .iter()
                    .map(|&(code, rate)| (code.to_string(), rate.to_string()))
                    .collect(),
                counts: HashMap::new(),
                failing_code: None,
                rate_calls: AtomicUsize::new(0),
            }
        }

        fn with_count(mut self, code: &'static str, count: Decimal) -> Self {
            self.counts.insert(code, count);
            self
        }

        fn with_failing_code(mut self, code: &'static str) -> Self {
            self.failing_code = Some(code);
            self
        }
    }

    #[async_trait]
    impl BankNoteApi for StubApi {
        async fn fetch_banknote_observations(
            &self,
            denomination_code: &str,
            start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<BankNoteObservation>> {
            if self.failing_code == Some(denomination_code) {
                return Err(NoteError::UpstreamDataError {
                    message: format!("series {} unavailable", denomination_code),
                });
            }

            Ok(self
                .counts
                .get(denomination_code)
                .map(|&value| {
                    vec![BankNoteObservation {
                        period: start,
                        period_code: "M".to_string(),
                        value,
                    }]
                })
                .unwrap_or_default())
        }

        async fn fetch_daily_exchange_rates(
            &self,
            _date: NaiveDate,
            _currencies: Option<&[String]>,
        ) -> Result<HashMap<String, String>> {
            self.rate_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rates.clone())
        }
    }

    fn filters() -> BankNoteFilters {
        BankNoteFilters {
            start_period: Utc::now() - chrono::Duration::days(30),
            end_period: Utc::now(),
        }
    }

    fn service(api: Arc<StubApi>) -> EuroNoteService {
        EuroNoteService::new(api, Arc::new(MemoryCache::new()), None)
    }

    #[tokio::test]
    async fn summaries_are_sorted_ascending_by_denomination() {
        let mut api = StubApi::new(&[("USD", "2,0")]);
        for &(code, _) in &DENOMINATIONS {
            api = api.with_count(code, dec!(100));
        }

        let result = service(Arc::new(api))
            .get_note_summaries(&filters())
            .await
            .unwrap();

        let denominations: Vec<u32> = result.iter().map(|s| s.denomination).collect();
        assert_eq!(denominations, vec![5, 10, 20, 50, 100, 200, 500]);
    }

    #[tokio::test]
    async fn converts_count_through_exchange_rate() {
        let api = StubApi::new(&[("USD", "1,5")]).with_count("B10", dec!(50));

        let result = service(Arc::new(api))
            .get_note_summaries(&filters())
            .await
            .unwrap();
        let tens = result.iter().find(|s| s.denomination == 10).unwrap();

        assert_eq!(tens.denomination_code, "B10");
        assert_eq!(tens.currency_code, "EUR");
        assert_eq!(tens.count, 50);
        assert_eq!(tens.value, dec!(500));

        let usd = tens
            .currency_values
            .iter()
            .find(|c| c.currency_code == "USD")
            .unwrap();
        assert_eq!(usd.exchange_rate, "1.5");
        assert_eq!(usd.value, "750.0");
    }

    #[tokio::test]
    async fn missing_observations_mean_zero_count_and_value() {
        let api = StubApi::new(&[("USD", "2,0")]);

        let result = service(Arc::new(api))
            .get_note_summaries(&filters())
            .await
            .unwrap();

        assert_eq!(result.len(), 7);
        for summary in &result {
            assert_eq!(summary.count, 0);
            assert_eq!(summary.value, Decimal::ZERO);
        }
    }

    #[tokio::test]
    async fn failing_denomination_is_skipped_not_fatal() {
        let mut api = StubApi::new(&[("USD", "2,0")]);
        for &(code, _) in &DENOMINATIONS {
            api = api.with_count(code, dec!(10));
        }
        let api = api.with_failing_code("B100");

        let result = service(Arc::new(api))
            .get_note_summaries(&filters())
            .await
            .unwrap();

        let denominations: Vec<u32> = result.iter().map(|s| s.denomination).collect();
        assert_eq!(denominations, vec![5, 10, 20, 50, 200, 500]);
    }

    #[tokio::test]
    async fn rate_table_is_fetched_once_within_ttl_window() {
        let api = Arc::new(StubApi::new(&[("USD", "2,0")]).with_count("B5", dec!(1)));
        let service = service(api.clone());

        service.get_note_summaries(&filters()).await.unwrap();
        service.get_note_summaries(&filters()).await.unwrap();
        service.get_note_summaries(&filters()).await.unwrap();

        assert_eq!(api.rate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rate_fetch_failure_fails_the_whole_call() {
        struct BrokenRates;

        #[async_trait]
        impl BankNoteApi for BrokenRates {
            async fn fetch_banknote_observations(
                &self,
                _denomination_code: &str,
                _start: DateTime<Utc>,
                _end: DateTime<Utc>,
            ) -> Result<Vec<BankNoteObservation>> {
                Ok(Vec::new())
            }

            async fn fetch_daily_exchange_rates(
                &self,
                _date: NaiveDate,
                _currencies: Option<&[String]>,
            ) -> Result<HashMap<String, String>> {
                Err(NoteError::UpstreamDataError {
                    message: "rates endpoint down".to_string(),
                })
            }
        }

        let service =
            EuroNoteService::new(Arc::new(BrokenRates), Arc::new(MemoryCache::new()), None);

        assert!(service.get_note_summaries(&filters()).await.is_err());
    }

    #[tokio::test]
    async fn malformed_rate_text_is_a_hard_error() {
        let api = StubApi::new(&[("USD", "not-a-number")]).with_count("B5", dec!(1));

        let result = service(Arc::new(api)).get_note_summaries(&filters()).await;

        // Rates parse inside each summary build; with every denomination
        // failing the same way the batch comes back empty.
        assert_eq!(result.unwrap().len(), 0);
    }
}
