use crate::domain::model::BankNoteObservation;
use crate::domain::ports::BankNoteApi;
use crate::utils::error::{NoteError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

/// Dataset holding the euro banknote circulation series.
const DATASET: &str = "BOF_BKN1_PUBL";

// ============ BoF API response models ============

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BofObservationsResponse {
    items: Option<Vec<BofSeriesItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BofSeriesItem {
    #[serde(default)]
    observations: Vec<BofObservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BofObservation {
    period: String,
    period_code: String,
    value: Decimal,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRateInfo {
    currency: String,
    exchange_rates: Option<Vec<ObservationRate>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObservationRate {
    value: String,
}

/// Client for the Bank of Finland open data API.
pub struct BofApiClient {
    client: Client,
    base_url: String,
}

impl BofApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    // Series naming is an upstream detail; callers only know denomination codes.
    fn build_count_series_name(code: &str) -> String {
        format!("M.FI.NC.BN.EUR.{}.ALL.PN.ST.F.XX", code)
    }

    fn parse_period(text: &str) -> Result<DateTime<Utc>> {
        if let Ok(period) = DateTime::parse_from_rfc3339(text) {
            return Ok(period.with_timezone(&Utc));
        }
        if let Ok(period) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            return Ok(period.and_utc());
        }
        if let Ok(period) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Ok(period.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
        }

        Err(NoteError::UpstreamDataError {
            message: format!("Unparseable observation period: {}", text),
        })
    }
}

#[async_trait]
impl BankNoteApi for BofApiClient {
    async fn fetch_banknote_observations(
        &self,
        denomination_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BankNoteObservation>> {
        let series_name = Self::build_count_series_name(denomination_code);
        let url = format!("{}/v4/observations/{}", self.base_url, DATASET);
        let start_period = start.to_rfc3339();
        let end_period = end.to_rfc3339();

        tracing::debug!("Fetching observations for series {}", series_name);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("seriesName", series_name.as_str()),
                ("startPeriod", start_period.as_str()),
                ("endPeriod", end_period.as_str()),
                ("pageSize", "1000"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let dto: BofObservationsResponse = response.json().await?;
        let observations = dto
            .items
            .and_then(|items| items.into_iter().next())
            .map(|item| item.observations)
            .unwrap_or_default();

        observations
            .into_iter()
            .map(|obs| {
                Ok(BankNoteObservation {
                    period: Self::parse_period(&obs.period)?,
                    period_code: obs.period_code,
                    value: obs.value,
                })
            })
            .collect()
    }

    async fn fetch_daily_exchange_rates(
        &self,
        date: NaiveDate,
        currencies: Option<&[String]>,
    ) -> Result<HashMap<String, String>> {
        let url = format!("{}/referencerates/v2/api/V2", self.base_url);
        let day = date.format("%Y-%m-%d").to_string();

        let mut query = vec![("startDate", day.clone()), ("endDate", day)];
        if let Some(currencies) = currencies.filter(|c| !c.is_empty()) {
            query.push(("currencies", currencies.join(",")));
        }

        tracing::debug!("Fetching daily exchange rates for {}", date);
        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let dto: Vec<ExchangeRateInfo> = response.json().await?;
        Ok(dto
            .into_iter()
            .map(|info| {
                let rate = info
                    .exchange_rates
                    .and_then(|rates| rates.into_iter().next())
                    .map(|rate| rate.value)
                    .unwrap_or_else(|| "0".to_string());
                (info.currency, rate)
            })
            .collect())
    }
}
