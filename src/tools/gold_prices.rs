//! Gold price MCP Tools
//!
//! Price history queries and daily price recording.

use chrono::NaiveDate;
use serde::Serialize;

use super::error::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{GoldPrice, Karat, PricePeriod, DATE_FORMAT};

/// Latest price for a karat, as shown in the summary
#[derive(Debug, Serialize)]
pub struct LatestPrice {
    pub price_per_gram: f64,
    pub currency: String,
    pub date: String,
}

impl From<GoldPrice> for LatestPrice {
    fn from(price: GoldPrice) -> Self {
        Self {
            price_per_gram: price.price_per_gram,
            currency: price.currency,
            date: price.date_recorded,
        }
    }
}

/// Latest 24K and 18K prices
#[derive(Debug, Serialize)]
pub struct LatestSummary {
    #[serde(rename = "24K")]
    pub k24: Option<LatestPrice>,
    #[serde(rename = "18K")]
    pub k18: Option<LatestPrice>,
}

#[derive(Debug, Serialize)]
pub struct GoldPricesResponse {
    pub data: Vec<GoldPrice>,
    pub total: usize,
    pub start_date: String,
    pub end_date: Option<String>,
    pub latest: LatestSummary,
}

#[derive(Debug, Serialize)]
pub struct RecordGoldPriceResponse {
    #[serde(flatten)]
    pub price: GoldPrice,
    pub created: bool,
}

fn parse_date(field: &str, value: &str) -> ToolResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| {
            ToolError::invalid(format!(
                "{} must be a date in YYYY-MM-DD format, got '{}'",
                field, value
            ))
        })
}

fn parse_karat(value: &str) -> ToolResult<Karat> {
    Karat::from_str(value).ok_or_else(|| {
        ToolError::invalid(format!(
            "Unknown karat '{}'. Expected one of: 9K, 14K, 18K, 22K, 24K",
            value
        ))
    })
}

/// Price history for a period or an explicit date range
///
/// `start_date` alone is enough to select a custom range and then wins over
/// `period`; `end_date` is optional and only read when `start_date` is set.
/// Without `end_date` the range is open-ended.
pub fn list_gold_prices(
    db: &Database,
    karat: Option<&str>,
    period: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
    today: NaiveDate,
) -> ToolResult<GoldPricesResponse> {
    let karat = karat.map(parse_karat).transpose()?;

    let (start, end) = match start_date {
        Some(start) => {
            let start = parse_date("start_date", start)?;
            let end = end_date.map(|e| parse_date("end_date", e)).transpose()?;
            if let Some(end) = end {
                if end < start {
                    return Err(ToolError::invalid("end_date cannot be before start_date"));
                }
            }
            (start, end)
        }
        None => {
            let period = period.map(PricePeriod::from_str).unwrap_or_default();
            (period.start_date(today), None)
        }
    };

    let (data, k24, k18) = db
        .with_conn(|conn| {
            let data = GoldPrice::list_range(conn, karat, start, end)?;
            let k24 = GoldPrice::latest(conn, Karat::K24)?;
            let k18 = GoldPrice::latest(conn, Karat::K18)?;
            Ok((data, k24, k18))
        })?;

    Ok(GoldPricesResponse {
        total: data.len(),
        data,
        start_date: start.format(DATE_FORMAT).to_string(),
        end_date: end.map(|e| e.format(DATE_FORMAT).to_string()),
        latest: LatestSummary {
            k24: k24.map(LatestPrice::from),
            k18: k18.map(LatestPrice::from),
        },
    })
}

/// Record (or correct) the price of a karat for one day
pub fn record_gold_price(
    db: &Database,
    karat: &str,
    price_per_gram: f64,
    currency: Option<&str>,
    date: Option<&str>,
    today: NaiveDate,
) -> ToolResult<RecordGoldPriceResponse> {
    let karat = parse_karat(karat)?;
    if !price_per_gram.is_finite() || price_per_gram <= 0.0 {
        return Err(ToolError::invalid("price_per_gram must be greater than zero"));
    }
    let date = date.map(|d| parse_date("date", d)).transpose()?.unwrap_or(today);
    let currency = currency
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "EUR".to_string());

    let (price, created) = db
        .with_conn(|conn| GoldPrice::upsert(conn, karat, price_per_gram, &currency, date))?;

    tracing::info!(
        "Gold price {} {} {} for {} ({})",
        karat.as_str(),
        price.price_per_gram,
        price.currency,
        price.date_recorded,
        if created { "created" } else { "updated" }
    );

    Ok(RecordGoldPriceResponse { price, created })
}
