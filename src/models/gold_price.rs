//! Gold price model
//!
//! Daily price-per-gram history, one row per karat per day.

use chrono::{Months, NaiveDate};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::Karat;

/// Date format used by `date_recorded`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Look-back window for price history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PricePeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl PricePeriod {
    /// Unknown periods fall back to a month
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "day" => PricePeriod::Day,
            "week" => PricePeriod::Week,
            "year" => PricePeriod::Year,
            _ => PricePeriod::Month,
        }
    }

    /// First day included in the window ending `today`
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            PricePeriod::Day => today,
            PricePeriod::Week => today - chrono::Duration::days(7),
            PricePeriod::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
            PricePeriod::Year => today.checked_sub_months(Months::new(12)).unwrap_or(today),
        }
    }
}

/// One recorded gold price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldPrice {
    pub id: i64,
    pub karat: Karat,
    pub price_per_gram: f64,
    pub currency: String,
    pub date_recorded: String,
    pub created_at: String,
    pub updated_at: String,
}

impl GoldPrice {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let karat_str: String = row.get("karat")?;
        let karat = Karat::from_str(&karat_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(
                0,
                format!("karat '{}'", karat_str),
                rusqlite::types::Type::Text,
            )
        })?;

        Ok(Self {
            id: row.get("id")?,
            karat,
            price_per_gram: row.get("price_per_gram")?,
            currency: row.get("currency")?,
            date_recorded: row.get("date_recorded")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Price for a karat on a given day
    pub fn get(conn: &Connection, karat: Karat, date: NaiveDate) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM gold_price_history WHERE karat = ?1 AND date_recorded = ?2",
        )?;

        let date_str = date.format(DATE_FORMAT).to_string();
        match stmt.query_row(params![karat.as_str(), date_str], Self::from_row) {
            Ok(price) => Ok(Some(price)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite the price for a karat and day
    ///
    /// Returns the stored row and whether it was newly created.
    pub fn upsert(
        conn: &Connection,
        karat: Karat,
        price_per_gram: f64,
        currency: &str,
        date: NaiveDate,
    ) -> DbResult<(Self, bool)> {
        let existed = Self::get(conn, karat, date)?.is_some();
        let date_str = date.format(DATE_FORMAT).to_string();

        conn.execute(
            r#"
            INSERT INTO gold_price_history (karat, price_per_gram, currency, date_recorded)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(karat, date_recorded) DO UPDATE SET
                price_per_gram = excluded.price_per_gram,
                currency = excluded.currency,
                updated_at = datetime('now')
            "#,
            params![karat.as_str(), price_per_gram, currency, date_str],
        )?;

        let stored = Self::get(conn, karat, date)?.ok_or(DbError::NotFound {
            entity: "GoldPrice",
            id: conn.last_insert_rowid(),
        })?;
        Ok((stored, !existed))
    }

    /// Insert the price only if the day has none yet
    pub fn insert_if_missing(
        conn: &Connection,
        karat: Karat,
        price_per_gram: f64,
        currency: &str,
        date: NaiveDate,
    ) -> DbResult<bool> {
        let rows = conn.execute(
            r#"
            INSERT OR IGNORE INTO gold_price_history (karat, price_per_gram, currency, date_recorded)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                karat.as_str(),
                price_per_gram,
                currency,
                date.format(DATE_FORMAT).to_string()
            ],
        )?;
        Ok(rows > 0)
    }

    /// Prices between two days (inclusive), oldest first
    pub fn list_range(
        conn: &Connection,
        karat: Option<Karat>,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> DbResult<Vec<Self>> {
        let mut clauses = vec!["date_recorded >= ?1".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> =
            vec![Box::new(start.format(DATE_FORMAT).to_string())];

        if let Some(end) = end {
            params_vec.push(Box::new(end.format(DATE_FORMAT).to_string()));
            clauses.push(format!("date_recorded <= ?{}", params_vec.len()));
        }
        if let Some(karat) = karat {
            params_vec.push(Box::new(karat.as_str()));
            clauses.push(format!("karat = ?{}", params_vec.len()));
        }

        let sql = format!(
            "SELECT * FROM gold_price_history WHERE {} ORDER BY date_recorded ASC, karat ASC",
            clauses.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let prices = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(prices)
    }

    /// Most recent price for a karat
    pub fn latest(conn: &Connection, karat: Karat) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM gold_price_history WHERE karat = ?1 ORDER BY date_recorded DESC LIMIT 1",
        )?;

        match stmt.query_row([karat.as_str()], Self::from_row) {
            Ok(price) => Ok(Some(price)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_period_start_dates() {
        let today = day("2025-03-31");
        assert_eq!(PricePeriod::Day.start_date(today), today);
        assert_eq!(PricePeriod::Week.start_date(today), day("2025-03-24"));
        assert_eq!(PricePeriod::Month.start_date(today), day("2025-02-28"));
        assert_eq!(PricePeriod::Year.start_date(today), day("2024-03-31"));
        assert_eq!(PricePeriod::from_str("bogus"), PricePeriod::Month);
    }

    #[test]
    fn test_upsert_is_unique_per_day() {
        let conn = setup();
        let (first, created) =
            GoldPrice::upsert(&conn, Karat::K24, 60.0, "EUR", day("2025-01-09")).unwrap();
        assert!(created);
        assert_eq!(first.price_per_gram, 60.0);

        let (second, created) =
            GoldPrice::upsert(&conn, Karat::K24, 61.5, "EUR", day("2025-01-09")).unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.price_per_gram, 61.5);

        let (other, created) =
            GoldPrice::upsert(&conn, Karat::K18, 45.0, "EUR", day("2025-01-09")).unwrap();
        assert!(created);
        assert_ne!(other.id, first.id);
    }

    #[test]
    fn test_insert_if_missing_keeps_existing() {
        let conn = setup();
        assert!(GoldPrice::insert_if_missing(&conn, Karat::K18, 45.0, "EUR", day("2025-01-01")).unwrap());
        assert!(!GoldPrice::insert_if_missing(&conn, Karat::K18, 99.0, "EUR", day("2025-01-01")).unwrap());
        let stored = GoldPrice::get(&conn, Karat::K18, day("2025-01-01")).unwrap().unwrap();
        assert_eq!(stored.price_per_gram, 45.0);
    }

    #[test]
    fn test_list_range_and_latest() {
        let conn = setup();
        for (date, price) in [("2025-01-03", 62.0), ("2025-01-01", 60.0), ("2025-01-02", 61.0)] {
            GoldPrice::upsert(&conn, Karat::K24, price, "EUR", day(date)).unwrap();
            GoldPrice::upsert(&conn, Karat::K18, price * 0.75, "EUR", day(date)).unwrap();
        }

        let k24 = GoldPrice::list_range(&conn, Some(Karat::K24), day("2025-01-02"), None).unwrap();
        let dates: Vec<&str> = k24.iter().map(|p| p.date_recorded.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-02", "2025-01-03"]);

        let both = GoldPrice::list_range(&conn, None, day("2025-01-01"), Some(day("2025-01-01")))
            .unwrap();
        assert_eq!(both.len(), 2);

        let latest = GoldPrice::latest(&conn, Karat::K18).unwrap().unwrap();
        assert_eq!(latest.date_recorded, "2025-01-03");
        assert_eq!(latest.price_per_gram, 46.5);
        assert!(GoldPrice::latest(&conn, Karat::K9).unwrap().is_none());
    }
}
