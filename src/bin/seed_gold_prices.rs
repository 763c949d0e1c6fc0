//! Utility to seed gold price history
//!
//! Usage: seed_gold_prices [days] [--overwrite]

use chrono::{Duration, Local};
use rand::Rng;

use ringfit::models::{GoldPrice, Karat};
use ringfit::sizing::round_to;

const BASE_PRICE_24K: f64 = 60.0;
const DEFAULT_DAYS: i64 = 90;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut days = DEFAULT_DAYS;
    let mut overwrite = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--overwrite" => overwrite = true,
            other => {
                days = other
                    .parse()
                    .map_err(|_| format!("expected a number of days, got '{}'", other))?;
            }
        }
    }
    if days <= 0 {
        return Err("days must be at least 1".into());
    }

    let db_path = ringfit::config::database_path();
    println!("Database path: {}", db_path.display());
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = ringfit::db::Database::new(&db_path)?;
    database.with_conn(|conn| {
        ringfit::db::migrations::run_migrations(conn)?;
        Ok(())
    })?;

    let today = Local::now().date_naive();
    let mut rng = rand::thread_rng();

    let (written, skipped) = database.with_conn_mut(|conn| {
        let tx = conn.transaction()?;
        let mut written = 0;
        let mut skipped = 0;

        for offset in (0..days).rev() {
            let date = today - Duration::days(offset);
            let variation = rng.gen_range(-50..=50) as f64 / 1000.0;
            let price_24k = round_to(BASE_PRICE_24K * (1.0 + variation), 2);
            let price_18k = round_to(price_24k * Karat::K18.purity(), 2);

            for (karat, price) in [(Karat::K24, price_24k), (Karat::K18, price_18k)] {
                let stored = if overwrite {
                    GoldPrice::upsert(&tx, karat, price, "EUR", date)?;
                    true
                } else {
                    GoldPrice::insert_if_missing(&tx, karat, price, "EUR", date)?
                };
                if stored {
                    written += 1;
                } else {
                    skipped += 1;
                }
            }
        }

        tx.commit()?;
        Ok((written, skipped))
    })?;

    println!("Gold prices seeded for the last {} days:", days);
    println!("  Written: {}", written);
    println!("  Kept existing: {}", skipped);

    Ok(())
}
