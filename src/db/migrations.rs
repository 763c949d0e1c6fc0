//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- VENDORS
        -- One shop per vendor user
        -- ============================================
        CREATE TABLE vendors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            shop_name TEXT NOT NULL,
            description TEXT,
            logo_url TEXT,
            website_url TEXT,
            is_verified INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- PRODUCTS
        -- Marketplace listings; every size field is optional
        -- ============================================
        CREATE TABLE products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            vendor_id INTEGER NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            price REAL NOT NULL CHECK(price >= 0),
            currency TEXT NOT NULL DEFAULT 'EUR',
            karat TEXT CHECK(karat IN ('9K', '14K', '18K', '22K', '24K')),
            category TEXT NOT NULL CHECK(category IN ('RING', 'BRACELET', 'NECKLACE', 'OTHER')),
            main_image_url TEXT,
            is_available INTEGER NOT NULL DEFAULT 1,

            diameter_mm REAL,
            circumference_mm REAL,
            size_eu REAL,
            size_us REAL,
            weight REAL,                          -- grams

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_products_vendor ON products(vendor_id);
        CREATE INDEX idx_products_category ON products(category);
        CREATE INDEX idx_products_available ON products(is_available);

        -- ============================================
        -- MEASUREMENTS
        -- Saved sizing results, owned by a user
        -- ============================================
        CREATE TABLE measurements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK(type IN ('RING', 'FINGER', 'BRACELET')),
            diameter_mm REAL,
            circumference_mm REAL,
            size_eu REAL,
            size_us REAL,
            last_synced_at TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_measurements_user ON measurements(user_id);

        -- ============================================
        -- GOLD PRICE HISTORY
        -- One price per karat per day
        -- ============================================
        CREATE TABLE gold_price_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            karat TEXT NOT NULL CHECK(karat IN ('9K', '14K', '18K', '22K', '24K')),
            price_per_gram REAL NOT NULL,
            currency TEXT NOT NULL DEFAULT 'EUR',
            date_recorded TEXT NOT NULL,          -- ISO date: "2025-01-09"
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            UNIQUE(karat, date_recorded)
        );

        CREATE INDEX idx_gold_price_date ON gold_price_history(date_recorded);

        -- ============================================
        -- USER SETTINGS
        -- ============================================
        CREATE TABLE user_settings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            preferred_unit TEXT NOT NULL DEFAULT 'MM' CHECK(preferred_unit IN ('MM', 'INCH')),
            language TEXT NOT NULL DEFAULT 'FR' CHECK(language IN ('FR', 'EN')),
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version; 0 before the migrations table exists
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let has_table: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_migrations'",
        [],
        |row| row.get(0),
    )?;
    if !has_table {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}
