//! Vendor model
//!
//! A vendor user's shop profile.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// Description given to auto-created shops
pub const DEFAULT_SHOP_DESCRIPTION: &str = "Gold jewelry shop";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub user_id: i64,
    pub shop_name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Vendor {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            shop_name: row.get("shop_name")?,
            description: row.get("description")?,
            logo_url: row.get("logo_url")?,
            website_url: row.get("website_url")?,
            is_verified: row.get("is_verified")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM vendors WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(vendor) => Ok(Some(vendor)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_user(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM vendors WHERE user_id = ?1")?;

        match stmt.query_row([user_id], Self::from_row) {
            Ok(vendor) => Ok(Some(vendor)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch the user's shop, opening an unverified one named
    /// "<owner> Shop" on first use
    pub fn get_or_create_for_user(conn: &Connection, user_id: i64, owner: &str) -> DbResult<Self> {
        if let Some(vendor) = Self::get_by_user(conn, user_id)? {
            return Ok(vendor);
        }

        conn.execute(
            r#"
            INSERT INTO vendors (user_id, shop_name, description, is_verified)
            VALUES (?1, ?2, ?3, 0)
            "#,
            params![user_id, format!("{} Shop", owner), DEFAULT_SHOP_DESCRIPTION],
        )?;

        let id = conn.last_insert_rowid();
        tracing::info!("Created vendor profile {} for user {}", id, user_id);

        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound {
            entity: "Vendor",
            id,
        })
    }
}
