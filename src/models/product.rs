//! Product model
//!
//! Marketplace listings owned by a vendor. Vendors may fill in only some of
//! the size fields.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::sizing::{Listing, SizeFields};

/// Product category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Ring,
    Bracelet,
    Necklace,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ring => "RING",
            Category::Bracelet => "BRACELET",
            Category::Necklace => "NECKLACE",
            Category::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RING" => Some(Category::Ring),
            "BRACELET" => Some(Category::Bracelet),
            "NECKLACE" => Some(Category::Necklace),
            "OTHER" => Some(Category::Other),
            _ => None,
        }
    }
}

/// Gold purity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Karat {
    #[serde(rename = "9K")]
    K9,
    #[serde(rename = "14K")]
    K14,
    #[serde(rename = "18K")]
    K18,
    #[serde(rename = "22K")]
    K22,
    #[serde(rename = "24K")]
    K24,
}

impl Karat {
    pub const ALL: [Karat; 5] = [Karat::K9, Karat::K14, Karat::K18, Karat::K22, Karat::K24];

    pub fn as_str(&self) -> &'static str {
        match self {
            Karat::K9 => "9K",
            Karat::K14 => "14K",
            Karat::K18 => "18K",
            Karat::K22 => "22K",
            Karat::K24 => "24K",
        }
    }

    /// Accepts "18K", "18k" or "18"
    pub fn from_str(s: &str) -> Option<Self> {
        let upper = s.trim().to_uppercase();
        match upper.trim_end_matches('K') {
            "9" => Some(Karat::K9),
            "14" => Some(Karat::K14),
            "18" => Some(Karat::K18),
            "22" => Some(Karat::K22),
            "24" => Some(Karat::K24),
            _ => None,
        }
    }

    /// Parts of gold out of 24
    pub fn parts(&self) -> u8 {
        match self {
            Karat::K9 => 9,
            Karat::K14 => 14,
            Karat::K18 => 18,
            Karat::K22 => 22,
            Karat::K24 => 24,
        }
    }

    /// Gold fraction by mass (18K is 0.75)
    pub fn purity(&self) -> f64 {
        f64::from(self.parts()) / 24.0
    }
}

/// A marketplace listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub karat: Option<Karat>,
    pub category: Category,
    pub main_image_url: Option<String>,
    pub is_available: bool,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    /// Grams
    pub weight: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub karat: Option<Karat>,
    pub category: Category,
    pub main_image_url: Option<String>,
    #[serde(default = "default_available")]
    pub is_available: bool,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub weight: Option<f64>,
}

pub fn default_currency() -> String {
    "EUR".to_string()
}

fn default_available() -> bool {
    true
}

/// Data for updating a product; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub karat: Option<Karat>,
    pub category: Option<Category>,
    pub main_image_url: Option<String>,
    pub is_available: Option<bool>,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub weight: Option<f64>,
}

/// Catalog query filters; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub category: Option<Category>,
    pub karat: Option<Karat>,
    pub vendor_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl Product {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            vendor_id: row.get("vendor_id")?,
            name: row.get("name")?,
            description: row.get("description")?,
            price: row.get("price")?,
            currency: row.get("currency")?,
            karat: row
                .get::<_, Option<String>>("karat")?
                .as_deref()
                .and_then(Karat::from_str),
            category: Category::from_str(row.get::<_, String>("category")?.as_str())
                .unwrap_or_default(),
            main_image_url: row.get("main_image_url")?,
            is_available: row.get("is_available")?,
            diameter_mm: row.get("diameter_mm")?,
            circumference_mm: row.get("circumference_mm")?,
            size_eu: row.get("size_eu")?,
            size_us: row.get("size_us")?,
            weight: row.get("weight")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a product for a vendor
    pub fn create(conn: &Connection, vendor_id: i64, data: &ProductCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO products (
                vendor_id, name, description, price, currency, karat, category,
                main_image_url, is_available,
                diameter_mm, circumference_mm, size_eu, size_us, weight
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                vendor_id,
                data.name,
                data.description,
                data.price,
                data.currency,
                data.karat.map(|k| k.as_str()),
                data.category.as_str(),
                data.main_image_url,
                data.is_available,
                data.diameter_mm,
                data.circumference_mm,
                data.size_eu,
                data.size_us,
                data.weight,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound {
            entity: "Product",
            id,
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM products WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(product) => Ok(Some(product)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Available products matching the filter, in catalog (id) order
    pub fn list_available(conn: &Connection, filter: &ProductFilter) -> DbResult<Vec<Self>> {
        let mut clauses = vec!["is_available = 1".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(category) = filter.category {
            params_vec.push(Box::new(category.as_str()));
            clauses.push(format!("category = ?{}", params_vec.len()));
        }
        if let Some(karat) = filter.karat {
            params_vec.push(Box::new(karat.as_str()));
            clauses.push(format!("karat = ?{}", params_vec.len()));
        }
        if let Some(vendor_id) = filter.vendor_id {
            params_vec.push(Box::new(vendor_id));
            clauses.push(format!("vendor_id = ?{}", params_vec.len()));
        }
        if let Some(min_price) = filter.min_price {
            params_vec.push(Box::new(min_price));
            clauses.push(format!("price >= ?{}", params_vec.len()));
        }
        if let Some(max_price) = filter.max_price {
            params_vec.push(Box::new(max_price));
            clauses.push(format!("price <= ?{}", params_vec.len()));
        }

        let sql = format!(
            "SELECT * FROM products WHERE {} ORDER BY id ASC",
            clauses.join(" AND ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let products = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Every product of a vendor, available or not, newest first
    pub fn list_for_vendor(conn: &Connection, vendor_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM products WHERE vendor_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;

        let products = stmt
            .query_map([vendor_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(products)
    }

    /// Update a vendor's product; None if the vendor does not own it
    pub fn update(
        conn: &Connection,
        vendor_id: i64,
        id: i64,
        data: &ProductUpdate,
    ) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident, $col:expr) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name, "name");
        add_update!(description, "description");
        add_update!(price, "price");
        add_update!(currency, "currency");
        add_update!(main_image_url, "main_image_url");
        add_update!(is_available, "is_available");
        add_update!(diameter_mm, "diameter_mm");
        add_update!(circumference_mm, "circumference_mm");
        add_update!(size_eu, "size_eu");
        add_update!(size_us, "size_us");
        add_update!(weight, "weight");

        if let Some(karat) = data.karat {
            updates.push(format!("karat = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(karat.as_str()));
        }
        if let Some(category) = data.category {
            updates.push(format!("category = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(category.as_str()));
        }

        let owned = Self::get_by_id(conn, id)?.filter(|p| p.vendor_id == vendor_id);
        if owned.is_none() || updates.is_empty() {
            return Ok(owned);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE products SET {} WHERE id = ?{} AND vendor_id = ?{}",
            updates.join(", "),
            params_vec.len() + 1,
            params_vec.len() + 2
        );
        params_vec.push(Box::new(id));
        params_vec.push(Box::new(vendor_id));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a vendor's product; Ok(false) if the vendor does not own it
    pub fn delete(conn: &Connection, vendor_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM products WHERE id = ?1 AND vendor_id = ?2",
            params![id, vendor_id],
        )?;
        Ok(rows > 0)
    }
}

impl SizeFields for Product {
    fn diameter_mm(&self) -> Option<f64> {
        self.diameter_mm
    }

    fn circumference_mm(&self) -> Option<f64> {
        self.circumference_mm
    }

    fn size_eu(&self) -> Option<f64> {
        self.size_eu
    }

    fn size_us(&self) -> Option<f64> {
        self.size_us
    }
}

impl Listing for Product {
    fn is_available(&self) -> bool {
        self.is_available
    }
}
