//! Product MCP Tools
//!
//! Catalog browsing and vendor product management.

use serde::Serialize;

use super::error::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Product, ProductCreate, ProductFilter, ProductUpdate, Vendor};

/// Response for list_products and list_vendor_products
#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Vec<Product>,
    pub total: usize,
}

/// Response for delete_vendor_product
#[derive(Debug, Serialize)]
pub struct DeleteProductResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Vendor forms send 0 for "not specified"; store those as absent
pub fn size_or_none(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

fn validate_price(price: f64) -> ToolResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ToolError::invalid("price must be a non-negative number"));
    }
    Ok(())
}

/// Available products, optionally filtered
pub fn list_products(db: &Database, filter: &ProductFilter) -> ToolResult<ListProductsResponse> {
    if let (Some(min), Some(max)) = (filter.min_price, filter.max_price) {
        if min > max {
            return Err(ToolError::invalid("min_price cannot exceed max_price"));
        }
    }

    let products = db.with_conn(|conn| Product::list_available(conn, filter))?;

    Ok(ListProductsResponse {
        total: products.len(),
        products,
    })
}

pub fn get_product(db: &Database, id: i64) -> ToolResult<Option<Product>> {
    Ok(db.with_conn(|conn| Product::get_by_id(conn, id))?)
}

/// The user's shop, opened on first use
pub fn get_vendor_profile(db: &Database, user_id: i64, owner: &str) -> ToolResult<Vendor> {
    Ok(db.with_conn(|conn| Vendor::get_or_create_for_user(conn, user_id, owner))?)
}

/// Every product of the user's shop, available or not
pub fn list_vendor_products(
    db: &Database,
    user_id: i64,
    owner: &str,
) -> ToolResult<ListProductsResponse> {
    let products = db
        .with_conn(|conn| {
            let vendor = Vendor::get_or_create_for_user(conn, user_id, owner)?;
            Product::list_for_vendor(conn, vendor.id)
        })?;

    Ok(ListProductsResponse {
        total: products.len(),
        products,
    })
}

pub fn add_vendor_product(
    db: &Database,
    user_id: i64,
    owner: &str,
    mut data: ProductCreate,
) -> ToolResult<Product> {
    let name = data.name.trim();
    if name.is_empty() {
        return Err(ToolError::invalid("Product name cannot be empty"));
    }
    data.name = name.to_string();
    validate_price(data.price)?;

    data.diameter_mm = size_or_none(data.diameter_mm);
    data.circumference_mm = size_or_none(data.circumference_mm);
    data.size_eu = size_or_none(data.size_eu);
    data.size_us = size_or_none(data.size_us);
    data.weight = size_or_none(data.weight);

    let product = db
        .with_conn(|conn| {
            let vendor = Vendor::get_or_create_for_user(conn, user_id, owner)?;
            Product::create(conn, vendor.id, &data)
        })
        .map_err(|e| {
            tracing::error!("Failed to create product for user {}: {}", user_id, e);
            e
        })?;

    tracing::info!(
        "Product {} created for vendor {}",
        product.id,
        product.vendor_id
    );
    Ok(product)
}

pub fn update_vendor_product(
    db: &Database,
    user_id: i64,
    owner: &str,
    id: i64,
    mut data: ProductUpdate,
) -> ToolResult<Option<Product>> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err(ToolError::invalid("Product name cannot be empty"));
        }
    }
    if let Some(price) = data.price {
        validate_price(price)?;
    }

    data.diameter_mm = size_or_none(data.diameter_mm);
    data.circumference_mm = size_or_none(data.circumference_mm);
    data.size_eu = size_or_none(data.size_eu);
    data.size_us = size_or_none(data.size_us);
    data.weight = size_or_none(data.weight);

    let updated = db.with_conn(|conn| {
        let vendor = Vendor::get_or_create_for_user(conn, user_id, owner)?;
        Product::update(conn, vendor.id, id, &data)
    })?;
    Ok(updated)
}

pub fn delete_vendor_product(
    db: &Database,
    user_id: i64,
    owner: &str,
    id: i64,
) -> ToolResult<Option<DeleteProductResponse>> {
    let deleted = db
        .with_conn(|conn| {
            let vendor = Vendor::get_or_create_for_user(conn, user_id, owner)?;
            Product::delete(conn, vendor.id, id)
        })?;

    Ok(deleted.then_some(DeleteProductResponse {
        success: true,
        deleted_id: id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{default_currency, Category, Karat};

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn bracelet(name: &str) -> ProductCreate {
        ProductCreate {
            name: name.to_string(),
            description: Some("Rigid bangle".to_string()),
            price: 780.0,
            currency: default_currency(),
            karat: Some(Karat::K22),
            category: Category::Bracelet,
            main_image_url: None,
            is_available: true,
            diameter_mm: Some(62.0),
            circumference_mm: Some(0.0),
            size_eu: None,
            size_us: Some(0.0),
            weight: Some(12.5),
        }
    }

    #[test]
    fn test_add_coerces_zero_sizes() {
        let db = setup();
        let product = add_vendor_product(&db, 7, "Ana", bracelet("  Bangle ")).unwrap();
        assert_eq!(product.name, "Bangle");
        assert_eq!(product.diameter_mm, Some(62.0));
        assert_eq!(product.circumference_mm, None);
        assert_eq!(product.size_us, None);
        assert_eq!(product.weight, Some(12.5));
    }

    #[test]
    fn test_add_validates() {
        let db = setup();
        assert!(add_vendor_product(&db, 7, "Ana", bracelet(" ")).is_err());
        let negative = ProductCreate {
            price: -1.0,
            ..bracelet("Bangle")
        };
        assert!(add_vendor_product(&db, 7, "Ana", negative).is_err());
    }

    #[test]
    fn test_vendor_profile_auto_created() {
        let db = setup();
        let vendor = get_vendor_profile(&db, 7, "Ana").unwrap();
        assert_eq!(vendor.shop_name, "Ana Shop");
        assert_eq!(list_vendor_products(&db, 7, "Ana").unwrap().total, 0);
    }

    #[test]
    fn test_vendor_cannot_touch_other_shop() {
        let db = setup();
        let product = add_vendor_product(&db, 7, "Ana", bracelet("Bangle")).unwrap();

        let update = ProductUpdate {
            price: Some(10.0),
            ..Default::default()
        };
        assert!(update_vendor_product(&db, 8, "Ben", product.id, update.clone())
            .unwrap()
            .is_none());
        assert!(delete_vendor_product(&db, 8, "Ben", product.id)
            .unwrap()
            .is_none());

        let updated = update_vendor_product(&db, 7, "Ana", product.id, update)
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, 10.0);
        assert!(delete_vendor_product(&db, 7, "Ana", product.id)
            .unwrap()
            .is_some());
        assert!(get_product(&db, product.id).unwrap().is_none());
    }

    #[test]
    fn test_list_products_hides_unavailable() {
        let db = setup();
        add_vendor_product(&db, 7, "Ana", bracelet("Shown")).unwrap();
        let hidden = ProductCreate {
            is_available: false,
            ..bracelet("Hidden")
        };
        add_vendor_product(&db, 7, "Ana", hidden).unwrap();

        let listed = list_products(&db, &ProductFilter::default()).unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.products[0].name, "Shown");
        assert_eq!(list_vendor_products(&db, 7, "Ana").unwrap().total, 2);

        let bad_range = ProductFilter {
            min_price: Some(10.0),
            max_price: Some(5.0),
            ..Default::default()
        };
        assert!(list_products(&db, &bad_range).is_err());
    }
}
