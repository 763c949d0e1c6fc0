//! Data models
//!
//! Rust structs representing database entities.

mod gold_price;
mod measurement;
mod product;
mod settings;
mod vendor;

pub use gold_price::{GoldPrice, PricePeriod, DATE_FORMAT};
pub use measurement::{
    default_measurement_name, MeasurementCreate, MeasurementRecord, MeasurementUpdate,
};
pub use product::{
    default_currency, Category, Karat, Product, ProductCreate, ProductFilter, ProductUpdate,
};
pub use settings::{Language, PreferredUnit, UserSettings};
pub use vendor::{Vendor, DEFAULT_SHOP_DESCRIPTION};
