//! RingFit MCP Server Implementation
//!
//! Implements the MCP server with all RingFit tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{
    default_currency, Category, Karat, MeasurementCreate, MeasurementUpdate, ProductCreate,
    ProductFilter, ProductUpdate,
};
use crate::tools::gold_prices;
use crate::tools::measurements::{self, RawSizeInput};
use crate::tools::products;
use crate::tools::settings;
use crate::tools::status::StatusTracker;
use crate::tools::ToolError;

/// RingFit MCP Service
#[derive(Clone)]
pub struct RingFitService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    user_id: i64,
    user_label: String,
    tool_router: ToolRouter<RingFitService>,
}

impl RingFitService {
    pub fn new(database_path: PathBuf, database: Database, user_id: i64, user_label: String) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, user_id))),
            database,
            user_id,
            user_label,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(entity: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        entity, id
    ))]))
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        if err.is_invalid_input() {
            McpError::invalid_params(err.to_string(), None)
        } else {
            tracing::error!("Tool failed: {}", err);
            McpError::internal_error(err.to_string(), None)
        }
    }
}

fn parse_category(s: Option<&str>) -> Result<Option<Category>, McpError> {
    s.map(|c| {
        Category::from_str(c).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown category '{}'. Expected RING, BRACELET, NECKLACE or OTHER", c),
                None,
            )
        })
    })
    .transpose()
}

fn parse_karat(s: Option<&str>) -> Result<Option<Karat>, McpError> {
    s.map(|k| {
        Karat::from_str(k).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown karat '{}'. Expected 9K, 14K, 18K, 22K or 24K", k),
                None,
            )
        })
    })
    .transpose()
}

fn parse_type(s: Option<&str>) -> Result<crate::sizing::MeasurementType, McpError> {
    measurements::parse_measurement_type(s).map_err(McpError::from)
}

// ============================================================================
// Sizing Parameter Structs
// ============================================================================

/// Exactly one size input; the calibration radii count as one
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct SizeInputParams {
    /// Internal diameter in millimeters
    pub diameter_mm: Option<f64>,
    /// Internal circumference in millimeters
    pub circumference_mm: Option<f64>,
    /// EU ring size
    pub size_eu: Option<f64>,
    /// US ring size
    pub size_us: Option<f64>,
    /// Ring radius in pixels (photo calibration)
    pub ring_radius_px: Option<f64>,
    /// Reference coin radius in pixels (photo calibration)
    pub reference_radius_px: Option<f64>,
    /// Reference coin diameter in mm, defaults to 24 (2 euro coin)
    pub reference_diameter_mm: Option<f64>,
}

impl From<SizeInputParams> for RawSizeInput {
    fn from(p: SizeInputParams) -> Self {
        RawSizeInput {
            diameter_mm: p.diameter_mm,
            circumference_mm: p.circumference_mm,
            size_eu: p.size_eu,
            size_us: p.size_us,
            ring_radius_px: p.ring_radius_px,
            reference_radius_px: p.reference_radius_px,
            reference_diameter_mm: p.reference_diameter_mm,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ConvertMeasurementParams {
    #[serde(flatten)]
    pub input: SizeInputParams,
    /// RING (default), FINGER or BRACELET
    pub measurement_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveMeasurementParams {
    /// Defaults to "<Type> - dd/mm/YYYY"
    pub name: Option<String>,
    /// RING (default), FINGER or BRACELET
    pub measurement_type: Option<String>,
    #[serde(flatten)]
    pub input: SizeInputParams,
    /// Store the given size fields as-is instead of converting one input
    #[serde(default)]
    pub explicit: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MeasurementIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMeasurementParams {
    pub id: i64,
    pub name: Option<String>,
    pub measurement_type: Option<String>,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MatchForMeasurementParams {
    pub measurement_id: i64,
    /// Optional category filter: RING, BRACELET, NECKLACE, OTHER
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MatchForSizeParams {
    #[serde(flatten)]
    pub input: SizeInputParams,
    pub category: Option<String>,
}

// ============================================================================
// Product Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub karat: Option<String>,
    pub vendor_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProductIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddVendorProductParams {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Defaults to EUR
    pub currency: Option<String>,
    pub karat: Option<String>,
    /// RING, BRACELET, NECKLACE or OTHER (default)
    pub category: Option<String>,
    pub main_image_url: Option<String>,
    /// Defaults to true
    pub is_available: Option<bool>,
    /// Size fields; 0 means not specified
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    /// Weight in grams
    pub weight: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateVendorProductParams {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub karat: Option<String>,
    pub category: Option<String>,
    pub main_image_url: Option<String>,
    pub is_available: Option<bool>,
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub weight: Option<f64>,
}

// ============================================================================
// Gold Price and Settings Parameter Structs
// ============================================================================

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListGoldPricesParams {
    /// Filter by karat, e.g. 18K
    pub karat: Option<String>,
    /// day, week, month (default) or year
    pub period: Option<String>,
    /// YYYY-MM-DD; overrides period
    pub start_date: Option<String>,
    /// YYYY-MM-DD; only used with start_date
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecordGoldPriceParams {
    pub karat: String,
    pub price_per_gram: f64,
    /// Defaults to EUR
    pub currency: Option<String>,
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateSettingsParams {
    /// MM or INCH
    pub preferred_unit: Option<String>,
    /// FR or EN
    pub language: Option<String>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl RingFitService {
    // --- Status ---

    #[tool(description = "Get the current status of the RingFit service including build info, database status, and process information")]
    async fn ringfit_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get step-by-step instructions for measuring rings, fingers and bracelets and matching jewelry. Call this when starting a sizing session.")]
    fn sizing_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SIZING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SIZING_INSTRUCTIONS)]))
    }

    // --- Conversion ---

    #[tool(description = "Convert one size input (diameter, circumference, EU size, US size, or ring/reference pixel radii) into all four size forms plus size band and inch values. Does not save.")]
    fn convert_measurement(&self, Parameters(p): Parameters<ConvertMeasurementParams>) -> Result<CallToolResult, McpError> {
        let measurement_type = parse_type(p.measurement_type.as_deref())?;
        let result = measurements::convert_measurement(p.input.into(), measurement_type)?;
        to_json(&result)
    }

    // --- Measurements ---

    #[tool(description = "Save a measurement. Give one size input to convert it, or set explicit=true to store the given size fields as-is.")]
    fn save_measurement(&self, Parameters(p): Parameters<SaveMeasurementParams>) -> Result<CallToolResult, McpError> {
        let measurement_type = parse_type(p.measurement_type.as_deref())?;
        let result = if p.explicit {
            let data = MeasurementCreate {
                name: p.name,
                measurement_type,
                diameter_mm: p.input.diameter_mm,
                circumference_mm: p.input.circumference_mm,
                size_eu: p.input.size_eu,
                size_us: p.input.size_us,
            };
            measurements::save_measurement_fields(&self.database, self.user_id, data)
        } else {
            measurements::save_measurement(&self.database, self.user_id, p.name, measurement_type, p.input.into())
        }?;
        to_json(&result)
    }

    #[tool(description = "List all saved measurements, newest first")]
    fn list_measurements(&self) -> Result<CallToolResult, McpError> {
        let result = measurements::list_measurements(&self.database, self.user_id)?;
        to_json(&result)
    }

    #[tool(description = "Get a saved measurement by ID")]
    fn get_measurement(&self, Parameters(p): Parameters<MeasurementIdParams>) -> Result<CallToolResult, McpError> {
        match measurements::get_measurement(&self.database, self.user_id, p.id)? {
            Some(record) => to_json(&record),
            None => not_found("Measurement", p.id),
        }
    }

    #[tool(description = "Update a saved measurement. Only provided fields are changed.")]
    fn update_measurement(&self, Parameters(p): Parameters<UpdateMeasurementParams>) -> Result<CallToolResult, McpError> {
        let measurement_type = match p.measurement_type.as_deref() {
            Some(t) => Some(parse_type(Some(t))?),
            None => None,
        };
        let data = MeasurementUpdate {
            name: p.name,
            measurement_type,
            diameter_mm: p.diameter_mm,
            circumference_mm: p.circumference_mm,
            size_eu: p.size_eu,
            size_us: p.size_us,
        };
        match measurements::update_measurement(&self.database, self.user_id, p.id, data)? {
            Some(record) => to_json(&record),
            None => not_found("Measurement", p.id),
        }
    }

    #[tool(description = "Delete a saved measurement")]
    fn delete_measurement(&self, Parameters(p): Parameters<MeasurementIdParams>) -> Result<CallToolResult, McpError> {
        match measurements::delete_measurement(&self.database, self.user_id, p.id)? {
            Some(result) => to_json(&result),
            None => not_found("Measurement", p.id),
        }
    }

    // --- Matching ---

    #[tool(description = "Find available products that fit a saved measurement. A product fits when any size agrees within tolerance (diameter ±2mm, circumference ±5mm, EU ±1, US ±0.5).")]
    fn match_products_for_measurement(&self, Parameters(p): Parameters<MatchForMeasurementParams>) -> Result<CallToolResult, McpError> {
        let category = parse_category(p.category.as_deref())?;
        match measurements::match_products_for_measurement(&self.database, self.user_id, p.measurement_id, category)? {
            Some(result) => to_json(&result),
            None => not_found("Measurement", p.measurement_id),
        }
    }

    #[tool(description = "Find available products that fit a size given directly (one size input, not saved)")]
    fn match_products_for_size(&self, Parameters(p): Parameters<MatchForSizeParams>) -> Result<CallToolResult, McpError> {
        let category = parse_category(p.category.as_deref())?;
        let result = measurements::match_products_for_size(&self.database, p.input.into(), category)?;
        to_json(&result)
    }

    // --- Catalog ---

    #[tool(description = "List available products with optional category, karat, vendor and price filters")]
    fn list_products(&self, Parameters(p): Parameters<ListProductsParams>) -> Result<CallToolResult, McpError> {
        let filter = ProductFilter {
            category: parse_category(p.category.as_deref())?,
            karat: parse_karat(p.karat.as_deref())?,
            vendor_id: p.vendor_id,
            min_price: p.min_price,
            max_price: p.max_price,
        };
        let result = products::list_products(&self.database, &filter)?;
        to_json(&result)
    }

    #[tool(description = "Get a product by ID")]
    fn get_product(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        match products::get_product(&self.database, p.id)? {
            Some(product) => to_json(&product),
            None => not_found("Product", p.id),
        }
    }

    // --- Vendor ---

    #[tool(description = "Get your vendor shop profile (created on first use)")]
    fn get_vendor_profile(&self) -> Result<CallToolResult, McpError> {
        let result = products::get_vendor_profile(&self.database, self.user_id, &self.user_label)?;
        to_json(&result)
    }

    #[tool(description = "List every product of your shop, including unavailable ones")]
    fn list_vendor_products(&self) -> Result<CallToolResult, McpError> {
        let result = products::list_vendor_products(&self.database, self.user_id, &self.user_label)?;
        to_json(&result)
    }

    #[tool(description = "Add a product to your shop. Size fields set to 0 are treated as not specified.")]
    fn add_vendor_product(&self, Parameters(p): Parameters<AddVendorProductParams>) -> Result<CallToolResult, McpError> {
        let category = parse_category(p.category.as_deref())?.unwrap_or_default();
        let data = ProductCreate {
            name: p.name,
            description: p.description,
            price: p.price,
            currency: p.currency.unwrap_or_else(default_currency),
            karat: parse_karat(p.karat.as_deref())?,
            category,
            main_image_url: p.main_image_url,
            is_available: p.is_available.unwrap_or(true),
            diameter_mm: p.diameter_mm,
            circumference_mm: p.circumference_mm,
            size_eu: p.size_eu,
            size_us: p.size_us,
            weight: p.weight,
        };
        let result = products::add_vendor_product(&self.database, self.user_id, &self.user_label, data)?;
        to_json(&result)
    }

    #[tool(description = "Update one of your products. Only provided fields are changed.")]
    fn update_vendor_product(&self, Parameters(p): Parameters<UpdateVendorProductParams>) -> Result<CallToolResult, McpError> {
        let data = ProductUpdate {
            name: p.name,
            description: p.description,
            price: p.price,
            currency: p.currency,
            karat: parse_karat(p.karat.as_deref())?,
            category: parse_category(p.category.as_deref())?,
            main_image_url: p.main_image_url,
            is_available: p.is_available,
            diameter_mm: p.diameter_mm,
            circumference_mm: p.circumference_mm,
            size_eu: p.size_eu,
            size_us: p.size_us,
            weight: p.weight,
        };
        match products::update_vendor_product(&self.database, self.user_id, &self.user_label, p.id, data)? {
            Some(product) => to_json(&product),
            None => not_found("Product", p.id),
        }
    }

    #[tool(description = "Delete one of your products")]
    fn delete_vendor_product(&self, Parameters(p): Parameters<ProductIdParams>) -> Result<CallToolResult, McpError> {
        match products::delete_vendor_product(&self.database, self.user_id, &self.user_label, p.id)? {
            Some(result) => to_json(&result),
            None => not_found("Product", p.id),
        }
    }

    // --- Gold Prices ---

    #[tool(description = "Gold price history for a period (day/week/month/year) or a start/end date range, oldest first, plus the latest 24K and 18K prices")]
    fn list_gold_prices(&self, Parameters(p): Parameters<ListGoldPricesParams>) -> Result<CallToolResult, McpError> {
        let result = gold_prices::list_gold_prices(
            &self.database,
            p.karat.as_deref(),
            p.period.as_deref(),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            Local::now().date_naive(),
        )?;
        to_json(&result)
    }

    #[tool(description = "Record the gold price per gram for a karat and day. Replaces an existing price for the same day.")]
    fn record_gold_price(&self, Parameters(p): Parameters<RecordGoldPriceParams>) -> Result<CallToolResult, McpError> {
        let result = gold_prices::record_gold_price(
            &self.database,
            &p.karat,
            p.price_per_gram,
            p.currency.as_deref(),
            p.date.as_deref(),
            Local::now().date_naive(),
        )?;
        to_json(&result)
    }

    // --- Settings ---

    #[tool(description = "Get your display settings (unit and language)")]
    fn get_settings(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_settings(&self.database, self.user_id)?;
        to_json(&result)
    }

    #[tool(description = "Update your display settings: preferred_unit (MM/INCH) and/or language (FR/EN)")]
    fn update_settings(&self, Parameters(p): Parameters<UpdateSettingsParams>) -> Result<CallToolResult, McpError> {
        let result = settings::update_settings(
            &self.database,
            self.user_id,
            p.preferred_unit.as_deref(),
            p.language.as_deref(),
        )?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for RingFitService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ringfit".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("RingFit".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "RingFit - Jewelry sizing and gold marketplace. \
                 IMPORTANT: Call sizing_instructions before measuring. \
                 Sizing: convert_measurement, save/list/get/update/delete_measurement. \
                 Matching: match_products_for_measurement, match_products_for_size. \
                 Catalog: list_products, get_product. \
                 Vendor: get_vendor_profile, list/add/update/delete_vendor_product. \
                 Gold: list_gold_prices, record_gold_price. \
                 Settings: get_settings, update_settings."
                    .into(),
            ),
        }
    }
}
