//! Measurement MCP Tools
//!
//! Conversion, the measurement store, and catalog matching.

use serde::Serialize;

use super::error::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{
    Category, MeasurementCreate, MeasurementRecord, MeasurementUpdate, Product, ProductFilter,
};
use crate::sizing::{
    convert, match_products, matching_checks, size_band, CalibrationSample, Measurement,
    MeasurementType, SizeBand, SizeCheck, SizeFields, SizeInput,
};

/// Raw sizing fields as they arrive from a caller; exactly one input must
/// be set (the two calibration radii count as one)
#[derive(Debug, Clone, Default)]
pub struct RawSizeInput {
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
    pub ring_radius_px: Option<f64>,
    pub reference_radius_px: Option<f64>,
    pub reference_diameter_mm: Option<f64>,
}

impl RawSizeInput {
    pub fn into_size_input(self) -> ToolResult<SizeInput> {
        let calibration = match (self.ring_radius_px, self.reference_radius_px) {
            (Some(ring), Some(reference)) => {
                let sample = CalibrationSample::new(ring, reference);
                Some(match self.reference_diameter_mm {
                    Some(d) => sample.with_reference_diameter(d),
                    None => sample,
                })
            }
            (None, None) => None,
            _ => {
                return Err(ToolError::invalid(
                    "ring_radius_px and reference_radius_px must be given together",
                ))
            }
        };

        let mut inputs = Vec::new();
        if let Some(mm) = self.diameter_mm {
            inputs.push(SizeInput::Diameter { mm });
        }
        if let Some(mm) = self.circumference_mm {
            inputs.push(SizeInput::Circumference { mm });
        }
        if let Some(size) = self.size_eu {
            inputs.push(SizeInput::EuSize { size });
        }
        if let Some(size) = self.size_us {
            inputs.push(SizeInput::UsSize { size });
        }
        if let Some(sample) = calibration {
            inputs.push(SizeInput::Calibration(sample));
        }

        match inputs.len() {
            1 => Ok(inputs.remove(0)),
            0 => Err(ToolError::invalid(
                "Provide one of diameter_mm, circumference_mm, size_eu, size_us, \
                 or ring_radius_px with reference_radius_px",
            )),
            _ => Err(ToolError::invalid(
                "Provide only one sizing input per conversion",
            )),
        }
    }
}

/// Parse an optional measurement type string
pub fn parse_measurement_type(s: Option<&str>) -> ToolResult<MeasurementType> {
    match s {
        None => Ok(MeasurementType::default()),
        Some(s) => MeasurementType::from_str(s)
            .ok_or_else(|| ToolError::invalid("The type must be one of: RING, FINGER, BRACELET")),
    }
}

/// Response for convert_measurement
#[derive(Debug, Serialize)]
pub struct ConversionResponse {
    #[serde(flatten)]
    pub measurement: Measurement,
    pub size_band: SizeBand,
    pub consistent: bool,
    pub diameter_in: f64,
    pub circumference_in: f64,
}

impl From<Measurement> for ConversionResponse {
    fn from(measurement: Measurement) -> Self {
        Self {
            size_band: size_band(measurement.size_eu, measurement.measurement_type),
            consistent: measurement.is_consistent(),
            diameter_in: measurement.diameter_in(),
            circumference_in: measurement.circumference_in(),
            measurement,
        }
    }
}

/// Convert one raw input into the full measurement
pub fn convert_measurement(
    input: RawSizeInput,
    measurement_type: MeasurementType,
) -> ToolResult<ConversionResponse> {
    let size_input = input.into_size_input()?;
    let measurement = convert(&size_input)?.with_type(measurement_type);
    Ok(measurement.into())
}

/// Response for list_measurements
#[derive(Debug, Serialize)]
pub struct ListMeasurementsResponse {
    pub measurements: Vec<MeasurementRecord>,
    pub total: usize,
}

/// Response for delete_measurement
#[derive(Debug, Serialize)]
pub struct DeleteMeasurementResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Convert a raw input and save the full result
pub fn save_measurement(
    db: &Database,
    user_id: i64,
    name: Option<String>,
    measurement_type: MeasurementType,
    input: RawSizeInput,
) -> ToolResult<MeasurementRecord> {
    let size_input = input.into_size_input()?;
    let measurement = convert(&size_input)?.with_type(measurement_type);
    let data = MeasurementCreate::from_measurement(&measurement, name);

    Ok(db.with_conn(|conn| MeasurementRecord::create(conn, user_id, &data))?)
}

/// Reject any size field that is set but not a positive number
fn ensure_positive_sizes<T: SizeFields>(data: &T) -> ToolResult<()> {
    for (field, value) in [
        ("diameter_mm", data.diameter_mm()),
        ("circumference_mm", data.circumference_mm()),
        ("size_eu", data.size_eu()),
        ("size_us", data.size_us()),
    ] {
        if let Some(v) = value {
            if !(v > 0.0) {
                return Err(ToolError::invalid(format!("{} must be greater than 0", field)));
            }
        }
    }
    Ok(())
}

/// Store explicit size fields without conversion
pub fn save_measurement_fields(
    db: &Database,
    user_id: i64,
    data: MeasurementCreate,
) -> ToolResult<MeasurementRecord> {
    ensure_positive_sizes(&data)?;

    Ok(db.with_conn(|conn| MeasurementRecord::create(conn, user_id, &data))?)
}

pub fn list_measurements(db: &Database, user_id: i64) -> ToolResult<ListMeasurementsResponse> {
    let measurements = db.with_conn(|conn| MeasurementRecord::list_for_user(conn, user_id))?;

    Ok(ListMeasurementsResponse {
        total: measurements.len(),
        measurements,
    })
}

pub fn get_measurement(
    db: &Database,
    user_id: i64,
    id: i64,
) -> ToolResult<Option<MeasurementRecord>> {
    Ok(db.with_conn(|conn| MeasurementRecord::get(conn, user_id, id))?)
}

pub fn update_measurement(
    db: &Database,
    user_id: i64,
    id: i64,
    data: MeasurementUpdate,
) -> ToolResult<Option<MeasurementRecord>> {
    if let Some(ref name) = data.name {
        if name.trim().is_empty() {
            return Err(ToolError::invalid("Measurement name cannot be empty"));
        }
    }
    ensure_positive_sizes(&data)?;
    if data.is_empty() {
        tracing::debug!("Empty update for measurement {}", id);
        return get_measurement(db, user_id, id);
    }

    Ok(db.with_conn(|conn| MeasurementRecord::update(conn, user_id, id, &data))?)
}

pub fn delete_measurement(
    db: &Database,
    user_id: i64,
    id: i64,
) -> ToolResult<Option<DeleteMeasurementResponse>> {
    let deleted = db.with_conn(|conn| MeasurementRecord::delete(conn, user_id, id))?;

    Ok(deleted.then_some(DeleteMeasurementResponse {
        success: true,
        deleted_id: id,
    }))
}

// ============================================================================
// Matching
// ============================================================================

/// The size fields a match was computed from
#[derive(Debug, Serialize)]
pub struct SizeSummary {
    pub diameter_mm: Option<f64>,
    pub circumference_mm: Option<f64>,
    pub size_eu: Option<f64>,
    pub size_us: Option<f64>,
}

impl SizeSummary {
    fn of<T: SizeFields + ?Sized>(value: &T) -> Self {
        Self {
            diameter_mm: value.diameter_mm(),
            circumference_mm: value.circumference_mm(),
            size_eu: value.size_eu(),
            size_us: value.size_us(),
        }
    }
}

/// A matching product and the checks it passed
#[derive(Debug, Serialize)]
pub struct MatchedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub matched_on: Vec<SizeCheck>,
}

/// Response for the match tools
#[derive(Debug, Serialize)]
pub struct MatchProductsResponse {
    pub measurement: SizeSummary,
    pub matches: Vec<MatchedProduct>,
    pub total: usize,
    pub candidates: usize,
}

fn match_against_catalog<M: SizeFields>(
    db: &Database,
    measurement: &M,
    category: Option<Category>,
) -> ToolResult<MatchProductsResponse> {
    let filter = ProductFilter {
        category,
        ..Default::default()
    };
    let catalog = db.with_conn(|conn| Product::list_available(conn, &filter))?;

    let matches: Vec<MatchedProduct> = match_products(measurement, catalog.as_slice())
        .into_iter()
        .map(|product| MatchedProduct {
            matched_on: matching_checks(measurement, product),
            product: product.clone(),
        })
        .collect();

    tracing::info!(
        "Matched {} of {} catalog products",
        matches.len(),
        catalog.len()
    );

    Ok(MatchProductsResponse {
        measurement: SizeSummary::of(measurement),
        total: matches.len(),
        candidates: catalog.len(),
        matches,
    })
}

/// Match a saved measurement against the available catalog
pub fn match_products_for_measurement(
    db: &Database,
    user_id: i64,
    measurement_id: i64,
    category: Option<Category>,
) -> ToolResult<Option<MatchProductsResponse>> {
    let record = match get_measurement(db, user_id, measurement_id)? {
        Some(record) => record,
        None => return Ok(None),
    };

    match_against_catalog(db, &record, category).map(Some)
}

/// Convert a raw input and match it against the available catalog
pub fn match_products_for_size(
    db: &Database,
    input: RawSizeInput,
    category: Option<Category>,
) -> ToolResult<MatchProductsResponse> {
    let size_input = input.into_size_input()?;
    let measurement = convert(&size_input)?;
    match_against_catalog(db, &measurement, category)
}
