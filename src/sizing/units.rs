//! Size units and conversion constants
//!
//! Value types shared by the converter and the matcher.

use serde::{Deserialize, Serialize};

// ============================================================================
// Conversion Constants
// ============================================================================

/// Millimeters per inch
pub const MM_PER_INCH: f64 = 25.4;
/// US ring-size units per inch of internal diameter
pub const US_SIZE_PER_INCH: f64 = 10.0;
/// Diameter of a 2-euro coin, the default calibration reference
pub const DEFAULT_REFERENCE_DIAMETER_MM: f64 = 24.0;

/// Decimal places kept on millimeter fields
pub const MM_DECIMALS: i32 = 2;
/// Decimal places kept on size-scale fields (EU, US)
pub const SIZE_DECIMALS: i32 = 1;
/// Allowed drift when re-deriving one field from another
pub const CONSISTENCY_TOLERANCE: f64 = 0.1;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Convert millimeters to inches, rounded for display
pub fn mm_to_inches(mm: f64) -> f64 {
    round_to(mm / MM_PER_INCH, MM_DECIMALS)
}

// ============================================================================
// Measurement Type
// ============================================================================

/// What was measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeasurementType {
    #[default]
    Ring,
    Finger,
    Bracelet,
}

impl MeasurementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementType::Ring => "RING",
            MeasurementType::Finger => "FINGER",
            MeasurementType::Bracelet => "BRACELET",
        }
    }

    /// Parse case-insensitively ("ring", "Ring" and "RING" are all accepted)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "RING" => Some(MeasurementType::Ring),
            "FINGER" => Some(MeasurementType::Finger),
            "BRACELET" => Some(MeasurementType::Bracelet),
            _ => None,
        }
    }

    /// Title-case label used for default measurement names
    pub fn label(&self) -> &'static str {
        match self {
            MeasurementType::Ring => "Ring",
            MeasurementType::Finger => "Finger",
            MeasurementType::Bracelet => "Bracelet",
        }
    }
}

// ============================================================================
// Size Band
// ============================================================================

/// Coarse size classification shown next to a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBand {
    Small,
    Medium,
    Large,
}

impl SizeBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeBand::Small => "small",
            SizeBand::Medium => "medium",
            SizeBand::Large => "large",
        }
    }

    /// Half-open EU-size ranges `[min, max)` per band, in band order
    pub fn ranges(measurement_type: MeasurementType) -> [(SizeBand, f64, f64); 3] {
        match measurement_type {
            MeasurementType::Bracelet => [
                (SizeBand::Small, 0.0, 16.0),
                (SizeBand::Medium, 16.0, 18.0),
                (SizeBand::Large, 18.0, 22.0),
            ],
            MeasurementType::Ring | MeasurementType::Finger => [
                (SizeBand::Small, 0.0, 15.0),
                (SizeBand::Medium, 15.0, 18.0),
                (SizeBand::Large, 18.0, 25.0),
            ],
        }
    }
}

// ============================================================================
// Measurement
// ============================================================================

/// One sizing result with all four size fields cross-referenced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub diameter_mm: f64,
    pub circumference_mm: f64,
    pub size_eu: f64,
    pub size_us: f64,
    #[serde(rename = "type", default)]
    pub measurement_type: MeasurementType,
}

impl Measurement {
    /// Tag the measurement with what was measured
    pub fn with_type(mut self, measurement_type: MeasurementType) -> Self {
        self.measurement_type = measurement_type;
        self
    }

    /// Whether every field can be re-derived from the diameter within
    /// [`CONSISTENCY_TOLERANCE`]
    pub fn is_consistent(&self) -> bool {
        let d = self.diameter_mm;
        if !(d > 0.0) || !d.is_finite() {
            return false;
        }

        let within = |stored: f64, derived: f64| {
            (stored - derived).abs() <= CONSISTENCY_TOLERANCE + 1e-9
        };

        let circumference = round_to(std::f64::consts::PI * d, MM_DECIMALS);
        let size_eu = round_to(d, SIZE_DECIMALS);
        let size_us = round_to(d / MM_PER_INCH * US_SIZE_PER_INCH, SIZE_DECIMALS);

        within(self.circumference_mm, circumference)
            && within(self.size_eu, size_eu)
            && within(self.size_us, size_us)
            && within(d, self.circumference_mm / std::f64::consts::PI)
            && within(d, self.size_eu)
    }

    pub fn diameter_in(&self) -> f64 {
        mm_to_inches(self.diameter_mm)
    }

    pub fn circumference_in(&self) -> f64 {
        mm_to_inches(self.circumference_mm)
    }
}

/// Camera calibration input: two dragged circle radii plus the real size
/// of the reference object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    pub ring_radius_px: f64,
    pub reference_radius_px: f64,
    #[serde(default = "default_reference_diameter")]
    pub reference_diameter_mm: f64,
}

fn default_reference_diameter() -> f64 {
    DEFAULT_REFERENCE_DIAMETER_MM
}

impl CalibrationSample {
    /// Sample against the default 2-euro coin reference
    pub fn new(ring_radius_px: f64, reference_radius_px: f64) -> Self {
        Self {
            ring_radius_px,
            reference_radius_px,
            reference_diameter_mm: DEFAULT_REFERENCE_DIAMETER_MM,
        }
    }

    pub fn with_reference_diameter(mut self, reference_diameter_mm: f64) -> Self {
        self.reference_diameter_mm = reference_diameter_mm;
        self
    }
}

/// A single raw sizing input, in whichever unit the user supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeInput {
    Diameter { mm: f64 },
    Circumference { mm: f64 },
    EuSize { size: f64 },
    UsSize { size: f64 },
    Calibration(CalibrationSample),
}

// ============================================================================
// Size Field Access
// ============================================================================

/// Anything carrying the four (possibly absent) size fields
pub trait SizeFields {
    fn diameter_mm(&self) -> Option<f64>;
    fn circumference_mm(&self) -> Option<f64>;
    fn size_eu(&self) -> Option<f64>;
    fn size_us(&self) -> Option<f64>;
}

/// A catalog entry the matcher can consider
pub trait Listing: SizeFields {
    fn is_available(&self) -> bool;
}

impl SizeFields for Measurement {
    fn diameter_mm(&self) -> Option<f64> {
        Some(self.diameter_mm)
    }

    fn circumference_mm(&self) -> Option<f64> {
        Some(self.circumference_mm)
    }

    fn size_eu(&self) -> Option<f64> {
        Some(self.size_eu)
    }

    fn size_us(&self) -> Option<f64> {
        Some(self.size_us)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(56.548667, 2), 56.55);
        assert_eq!(round_to(7.0866, 1), 7.1);
        assert_eq!(round_to(18.0, 2), 18.0);
    }

    #[test]
    fn test_measurement_type_parse() {
        assert_eq!(MeasurementType::from_str("ring"), Some(MeasurementType::Ring));
        assert_eq!(MeasurementType::from_str(" Bracelet "), Some(MeasurementType::Bracelet));
        assert_eq!(MeasurementType::from_str("FINGER"), Some(MeasurementType::Finger));
        assert_eq!(MeasurementType::from_str("necklace"), None);
    }

    #[test]
    fn test_measurement_serializes_with_snake_case_fields() {
        let m = Measurement {
            diameter_mm: 18.0,
            circumference_mm: 56.55,
            size_eu: 18.0,
            size_us: 7.1,
            measurement_type: MeasurementType::Ring,
        };
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["diameter_mm"], 18.0);
        assert_eq!(json["circumference_mm"], 56.55);
        assert_eq!(json["size_eu"], 18.0);
        assert_eq!(json["size_us"], 7.1);
        assert_eq!(json["type"], "RING");
    }

    #[test]
    fn test_is_consistent() {
        let good = Measurement {
            diameter_mm: 18.0,
            circumference_mm: 56.55,
            size_eu: 18.0,
            size_us: 7.1,
            measurement_type: MeasurementType::Ring,
        };
        assert!(good.is_consistent());

        let bad = Measurement { size_us: 8.0, ..good };
        assert!(!bad.is_consistent());

        let negative = Measurement { diameter_mm: -1.0, ..good };
        assert!(!negative.is_consistent());
    }

    #[test]
    fn test_calibration_sample_defaults_to_coin() {
        let sample = CalibrationSample::new(100.0, 50.0);
        assert_eq!(sample.reference_diameter_mm, DEFAULT_REFERENCE_DIAMETER_MM);

        let parsed: CalibrationSample =
            serde_json::from_str(r#"{"ring_radius_px": 80, "reference_radius_px": 40}"#).unwrap();
        assert_eq!(parsed.reference_diameter_mm, 24.0);
    }

    #[test]
    fn test_inches() {
        assert_eq!(mm_to_inches(25.4), 1.0);
        assert_eq!(mm_to_inches(18.0), 0.71);
    }
}
