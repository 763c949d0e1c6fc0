//! Size conversion functions
//!
//! Every entry point reduces its input to an internal diameter and hands it
//! to [`from_diameter`], which is the only place the full record is built.

use std::f64::consts::PI;

use super::error::{SizingError, SizingResult};
use super::units::{
    round_to, CalibrationSample, Measurement, MeasurementType, SizeBand, SizeInput,
    MM_DECIMALS, MM_PER_INCH, SIZE_DECIMALS, US_SIZE_PER_INCH,
};

/// Reject zero, negative and non-finite magnitudes
fn ensure_positive(field: &'static str, value: f64) -> SizingResult<f64> {
    if !value.is_finite() {
        tracing::debug!("Rejected {}: not finite", field);
        return Err(SizingError::not_finite(field));
    }
    if value <= 0.0 {
        tracing::debug!("Rejected {}: {} is not positive", field, value);
        return Err(SizingError::non_positive(field, value));
    }
    Ok(value)
}

/// Build the full measurement from an internal diameter in millimeters
///
/// - circumference = π × diameter
/// - EU size = diameter
/// - US size = diameter / 25.4 × 10
///
/// Millimeter fields are rounded to 2 decimals, size scales to 1 decimal.
/// Every rounded field must still be positive and finite, so inputs that
/// vanish or overflow under rounding are rejected.
pub fn from_diameter(diameter_mm: f64) -> SizingResult<Measurement> {
    let d = ensure_positive("diameter_mm", diameter_mm)?;

    let measurement = Measurement {
        diameter_mm: round_to(d, MM_DECIMALS),
        circumference_mm: round_to(PI * d, MM_DECIMALS),
        size_eu: round_to(d, SIZE_DECIMALS),
        size_us: round_to(d / MM_PER_INCH * US_SIZE_PER_INCH, SIZE_DECIMALS),
        measurement_type: MeasurementType::default(),
    };

    for (field, value) in [
        ("diameter_mm", measurement.diameter_mm),
        ("circumference_mm", measurement.circumference_mm),
        ("size_eu", measurement.size_eu),
        ("size_us", measurement.size_us),
    ] {
        ensure_positive(field, value)?;
    }

    Ok(measurement)
}

/// Build the measurement from an internal circumference in millimeters
pub fn from_circumference(circumference_mm: f64) -> SizingResult<Measurement> {
    let c = ensure_positive("circumference_mm", circumference_mm)?;
    from_diameter(c / PI)
}

/// Build the measurement from a US ring size
pub fn from_us_size(size_us: f64) -> SizingResult<Measurement> {
    let us = ensure_positive("size_us", size_us)?;
    from_diameter(us / US_SIZE_PER_INCH * MM_PER_INCH)
}

/// Build the measurement from an EU ring size (already mm-equivalent)
pub fn from_eu_size(size_eu: f64) -> SizingResult<Measurement> {
    let eu = ensure_positive("size_eu", size_eu)?;
    from_diameter(eu)
}

/// Build the measurement from two circles dragged over a photo
///
/// The reference object's known diameter over its pixel diameter gives a
/// px→mm scale, which is applied to the ring circle. Both circles must lie
/// in the same plane at the same distance from the camera; nothing here can
/// check that.
pub fn from_calibration(sample: &CalibrationSample) -> SizingResult<Measurement> {
    if sample.reference_radius_px == 0.0 {
        return Err(SizingError::zero_reference_radius());
    }

    let scale_factor = sample.reference_diameter_mm / (2.0 * sample.reference_radius_px);
    let ring_diameter_mm = (2.0 * sample.ring_radius_px) * scale_factor;

    tracing::debug!(
        "Calibration: scale {:.4} mm/px, ring diameter {:.3} mm",
        scale_factor,
        ring_diameter_mm
    );

    from_diameter(ring_diameter_mm)
}

/// Convert whichever raw input the user supplied
pub fn convert(input: &SizeInput) -> SizingResult<Measurement> {
    match input {
        SizeInput::Diameter { mm } => from_diameter(*mm),
        SizeInput::Circumference { mm } => from_circumference(*mm),
        SizeInput::EuSize { size } => from_eu_size(*size),
        SizeInput::UsSize { size } => from_us_size(*size),
        SizeInput::Calibration(sample) => from_calibration(sample),
    }
}

/// Classify an EU size into a coarse band for the given measurement type
///
/// Sizes past the last range count as large.
pub fn size_band(size_eu: f64, measurement_type: MeasurementType) -> SizeBand {
    SizeBand::ranges(measurement_type)
        .iter()
        .find(|(_, min, max)| size_eu >= *min && size_eu < *max)
        .map(|(band, _, _)| *band)
        .unwrap_or(SizeBand::Large)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::error::InvalidReason;

    #[test]
    fn test_from_diameter_ring_size_18() {
        let m = from_diameter(18.0).unwrap();
        assert_eq!(m.diameter_mm, 18.0);
        assert_eq!(m.circumference_mm, 56.55);
        assert_eq!(m.size_eu, 18.0);
        assert_eq!(m.size_us, 7.1);
        assert_eq!(m.measurement_type, MeasurementType::Ring);
    }

    #[test]
    fn test_from_diameter_rounds() {
        let m = from_diameter(17.3456).unwrap();
        assert_eq!(m.diameter_mm, 17.35);
        assert_eq!(m.size_eu, 17.3);
        assert_eq!(m.size_us, 6.8);
        assert_eq!(m.circumference_mm, 54.49);
    }

    #[test]
    fn test_from_calibration_coin() {
        let sample = CalibrationSample {
            ring_radius_px: 100.0,
            reference_radius_px: 50.0,
            reference_diameter_mm: 24.0,
        };
        let m = from_calibration(&sample).unwrap();
        assert_eq!(m, from_diameter(48.0).unwrap());
        assert_eq!(m.diameter_mm, 48.0);
        assert_eq!(m.circumference_mm, 150.8);
        assert_eq!(m.size_us, 18.9);
    }

    #[test]
    fn test_from_calibration_zero_reference() {
        let err = from_calibration(&CalibrationSample::new(100.0, 0.0)).unwrap_err();
        assert_eq!(err.reason(), InvalidReason::ZeroReferenceRadius);
        assert!(err.to_string().contains("reference radius cannot be zero"));
    }

    #[test]
    fn test_from_calibration_negative_ring_radius() {
        let err = from_calibration(&CalibrationSample::new(-10.0, 50.0)).unwrap_err();
        assert_eq!(err.reason().code(), "non_positive");
    }

    #[test]
    fn test_from_us_size() {
        // US 7 is 17.78 mm
        let m = from_us_size(7.0).unwrap();
        assert_eq!(m.diameter_mm, 17.78);
        assert_eq!(m.size_us, 7.0);
        assert_eq!(m.size_eu, 17.8);
    }

    #[test]
    fn test_from_circumference() {
        let m = from_circumference(56.55).unwrap();
        assert_eq!(m.diameter_mm, 18.0);
        assert_eq!(m.size_us, 7.1);
    }

    #[test]
    fn test_from_eu_size_matches_diameter() {
        assert_eq!(from_eu_size(16.5).unwrap(), from_diameter(16.5).unwrap());
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            from_diameter(0.0).unwrap_err().reason(),
            InvalidReason::NonPositive { field: "diameter_mm" }
        );
        assert!(from_diameter(-5.0).is_err());
        assert_eq!(
            from_circumference(0.0).unwrap_err().reason().field(),
            "circumference_mm"
        );
        assert_eq!(from_us_size(0.0).unwrap_err().reason().field(), "size_us");
        assert_eq!(from_eu_size(0.0).unwrap_err().reason().field(), "size_eu");
        assert_eq!(
            from_diameter(f64::NAN).unwrap_err().reason(),
            InvalidReason::NotFinite { field: "diameter_mm" }
        );
        assert!(from_diameter(f64::INFINITY).is_err());
    }

    #[test]
    fn test_rounded_fields_must_stay_valid() {
        // Overflows once scaled for rounding
        assert_eq!(
            from_diameter(1e307).unwrap_err().reason(),
            InvalidReason::NotFinite { field: "diameter_mm" }
        );

        // Rounds down to an all-zero record
        assert_eq!(
            from_diameter(0.004).unwrap_err().reason(),
            InvalidReason::NonPositive { field: "diameter_mm" }
        );

        // Positive but rounds the US size to zero
        assert_eq!(
            from_diameter(0.1).unwrap_err().reason(),
            InvalidReason::NonPositive { field: "size_us" }
        );

        // A ring circle far smaller than the reference coin
        let err = from_calibration(&CalibrationSample::new(0.01, 100.0)).unwrap_err();
        assert_eq!(err.reason(), InvalidReason::NonPositive { field: "diameter_mm" });
    }

    #[test]
    fn test_convert_dispatch() {
        assert_eq!(
            convert(&SizeInput::Diameter { mm: 18.0 }).unwrap(),
            from_diameter(18.0).unwrap()
        );
        assert_eq!(
            convert(&SizeInput::UsSize { size: 7.0 }).unwrap(),
            from_us_size(7.0).unwrap()
        );
        assert!(convert(&SizeInput::Calibration(CalibrationSample::new(1.0, 0.0))).is_err());
    }

    #[test]
    fn test_size_band() {
        assert_eq!(size_band(14.0, MeasurementType::Ring), SizeBand::Small);
        assert_eq!(size_band(15.0, MeasurementType::Ring), SizeBand::Medium);
        assert_eq!(size_band(18.0, MeasurementType::Finger), SizeBand::Large);
        assert_eq!(size_band(30.0, MeasurementType::Ring), SizeBand::Large);
        assert_eq!(size_band(15.5, MeasurementType::Bracelet), SizeBand::Small);
        assert_eq!(size_band(17.0, MeasurementType::Bracelet), SizeBand::Medium);
    }
}
