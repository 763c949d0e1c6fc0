//! Sizing module
//!
//! Converts raw measurements into ring/bracelet sizes and matches them
//! against catalog listings.

pub mod converter;
pub mod error;
pub mod matcher;
pub mod units;

pub use converter::{
    convert, from_calibration, from_circumference, from_diameter, from_eu_size, from_us_size,
    size_band,
};
pub use error::{InvalidReason, SizingError, SizingResult};
pub use matcher::{is_match, match_products, matching_checks, SizeCheck};
pub use units::{
    mm_to_inches, round_to, CalibrationSample, Listing, Measurement, MeasurementType, SizeBand,
    SizeFields, SizeInput, DEFAULT_REFERENCE_DIAMETER_MM,
};
