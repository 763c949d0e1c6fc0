//! Sizing error types

use thiserror::Error;

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// A magnitude was zero or negative
    NonPositive { field: &'static str },
    /// A magnitude was NaN or infinite
    NotFinite { field: &'static str },
    /// The calibration reference circle has no radius
    ZeroReferenceRadius,
}

impl InvalidReason {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            InvalidReason::NonPositive { .. } => "non_positive",
            InvalidReason::NotFinite { .. } => "not_finite",
            InvalidReason::ZeroReferenceRadius => "zero_reference_radius",
        }
    }

    /// Name of the offending input field
    pub fn field(&self) -> &'static str {
        match self {
            InvalidReason::NonPositive { field } | InvalidReason::NotFinite { field } => field,
            InvalidReason::ZeroReferenceRadius => "reference_radius_px",
        }
    }
}

/// Sizing error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    #[error("Invalid input: {message}")]
    InvalidInput {
        reason: InvalidReason,
        message: String,
    },
}

impl SizingError {
    pub fn reason(&self) -> InvalidReason {
        match self {
            SizingError::InvalidInput { reason, .. } => *reason,
        }
    }

    pub(crate) fn non_positive(field: &'static str, value: f64) -> Self {
        SizingError::InvalidInput {
            reason: InvalidReason::NonPositive { field },
            message: format!("{} must be greater than 0 (got {})", field, value),
        }
    }

    pub(crate) fn not_finite(field: &'static str) -> Self {
        SizingError::InvalidInput {
            reason: InvalidReason::NotFinite { field },
            message: format!("{} must be a finite number", field),
        }
    }

    pub(crate) fn zero_reference_radius() -> Self {
        SizingError::InvalidInput {
            reason: InvalidReason::ZeroReferenceRadius,
            message: "reference radius cannot be zero".to_string(),
        }
    }
}

/// Result type for sizing operations
pub type SizingResult<T> = Result<T, SizingError>;
