//! Tool error types
//!
//! Keeps caller mistakes apart from storage failures so the MCP layer can
//! report each with the right error code.

use thiserror::Error;

use crate::db::DbError;
use crate::sizing::SizingError;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Rejected request parameters
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Sizing(#[from] SizingError),

    #[error(transparent)]
    Database(#[from] DbError),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidInput(message.into())
    }

    /// Whether the caller can fix the request
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, ToolError::Database(_))
    }
}

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;
