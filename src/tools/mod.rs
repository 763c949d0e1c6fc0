//! RingFit Tools module
//!
//! MCP tool implementations for jewelry sizing and the marketplace.

pub mod error;
pub mod gold_prices;
pub mod measurements;
pub mod products;
pub mod settings;
pub mod status;

pub use error::{ToolError, ToolResult};
