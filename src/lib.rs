//! RingFit Library
//!
//! Jewelry sizing conversions, catalog matching, and the marketplace store.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod sizing;
pub mod tools;
