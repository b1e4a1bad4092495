//! Order book module for liquidity checks.
//!
//! This module handles:
//! - Price level types and normalization
//! - Depth aggregation over the top of the book

pub mod aggregator;
pub mod types;

pub use aggregator::depth_usd;
pub use types::{normalize_levels, PriceLevel};
