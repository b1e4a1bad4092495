//! Exchange module for public market data.
//!
//! This module handles:
//! - Pair, venue and quote types
//! - The adapter trait and registry
//! - Generic REST adapter plus per-venue payload parsing
//! - Mock adapter for testing

pub mod adapter;
pub mod client;
pub mod mock;
pub mod registry;
pub mod types;
pub mod venues;

pub use adapter::{ExchangeAdapter, QuoteMap};
pub use client::build_http_client;
pub use mock::MockExchange;
pub use registry::{resolve_exchange, AdapterRegistry, VenueKind};
pub use types::{BookSide, ExchangeId, PriceQuote, TradingPair};
