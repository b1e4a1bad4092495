//! Maps configured venue names to adapters.

use std::str::FromStr;
use std::sync::Arc;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{info, warn};

use super::adapter::ExchangeAdapter;
use super::types::ExchangeId;
use super::venues::{
    Binance, Bitfinex, Bitget, Bitstamp, Bybit, Coinbase, GateIo, Htx, Kraken, KuCoin, Mexc, Okx,
    RestExchange,
};

/// Supported venues. Legacy names are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum VenueKind {
    #[strum(to_string = "binance")]
    Binance,
    #[strum(to_string = "bybit")]
    Bybit,
    #[strum(to_string = "okx")]
    Okx,
    #[strum(to_string = "kucoin")]
    KuCoin,
    #[strum(to_string = "gateio", serialize = "gate")]
    GateIo,
    #[strum(to_string = "mexc")]
    Mexc,
    #[strum(to_string = "bitget")]
    Bitget,
    #[strum(to_string = "kraken")]
    Kraken,
    #[strum(to_string = "coinbase", serialize = "coinbasepro")]
    Coinbase,
    #[strum(to_string = "bitfinex")]
    Bitfinex,
    #[strum(to_string = "htx", serialize = "huobi", serialize = "huobipro")]
    Htx,
    #[strum(to_string = "bitstamp")]
    Bitstamp,
}

impl VenueKind {
    /// Construct the REST adapter for this venue.
    pub fn build(self, http: reqwest::Client, concurrency: usize) -> Arc<dyn ExchangeAdapter> {
        match self {
            VenueKind::Binance => Arc::new(RestExchange::new(Binance::default(), http, concurrency)),
            VenueKind::Bybit => Arc::new(RestExchange::new(Bybit::default(), http, concurrency)),
            VenueKind::Okx => Arc::new(RestExchange::new(Okx::default(), http, concurrency)),
            VenueKind::KuCoin => Arc::new(RestExchange::new(KuCoin::default(), http, concurrency)),
            VenueKind::GateIo => Arc::new(RestExchange::new(GateIo::default(), http, concurrency)),
            VenueKind::Mexc => Arc::new(RestExchange::new(Mexc::default(), http, concurrency)),
            VenueKind::Bitget => Arc::new(RestExchange::new(Bitget::default(), http, concurrency)),
            VenueKind::Kraken => Arc::new(RestExchange::new(Kraken::default(), http, concurrency)),
            VenueKind::Coinbase => {
                Arc::new(RestExchange::new(Coinbase::default(), http, concurrency))
            }
            VenueKind::Bitfinex => {
                Arc::new(RestExchange::new(Bitfinex::default(), http, concurrency))
            }
            VenueKind::Htx => Arc::new(RestExchange::new(Htx::default(), http, concurrency)),
            VenueKind::Bitstamp => {
                Arc::new(RestExchange::new(Bitstamp::default(), http, concurrency))
            }
        }
    }

    /// Canonical names of every supported venue.
    pub fn supported() -> Vec<String> {
        VenueKind::iter().map(|v| v.to_string()).collect()
    }
}

/// Canonical id for a venue name or one of its legacy aliases.
///
/// `huobipro` resolves to `htx`, `coinbasepro` to `coinbase`. Returns `None`
/// for names no adapter exists for.
pub fn resolve_exchange(name: &str) -> Option<ExchangeId> {
    VenueKind::from_str(name.trim())
        .ok()
        .map(|kind| ExchangeId::new(&kind.to_string()))
}

/// Ordered set of adapters, at most one per venue id.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ExchangeAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for the configured names, skipping unknown and duplicate ones.
    pub fn from_names(names: &[String], http: reqwest::Client, concurrency: usize) -> Self {
        let mut registry = Self::new();
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match VenueKind::from_str(name) {
                Ok(kind) => {
                    registry.register(kind.build(http.clone(), concurrency));
                }
                Err(_) => {
                    warn!(
                        exchange = name,
                        supported = %VenueKind::supported().join(","),
                        "Unsupported exchange, skipping"
                    );
                }
            }
        }

        info!(
            exchanges = registry.len(),
            ids = %registry.ids().iter().map(|id| id.as_str()).collect::<Vec<_>>().join(","),
            "Exchange adapters loaded"
        );
        registry
    }

    /// Add an adapter. Returns `false` if its id is already registered.
    pub fn register(&mut self, adapter: Arc<dyn ExchangeAdapter>) -> bool {
        if self.get(adapter.id()).is_some() {
            warn!(exchange = %adapter.id(), "Duplicate exchange, skipping");
            return false;
        }
        self.adapters.push(adapter);
        true
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, adapter: Arc<dyn ExchangeAdapter>) -> Self {
        self.register(adapter);
        self
    }

    /// Look up an adapter by id.
    pub fn get(&self, id: &ExchangeId) -> Option<&Arc<dyn ExchangeAdapter>> {
        self.adapters.iter().find(|a| a.id() == id)
    }

    /// All adapters in registration order.
    pub fn adapters(&self) -> &[Arc<dyn ExchangeAdapter>] {
        &self.adapters
    }

    /// Registered ids in order.
    pub fn ids(&self) -> Vec<ExchangeId> {
        self.adapters.iter().map(|a| a.id().clone()).collect()
    }

    /// Number of adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapters are registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::MockExchange;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aliases_resolve_to_canonical_venues() {
        assert_eq!(VenueKind::from_str("huobipro").unwrap(), VenueKind::Htx);
        assert_eq!(VenueKind::from_str("huobi").unwrap(), VenueKind::Htx);
        assert_eq!(VenueKind::from_str("coinbasepro").unwrap(), VenueKind::Coinbase);
        assert_eq!(VenueKind::from_str("gate").unwrap(), VenueKind::GateIo);
        assert_eq!(VenueKind::from_str("Binance").unwrap(), VenueKind::Binance);
        assert_eq!(VenueKind::Htx.to_string(), "htx");
        assert_eq!(VenueKind::supported().len(), 12);
    }

    #[test]
    fn resolve_exchange_uses_canonical_ids() {
        assert_eq!(resolve_exchange("huobipro"), Some(ExchangeId::new("htx")));
        assert_eq!(resolve_exchange(" CoinbasePro "), Some(ExchangeId::new("coinbase")));
        assert_eq!(resolve_exchange("okx"), Some(ExchangeId::new("okx")));
        assert_eq!(resolve_exchange("binace"), None);
    }

    #[test]
    fn registry_skips_unknown_and_duplicates() {
        let http = reqwest::Client::new();
        let registry = AdapterRegistry::from_names(
            &names(&["binance", "nosuchex", "huobipro", "htx", " okx "]),
            http,
            4,
        );

        let ids: Vec<String> = registry.ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["binance", "htx", "okx"]);
    }

    #[test]
    fn registry_lookup_by_id() {
        let registry = AdapterRegistry::new()
            .with(Arc::new(MockExchange::new("binance")))
            .with(Arc::new(MockExchange::new("okx")));

        assert!(registry.get(&ExchangeId::new("okx")).is_some());
        assert!(registry.get(&ExchangeId::new("kraken")).is_none());
        assert_eq!(registry.len(), 2);
    }
}
