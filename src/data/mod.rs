//! Data layer for fetching closing-price series and news articles
//! Providers are trait objects so the pipeline can be exercised offline

pub mod errors;
pub mod news;
pub mod prices;

// Re-export commonly used types
pub use errors::{DataError, DataResult};
pub use news::{Article, BenzingaClient, NewsProvider};
pub use prices::{ClosePoint, PolygonClient, PriceProvider};

use serde::{Deserialize, Serialize};

/// A tracked index, sector proxy, or individual equity.
/// Defined by static configuration, never by user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub display_name: String,
}

impl Instrument {
    pub fn new<S: Into<String>>(symbol: S, display_name: S) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
        }
    }

    /// Equities are labeled by ticker alone
    pub fn ticker<S: Into<String> + Clone>(symbol: S) -> Self {
        Self {
            symbol: symbol.clone().into(),
            display_name: symbol.into(),
        }
    }
}
