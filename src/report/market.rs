//! Market performance aggregation
//! Turns raw closing-price series for the configured universe into
//! percentage-change summaries, tolerating per-instrument data gaps

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::ReportRange;
use crate::config::Universe;
use crate::data::{ClosePoint, Instrument, PriceProvider};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage-change summary for one instrument over the report window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub instrument: Instrument,
    pub start_price: f64,
    pub end_price: f64,
    pub change_pct: f64,
}

impl PriceSeries {
    /// Build from an ordered close series. Returns None when fewer than two
    /// observations exist; such instruments are omitted from the snapshot.
    pub fn from_closes(instrument: Instrument, closes: &[ClosePoint]) -> Option<Self> {
        let first = closes.first()?;
        let last = closes.last()?;
        if closes.len() < 2 {
            return None;
        }

        let change_pct = round2((last.close - first.close) / first.close * 100.0);
        Some(Self {
            instrument,
            start_price: round2(first.close),
            end_price: round2(last.close),
            change_pct,
        })
    }
}

/// Why an instrument is missing from the snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum GapReason {
    /// Fewer than two closes in the window
    NoData,
    /// The provider call failed outright
    Provider(String),
}

/// Explicit record of a soft failure, kept for observability instead of
/// silently swallowing the instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentGap {
    pub symbol: String,
    pub reason: GapReason,
}

/// Aggregate price performance for one date range. Group vectors may be
/// empty but are always present; `indices` keeps the configured order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub indices: Vec<PriceSeries>,
    pub sectors: Vec<PriceSeries>,
    pub stocks: Vec<PriceSeries>,
    pub gaps: Vec<InstrumentGap>,
}

/// Builds a MarketSnapshot from a price provider and the configured universe
pub struct MarketAggregator<'a, P: PriceProvider> {
    provider: &'a P,
    universe: &'a Universe,
}

impl<'a, P: PriceProvider> MarketAggregator<'a, P> {
    pub fn new(provider: &'a P, universe: &'a Universe) -> Self {
        Self { provider, universe }
    }

    /// Fetch every configured instrument over the widened window and compute
    /// percentage changes. Per-instrument failures are soft: the instrument
    /// is recorded as a gap and processing continues. Never errors.
    pub async fn build_snapshot(&self, range: &ReportRange) -> MarketSnapshot {
        let mut gaps = Vec::new();

        let indices = self
            .collect_group(&self.universe.indices, range, &mut gaps)
            .await;
        let sectors = self
            .collect_group(&self.universe.sectors, range, &mut gaps)
            .await;
        let stocks = self
            .collect_group(&self.universe.stocks, range, &mut gaps)
            .await;

        let snapshot = MarketSnapshot {
            indices,
            sectors,
            stocks,
            gaps,
        };

        info!(
            "Market snapshot built: {} indices, {} sectors, {} stocks, {} gaps",
            snapshot.indices.len(),
            snapshot.sectors.len(),
            snapshot.stocks.len(),
            snapshot.gaps.len()
        );

        snapshot
    }

    async fn collect_group(
        &self,
        instruments: &[Instrument],
        range: &ReportRange,
        gaps: &mut Vec<InstrumentGap>,
    ) -> Vec<PriceSeries> {
        let mut group = Vec::new();

        for instrument in instruments {
            match self.fetch_series(instrument, range).await {
                Ok(Some(series)) => group.push(series),
                Ok(None) => {
                    warn!(
                        "No usable price data for {} in {} to {}",
                        instrument.symbol, range.start, range.end
                    );
                    gaps.push(InstrumentGap {
                        symbol: instrument.symbol.clone(),
                        reason: GapReason::NoData,
                    });
                }
                Err(e) => {
                    warn!("Price fetch failed for {}: {}", instrument.symbol, e);
                    gaps.push(InstrumentGap {
                        symbol: instrument.symbol.clone(),
                        reason: GapReason::Provider(e.to_string()),
                    });
                }
            }
        }

        group
    }

    async fn fetch_series(
        &self,
        instrument: &Instrument,
        range: &ReportRange,
    ) -> crate::data::DataResult<Option<PriceSeries>> {
        // The widened end bound includes the end date's close even when the
        // provider treats its end bound as exclusive
        let closes = self
            .provider
            .fetch_close_series(&instrument.symbol, range.start, range.fetch_end())
            .await?;

        Ok(PriceSeries::from_closes(instrument.clone(), &closes))
    }
}
