use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

use crate::data::Instrument;
use crate::report::translate::Language;

#[derive(Debug, Clone)]
pub struct Config {
    pub providers: ProviderConfig,
    pub llm: LlmConfig,
    pub report: ReportConfig,
}

/// API credentials and transport settings for the external providers.
/// Keys are optional here; a client that actually needs one fails with a
/// configuration error at the point of use, not at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub benzinga_api_key: Option<String>,
    pub polygon_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub timeout_seconds: u64,
    pub report_max_tokens: u32,
    pub report_temperature: f32,
    pub translation_max_tokens: u32,
    pub translation_temperature: f32,
}

/// Tunable report-shaping knobs. The scoring weights and keyword tables live
/// in their own structs next to the code that evaluates them.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Top stories to keep per theme (K)
    pub stories_per_theme: usize,
    /// Maximum articles requested from the news provider
    pub page_size: usize,
    /// Teaser truncation length in the rendered news block
    pub teaser_limit: usize,
    pub language: Language,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file - this sets env vars that aren't already set
        dotenv::dotenv().ok();

        let config = Config {
            providers: ProviderConfig {
                benzinga_api_key: env::var("BENZINGA_API_KEY").ok(),
                polygon_api_key: env::var("POLYGON_API_KEY").ok(),
                openai_api_key: env::var("OPENAI_API_KEY").ok(),
                timeout_seconds: env::var("HTTP_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .context("Invalid HTTP_TIMEOUT_SECONDS value")?,
            },
            llm: LlmConfig {
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                timeout_seconds: env::var("LLM_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "120".to_string())
                    .parse()
                    .context("Invalid LLM_TIMEOUT_SECONDS value")?,
                report_max_tokens: env::var("REPORT_MAX_TOKENS")
                    .unwrap_or_else(|_| "2500".to_string())
                    .parse()
                    .context("Invalid REPORT_MAX_TOKENS value")?,
                report_temperature: env::var("REPORT_TEMPERATURE")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()
                    .context("Invalid REPORT_TEMPERATURE value")?,
                translation_max_tokens: env::var("TRANSLATION_MAX_TOKENS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("Invalid TRANSLATION_MAX_TOKENS value")?,
                translation_temperature: env::var("TRANSLATION_TEMPERATURE")
                    .unwrap_or_else(|_| "0.3".to_string())
                    .parse()
                    .context("Invalid TRANSLATION_TEMPERATURE value")?,
            },
            report: ReportConfig {
                stories_per_theme: env::var("STORIES_PER_THEME")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()
                    .context("Invalid STORIES_PER_THEME value")?,
                page_size: env::var("NEWS_PAGE_SIZE")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .context("Invalid NEWS_PAGE_SIZE value")?,
                teaser_limit: env::var("TEASER_LIMIT")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .context("Invalid TEASER_LIMIT value")?,
                language: Language::English,
            },
        };

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProviderConfig {
                benzinga_api_key: None,
                polygon_api_key: None,
                openai_api_key: None,
                timeout_seconds: 30,
            },
            llm: LlmConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            timeout_seconds: 120,
            report_max_tokens: 2500,
            report_temperature: 0.7,
            translation_max_tokens: 3000,
            translation_temperature: 0.3,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            stories_per_theme: 3,
            page_size: 200,
            teaser_limit: 200,
            language: Language::English,
        }
    }
}

/// The fixed instrument lists the aggregator tracks, partitioned into three
/// disjoint groups. Index order is the display order of the rendered summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub indices: Vec<Instrument>,
    pub sectors: Vec<Instrument>,
    pub stocks: Vec<Instrument>,
}

impl Default for Universe {
    fn default() -> Self {
        let indices = vec![
            Instrument::new("^GSPC", "S&P 500"),
            Instrument::new("^DJI", "Dow Jones"),
            Instrument::new("^IXIC", "NASDAQ"),
            Instrument::new("^RUT", "Russell 2000"),
            Instrument::new("^VIX", "VIX"),
            Instrument::new("^STOXX50E", "Euro Stoxx 50"),
            Instrument::new("^FTSE", "FTSE 100"),
            Instrument::new("^GDAXI", "DAX"),
            Instrument::new("^FCHI", "CAC 40"),
            Instrument::new("^HSI", "Hang Seng"),
            Instrument::new("^N225", "Nikkei 225"),
            Instrument::new("000001.SS", "Shanghai Composite"),
            Instrument::new("^STI", "Straits Times Index"),
            Instrument::new("EURUSD=X", "EUR/USD"),
            Instrument::new("GBPUSD=X", "GBP/USD"),
            Instrument::new("USDJPY=X", "USD/JPY"),
            Instrument::new("USDCNY=X", "USD/CNY"),
            Instrument::new("GC=F", "Gold"),
            Instrument::new("CL=F", "Crude Oil"),
            Instrument::new("^TNX", "10-Year Treasury"),
        ];

        let sectors = vec![
            Instrument::new("XLK", "Technology"),
            Instrument::new("XLF", "Financials"),
            Instrument::new("XLV", "Healthcare"),
            Instrument::new("XLE", "Energy"),
            Instrument::new("XLI", "Industrials"),
            Instrument::new("XLP", "Consumer Staples"),
            Instrument::new("XLY", "Consumer Discretionary"),
            Instrument::new("XLU", "Utilities"),
            Instrument::new("XLB", "Materials"),
            Instrument::new("XLRE", "Real Estate"),
            Instrument::new("XLC", "Communication Services"),
        ];

        // Major US names followed by the Southeast Asia / China ADR watchlist
        let stocks = [
            "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM", "JNJ", "V", "WMT",
            "UNH", "HD", "PG", "MA", "BABA", "JD", "TCEHY", "PDD", "BIDU", "GRAB", "SEA",
        ]
        .iter()
        .map(|s| Instrument::ticker(*s))
        .collect();

        Self {
            indices,
            sectors,
            stocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_universe_groups() {
        let universe = Universe::default();
        assert_eq!(universe.indices.len(), 20);
        assert_eq!(universe.sectors.len(), 11);
        assert_eq!(universe.stocks.len(), 22);

        // Groups are disjoint
        let all: Vec<&str> = universe
            .indices
            .iter()
            .chain(&universe.sectors)
            .chain(&universe.stocks)
            .map(|i| i.symbol.as_str())
            .collect();
        let unique: std::collections::HashSet<&str> = all.iter().copied().collect();
        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn test_equity_display_name_is_ticker() {
        let universe = Universe::default();
        for stock in &universe.stocks {
            assert_eq!(stock.symbol, stock.display_name);
        }
    }
}
