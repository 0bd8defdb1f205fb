//! Report synthesis pipeline
//! Coordinates the full flow: price aggregation → news classification →
//! story extraction → prompt assembly → generation → optional translation

pub mod market;
pub mod prompt;
pub mod scoring;
pub mod themes;
pub mod translate;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::{LlmConfig, ReportConfig, Universe};
use crate::data::{DataError, NewsProvider, PriceProvider};
use crate::llm::CompletionClient;
use market::{MarketAggregator, MarketSnapshot};
use scoring::ScoringConfig;
use themes::ThemeRules;
use translate::Language;

/// Inclusive report period. Construction enforces start strictly before end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start >= end {
            return Err(ReportError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// End bound for price fetches, widened by one day so the end date's
    /// close is included when the provider's end bound is exclusive
    pub fn fetch_end(&self) -> NaiveDate {
        self.end + Duration::days(1)
    }

    /// Human-readable period, e.g. "August 11, 2025 to August 18, 2025"
    pub fn display(&self) -> String {
        format!(
            "{} to {}",
            self.start.format("%B %d, %Y"),
            self.end.format("%B %d, %Y")
        )
    }
}

/// Pipeline failures a caller must distinguish: bad input, upstream outage,
/// and an empty news window are separate outcomes. Soft data gaps never
/// surface here.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid date range: start {start} must be strictly before end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("No articles found between {start} and {end}")]
    NoArticles { start: NaiveDate, end: NaiveDate },

    #[error("News fetch failed: {0}")]
    News(#[from] DataError),

    #[error("Report generation failed: {0}")]
    Generation(#[source] anyhow::Error),
}

/// Machine-readable companion to the report text, for downstream exporters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub period: ReportRange,
    pub language: Language,
    pub articles_count: usize,
    pub themes_count: usize,
    pub market_snapshot: MarketSnapshot,
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub content: String,
    pub summary: ReportSummary,
}

/// The report pipeline over pluggable providers. One report build in flight
/// per invocation; the providers are called sequentially.
pub struct ReportPipeline<P, N, C> {
    prices: P,
    news: N,
    completions: C,
    universe: Universe,
    rules: ThemeRules,
    scoring: ScoringConfig,
    llm_config: LlmConfig,
    report_config: ReportConfig,
}

impl<P, N, C> ReportPipeline<P, N, C>
where
    P: PriceProvider,
    N: NewsProvider,
    C: CompletionClient,
{
    pub fn new(
        prices: P,
        news: N,
        completions: C,
        universe: Universe,
        llm_config: LlmConfig,
        report_config: ReportConfig,
    ) -> Self {
        Self {
            prices,
            news,
            completions,
            universe,
            rules: ThemeRules::default(),
            scoring: ScoringConfig::default(),
            llm_config,
            report_config,
        }
    }

    /// Run the full pipeline for the given period and target language
    pub async fn generate(
        &self,
        range: ReportRange,
        language: Language,
    ) -> Result<GeneratedReport, ReportError> {
        self.generate_at(range, language, Utc::now()).await
    }

    /// Same as `generate` but with an injected evaluation time, so story
    /// scoring is reproducible in tests
    pub async fn generate_at(
        &self,
        range: ReportRange,
        language: Language,
        now: chrono::DateTime<Utc>,
    ) -> Result<GeneratedReport, ReportError> {
        info!("📈 Building market snapshot for {}", range.display());
        let snapshot = MarketAggregator::new(&self.prices, &self.universe)
            .build_snapshot(&range)
            .await;

        info!("📰 Fetching news articles");
        let articles = self
            .news
            .fetch_articles(range.start, range.end, self.report_config.page_size)
            .await?;

        if articles.is_empty() {
            return Err(ReportError::NoArticles {
                start: range.start,
                end: range.end,
            });
        }

        info!("🔍 Classifying {} articles by theme", articles.len());
        let buckets = themes::bucket_by_theme(&articles, &self.rules);
        let key_stories = scoring::extract_key_stories(
            &buckets,
            self.report_config.stories_per_theme,
            now,
            &self.scoring,
        );

        info!("✍️ Generating report ({} themes)", key_stories.len());
        let request = prompt::build_report_request(
            &snapshot,
            &key_stories,
            &range,
            self.report_config.teaser_limit,
            self.llm_config.report_max_tokens,
            self.llm_config.report_temperature,
        );

        let content = self
            .completions
            .complete(
                &request.system_prompt,
                &request.user_prompt,
                request.max_tokens,
                request.temperature,
            )
            .await
            .map_err(ReportError::Generation)?;

        let content = translate::translate(&self.completions, &content, language, &self.llm_config)
            .await;

        let summary = ReportSummary {
            period: range,
            language,
            articles_count: articles.len(),
            themes_count: buckets.len(),
            market_snapshot: snapshot,
        };

        info!("✅ Report generated ({} chars)", content.len());
        Ok(GeneratedReport { content, summary })
    }
}
