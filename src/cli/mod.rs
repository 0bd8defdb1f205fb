use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::config::{Config, Universe};
use crate::data::{BenzingaClient, DataError, NewsProvider, PolygonClient};
use crate::llm::OpenAiCompletions;
use crate::report::market::MarketAggregator;
use crate::report::translate::Language;
use crate::report::{prompt, themes, ReportPipeline, ReportRange};

#[derive(Parser)]
#[command(
    name = "marketbrief",
    about = "Market briefing generator: price performance, themed news, LLM-written reports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a full market briefing for a date range
    Generate {
        /// Start of the analysis period (defaults to 7 days ago)
        #[arg(short, long)]
        start_date: Option<NaiveDate>,

        /// End of the analysis period (defaults to today)
        #[arg(short, long)]
        end_date: Option<NaiveDate>,

        /// Report language
        #[arg(short, long, value_enum, default_value_t = Language::English)]
        language: Language,

        /// Top stories to keep per theme
        #[arg(short = 'k', long)]
        stories_per_theme: Option<usize>,
    },

    /// Fetch and print the market performance summary only
    Market {
        /// Start of the analysis period (defaults to 7 days ago)
        #[arg(short, long)]
        start_date: Option<NaiveDate>,

        /// End of the analysis period (defaults to today)
        #[arg(short, long)]
        end_date: Option<NaiveDate>,
    },

    /// Fetch news for a date range and print per-theme article counts
    News {
        /// Start of the analysis period (defaults to 7 days ago)
        #[arg(short, long)]
        start_date: Option<NaiveDate>,

        /// End of the analysis period (defaults to today)
        #[arg(short, long)]
        end_date: Option<NaiveDate>,
    },
}

fn resolve_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<ReportRange> {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let start = start.unwrap_or(end - Duration::days(7));
    Ok(ReportRange::new(start, end)?)
}

fn benzinga_client(config: &Config) -> Result<BenzingaClient> {
    let api_key = config.providers.benzinga_api_key.clone().ok_or_else(|| {
        DataError::Config("BENZINGA_API_KEY environment variable is required but not set".to_string())
    })?;
    Ok(BenzingaClient::new(api_key, config.providers.timeout_seconds))
}

fn polygon_client(config: &Config) -> Result<PolygonClient> {
    let api_key = config.providers.polygon_api_key.clone().ok_or_else(|| {
        DataError::Config("POLYGON_API_KEY environment variable is required but not set".to_string())
    })?;
    Ok(PolygonClient::new(api_key, config.providers.timeout_seconds))
}

/// Execute the parsed CLI command
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Generate {
            start_date,
            end_date,
            language,
            stories_per_theme,
        } => {
            let range = resolve_range(start_date, end_date)?;
            info!("Generating {} briefing for {}", language, range.display());

            let mut report_config = config.report.clone();
            if let Some(k) = stories_per_theme {
                report_config.stories_per_theme = k;
            }

            let pipeline = ReportPipeline::new(
                polygon_client(&config)?,
                benzinga_client(&config)?,
                OpenAiCompletions::from_config(&config)?,
                Universe::default(),
                config.llm.clone(),
                report_config,
            );

            let report = pipeline.generate(range, language).await?;

            debug!(
                summary = %serde_json::to_string(&report.summary)?,
                "Report summary"
            );
            println!("{}", report.content);
        }

        Commands::Market {
            start_date,
            end_date,
        } => {
            let range = resolve_range(start_date, end_date)?;
            let provider = polygon_client(&config)?;
            let universe = Universe::default();

            let snapshot = MarketAggregator::new(&provider, &universe)
                .build_snapshot(&range)
                .await;

            println!("{}", prompt::performance_summary(&snapshot, &range));
            if !snapshot.gaps.is_empty() {
                println!("\nInstruments without data: {}", snapshot.gaps.len());
            }
        }

        Commands::News {
            start_date,
            end_date,
        } => {
            let range = resolve_range(start_date, end_date)?;
            let client = benzinga_client(&config)?;

            let articles = client
                .fetch_articles(range.start, range.end, config.report.page_size)
                .await?;
            println!("Fetched {} articles for {}", articles.len(), range.display());

            let buckets = themes::bucket_by_theme(&articles, &themes::ThemeRules::default());
            for (theme, bucket) in &buckets {
                println!("{:<40} {}", theme.display_name(), bucket.len());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benzinga_client_requires_api_key() {
        let mut config = Config::default();
        config.providers.benzinga_api_key = None;

        let err = benzinga_client(&config).expect_err("missing key should fail");
        assert!(err.to_string().contains("BENZINGA_API_KEY"));
    }

    #[test]
    fn test_polygon_client_requires_api_key() {
        let mut config = Config::default();
        config.providers.polygon_api_key = None;

        let err = polygon_client(&config).expect_err("missing key should fail");
        assert!(err.to_string().contains("POLYGON_API_KEY"));
    }
}
