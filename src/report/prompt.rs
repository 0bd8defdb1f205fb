//! Report prompt assembly
//! Renders the verified performance numbers and selected stories into a
//! compliance-constrained generation request. Strictly a deterministic
//! renderer: nothing is emitted that is not present in the inputs.

use std::collections::BTreeMap;

use super::market::MarketSnapshot;
use super::themes::ThemeLabel;
use super::ReportRange;
use crate::data::Article;

pub const SYSTEM_PROMPT: &str = "\
You are a senior financial market analyst writing a professional market insights report for institutional clients.

CRITICAL INSTRUCTIONS - COMPLIANCE & ACCURACY:
- Use ONLY the provided market data and news articles
- ALWAYS include source links for any news references in your analysis
- When mentioning news stories, format as: \"According to Benzinga [insert URL], [story details]\"
- Add clear disclaimers that news content comes from third-party sources
- Write with authority but acknowledge information sources transparently
- Focus on analysis and interpretation rather than republishing news content
- Maintain professional tone suitable for institutional clients

COMPLIANCE REQUIREMENTS:
- Include source attribution for all news references
- Add disclaimers about third-party content
- Focus on data analysis rather than news republication
- Ensure readers can verify original sources independently";

const ENTRY_DISCLAIMER: &str =
    "This is a third-party news source. Please verify independently.";

/// A fully rendered generation request for the language-generation service
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Render the performance block: indices in configured order, sectors
/// re-sorted by change descending, stocks by absolute change descending
/// capped at the ten biggest movers. Every line carries an explicit sign.
pub fn performance_summary(snapshot: &MarketSnapshot, range: &ReportRange) -> String {
    let date_range = range.display();
    let mut lines = Vec::new();

    lines.push(format!("MARKET PERFORMANCE ({}):", date_range));
    for series in &snapshot.indices {
        lines.push(format!(
            "• {}: {:+.2}%",
            series.instrument.display_name, series.change_pct
        ));
    }

    if !snapshot.sectors.is_empty() {
        lines.push(format!("\nSECTOR PERFORMANCE ({}):", date_range));
        let mut sectors: Vec<_> = snapshot.sectors.iter().collect();
        sectors.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct));
        for series in sectors {
            lines.push(format!(
                "• {}: {:+.2}%",
                series.instrument.display_name, series.change_pct
            ));
        }
    }

    if !snapshot.stocks.is_empty() {
        lines.push(format!("\nNOTABLE STOCK MOVEMENTS ({}):", date_range));
        let mut stocks: Vec<_> = snapshot.stocks.iter().collect();
        stocks.sort_by(|a, b| b.change_pct.abs().total_cmp(&a.change_pct.abs()));
        for series in stocks.iter().take(10) {
            lines.push(format!(
                "• {}: {:+.2}%",
                series.instrument.symbol, series.change_pct
            ));
        }
    }

    lines.join("\n")
}

/// Truncate a teaser to `limit` characters, appending an ellipsis marker
/// when anything was cut. Operates on chars, never mid-codepoint.
pub fn truncate_teaser(teaser: &str, limit: usize) -> String {
    if teaser.chars().count() > limit {
        let mut truncated: String = teaser.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        teaser.to_string()
    }
}

/// Render the themed news block with per-entry source attribution and a
/// literal third-party disclaimer on every entry
pub fn news_summary(
    key_stories: &BTreeMap<ThemeLabel, Vec<Article>>,
    teaser_limit: usize,
) -> String {
    let mut lines = Vec::new();

    for (theme, articles) in key_stories {
        if articles.is_empty() {
            continue;
        }
        lines.push(format!("\n{}:", theme.display_name().to_uppercase()));

        for (i, article) in articles.iter().enumerate() {
            lines.push(format!("{}. TITLE: {}", i + 1, article.title));
            lines.push(format!("   DATE: {}", article.created));
            lines.push(format!(
                "   SUMMARY: {}",
                truncate_teaser(&article.teaser, teaser_limit)
            ));
            lines.push("   SOURCE: Benzinga".to_string());
            lines.push(format!("   FULL ARTICLE: {}", article.url));
            lines.push(format!("   DISCLAIMER: {}", ENTRY_DISCLAIMER));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

/// Assemble the full generation request from the rendered blocks
pub fn build_report_request(
    snapshot: &MarketSnapshot,
    key_stories: &BTreeMap<ThemeLabel, Vec<Article>>,
    range: &ReportRange,
    teaser_limit: usize,
    max_tokens: u32,
    temperature: f32,
) -> ReportRequest {
    let performance = performance_summary(snapshot, range);
    let news = news_summary(key_stories, teaser_limit);

    let user_prompt = format!(
        "\
Generate a comprehensive market insights report for the period {date_range}:

MARKET PERFORMANCE DATA (Verified):
{performance}

KEY NEWS DEVELOPMENTS WITH SOURCES:
{news}

COMPLIANCE INSTRUCTIONS:
- For any news story mentioned, include the source URL from the data above
- Use format: \"According to Benzinga (URL), [brief summary]\"
- Add disclaimer: \"Readers should verify information independently from original sources\"
- Focus on analytical insights rather than republishing full news content

Structure the report with these sections:
1. Executive Summary (3-4 key themes with source links)
2. Market Performance Analysis (indices, sectors, notable movements)
3. Key Developments During Period (major themes with source links and disclaimers)
4. Notable Stock Movements (significant performers with context)
5. Market Outlook (forward-looking analysis based on trends)
6. Sources & Disclaimers (comprehensive source list and compliance notices)

Target length: 1200-1500 words. Write for sophisticated investors expecting actionable intelligence with full transparency.",
        date_range = range.display(),
        performance = performance,
        news = news,
    );

    ReportRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt,
        max_tokens,
        temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Instrument;
    use crate::report::market::PriceSeries;
    use chrono::NaiveDate;

    fn series(symbol: &str, name: &str, change_pct: f64) -> PriceSeries {
        PriceSeries {
            instrument: Instrument::new(symbol.to_string(), name.to_string()),
            start_price: 100.0,
            end_price: 100.0 + change_pct,
            change_pct,
        }
    }

    fn range() -> ReportRange {
        ReportRange::new(
            NaiveDate::from_ymd_opt(2025, 8, 11).expect("valid date"),
            NaiveDate::from_ymd_opt(2025, 8, 18).expect("valid date"),
        )
        .expect("valid range")
    }

    fn article(title: &str, teaser: &str) -> Article {
        Article {
            title: title.to_string(),
            teaser: teaser.to_string(),
            created: "2025-08-15T09:30:00Z".to_string(),
            url: "https://example.com/story".to_string(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_performance_lines_carry_explicit_sign() {
        let snapshot = MarketSnapshot {
            indices: vec![series("^GSPC", "S&P 500", 2.5), series("^DJI", "Dow Jones", -1.25)],
            sectors: vec![],
            stocks: vec![],
            gaps: vec![],
        };

        let summary = performance_summary(&snapshot, &range());
        assert!(summary.contains("• S&P 500: +2.50%"));
        assert!(summary.contains("• Dow Jones: -1.25%"));
        assert!(summary.contains("August 11, 2025 to August 18, 2025"));
    }

    #[test]
    fn test_sectors_sorted_by_change_descending() {
        let snapshot = MarketSnapshot {
            indices: vec![],
            sectors: vec![
                series("XLF", "Financials", -0.5),
                series("XLK", "Technology", 3.0),
                series("XLE", "Energy", 1.0),
            ],
            stocks: vec![],
            gaps: vec![],
        };

        let summary = performance_summary(&snapshot, &range());
        let tech = summary.find("Technology").expect("Technology present");
        let energy = summary.find("Energy").expect("Energy present");
        let fin = summary.find("Financials").expect("Financials present");
        assert!(tech < energy && energy < fin);
    }

    #[test]
    fn test_stocks_capped_at_ten_by_absolute_change() {
        let stocks: Vec<PriceSeries> = (0..12)
            .map(|i| series(&format!("S{:02}", i), &format!("S{:02}", i), i as f64 - 6.0))
            .collect();
        let snapshot = MarketSnapshot {
            indices: vec![],
            sectors: vec![],
            stocks,
            gaps: vec![],
        };

        let summary = performance_summary(&snapshot, &range());
        let bullet_count = summary.matches("• ").count();
        assert_eq!(bullet_count, 10);
        // Biggest absolute mover first: -6.00
        assert!(summary.contains("• S00: -6.00%"));
        // Smallest absolute movers dropped
        assert!(!summary.contains("• S06: +0.00%"));
    }

    #[test]
    fn test_teaser_truncation() {
        let long = "x".repeat(250);
        let truncated = truncate_teaser(&long, 200);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));

        let short = "short teaser";
        assert_eq!(truncate_teaser(short, 200), short);
    }

    #[test]
    fn test_news_summary_attribution_fields() {
        let mut stories = BTreeMap::new();
        stories.insert(
            ThemeLabel::Earnings,
            vec![article("Apple beats estimates", "Strong quarter")],
        );

        let summary = news_summary(&stories, 200);
        assert!(summary.contains("EARNINGS REPORTS:"));
        assert!(summary.contains("1. TITLE: Apple beats estimates"));
        assert!(summary.contains("   SOURCE: Benzinga"));
        assert!(summary.contains("   FULL ARTICLE: https://example.com/story"));
        assert!(summary.contains("   DISCLAIMER: This is a third-party news source."));
    }

    #[test]
    fn test_request_embeds_both_blocks() {
        let snapshot = MarketSnapshot {
            indices: vec![series("^GSPC", "S&P 500", 2.5)],
            sectors: vec![],
            stocks: vec![],
            gaps: vec![],
        };
        let mut stories = BTreeMap::new();
        stories.insert(ThemeLabel::Crypto, vec![article("Bitcoin rally", "")]);

        let request = build_report_request(&snapshot, &stories, &range(), 200, 2500, 0.7);
        assert!(request.system_prompt.contains("senior financial market analyst"));
        assert!(request.user_prompt.contains("• S&P 500: +2.50%"));
        assert!(request.user_prompt.contains("CRYPTOCURRENCY:"));
        assert!(request.user_prompt.contains("1200-1500 words"));
        assert_eq!(request.max_tokens, 2500);
    }
}
