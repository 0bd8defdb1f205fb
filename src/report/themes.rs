//! Multi-label keyword classification of news articles
//! A declarative rule table is evaluated by a pure function, so rules stay
//! testable independently of any I/O

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::data::Article;

/// Fixed theme vocabulary. Declaration order is the rule-table order and,
/// via `Ord`, the rendering order of the themed news block.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThemeLabel {
    Earnings,
    FedPolicy,
    TradeTensions,
    TechDevelopments,
    Geopolitical,
    MarketMovements,
    DealsMa,
    ChinaSea,
    Crypto,
    /// Fallback for articles matching no rule
    Other,
}

impl ThemeLabel {
    /// Human heading used in the rendered news summary
    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeLabel::Earnings => "Earnings Reports",
            ThemeLabel::FedPolicy => "Federal Reserve & Monetary Policy",
            ThemeLabel::TradeTensions => "Trade & Tariffs",
            ThemeLabel::TechDevelopments => "Technology Developments",
            ThemeLabel::Geopolitical => "Geopolitical Events",
            ThemeLabel::MarketMovements => "Major Market Movements",
            ThemeLabel::DealsMa => "Mergers & Acquisitions",
            ThemeLabel::ChinaSea => "China & Asia-Pacific",
            ThemeLabel::Crypto => "Cryptocurrency",
            ThemeLabel::Other => "Other Notable News",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeLabel::Earnings => "earnings",
            ThemeLabel::FedPolicy => "fed_policy",
            ThemeLabel::TradeTensions => "trade_tensions",
            ThemeLabel::TechDevelopments => "tech_developments",
            ThemeLabel::Geopolitical => "geopolitical",
            ThemeLabel::MarketMovements => "market_movements",
            ThemeLabel::DealsMa => "deals_ma",
            ThemeLabel::ChinaSea => "china_sea",
            ThemeLabel::Crypto => "crypto",
            ThemeLabel::Other => "other",
        }
    }
}

impl fmt::Display for ThemeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(label, keywords)` rule table. A rule matches when any of its
/// keywords appears as a case-insensitive substring of title + teaser.
#[derive(Debug, Clone)]
pub struct ThemeRules {
    pub rules: Vec<(ThemeLabel, Vec<&'static str>)>,
}

impl Default for ThemeRules {
    fn default() -> Self {
        Self {
            rules: vec![
                (
                    ThemeLabel::Earnings,
                    vec!["earnings", "revenue", "profit", "quarterly", "eps"],
                ),
                (
                    ThemeLabel::FedPolicy,
                    vec!["fed", "federal reserve", "interest rates", "powell", "monetary"],
                ),
                (
                    ThemeLabel::TradeTensions,
                    vec!["tariff", "trade war", "trade deal", "import", "export"],
                ),
                (
                    ThemeLabel::TechDevelopments,
                    vec!["ai", "artificial intelligence", "tech", "semiconductor", "chip"],
                ),
                (
                    ThemeLabel::Geopolitical,
                    vec!["trump", "election", "government", "policy", "regulation"],
                ),
                (
                    ThemeLabel::MarketMovements,
                    vec!["surge", "plunge", "rally", "crash", "soar", "tumble"],
                ),
                (
                    ThemeLabel::DealsMa,
                    vec!["merger", "acquisition", "deal", "buyout", "takeover"],
                ),
                (
                    ThemeLabel::ChinaSea,
                    vec!["china", "chinese", "asia", "singapore", "hong kong"],
                ),
                (
                    ThemeLabel::Crypto,
                    vec!["bitcoin", "crypto", "blockchain", "ethereum"],
                ),
            ],
        }
    }
}

/// Classify a text against the rule table. Multi-label: every matching rule
/// contributes its label. A text matching nothing gets exactly the fallback.
pub fn classify(text: &str, rules: &ThemeRules) -> Vec<ThemeLabel> {
    let text = text.to_lowercase();

    let mut labels: Vec<ThemeLabel> = rules
        .rules
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(label, _)| *label)
        .collect();

    if labels.is_empty() {
        labels.push(ThemeLabel::Other);
    }

    labels
}

/// Bucket articles by theme, preserving fetch order within each bucket.
/// Only themes with at least one article appear in the map.
pub fn bucket_by_theme(
    articles: &[Article],
    rules: &ThemeRules,
) -> BTreeMap<ThemeLabel, Vec<Article>> {
    let mut buckets: BTreeMap<ThemeLabel, Vec<Article>> = BTreeMap::new();

    for article in articles {
        let text = format!("{} {}", article.title, article.teaser);
        for label in classify(&text, rules) {
            buckets.entry(label).or_default().push(article.clone());
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(title: &str, teaser: &str) -> Article {
        Article {
            title: title.to_string(),
            teaser: teaser.to_string(),
            created: "2025-08-20T10:00:00Z".to_string(),
            url: "https://example.com/a".to_string(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_classify_is_multi_label() {
        let rules = ThemeRules::default();
        let labels = classify("Fed signals new tariffs on China imports", &rules);
        assert_eq!(
            labels,
            vec![
                ThemeLabel::FedPolicy,
                ThemeLabel::TradeTensions,
                ThemeLabel::ChinaSea
            ]
        );
    }

    #[test]
    fn test_classify_unmatched_gets_exactly_fallback() {
        let rules = ThemeRules::default();
        let labels = classify("Quiet Tuesday on Wall Street", &rules);
        assert_eq!(labels, vec![ThemeLabel::Other]);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let rules = ThemeRules::default();
        let labels = classify("BITCOIN Hits New High", &rules);
        assert!(labels.contains(&ThemeLabel::Crypto));
    }

    #[test]
    fn test_classify_idempotent() {
        let rules = ThemeRules::default();
        let text = "Apple earnings beat on record revenue";
        assert_eq!(classify(text, &rules), classify(text, &rules));
    }

    #[test]
    fn test_bucket_preserves_fetch_order() {
        let rules = ThemeRules::default();
        let articles = vec![
            article("First earnings story", ""),
            article("Second earnings story", ""),
        ];

        let buckets = bucket_by_theme(&articles, &rules);
        let earnings = &buckets[&ThemeLabel::Earnings];
        assert_eq!(earnings[0].title, "First earnings story");
        assert_eq!(earnings[1].title, "Second earnings story");
    }

    #[test]
    fn test_bucket_omits_empty_themes() {
        let rules = ThemeRules::default();
        let articles = vec![article("Bitcoin rally continues", "")];

        let buckets = bucket_by_theme(&articles, &rules);
        assert!(buckets.contains_key(&ThemeLabel::Crypto));
        assert!(buckets.contains_key(&ThemeLabel::MarketMovements)); // "rally"
        assert!(!buckets.contains_key(&ThemeLabel::Earnings));
        assert!(!buckets.contains_key(&ThemeLabel::Other));
    }
}
