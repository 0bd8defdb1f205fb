//! Importance scoring and top-K story extraction
//! Scores are purely additive keyword hits plus a recency bonus; "now" is an
//! injected parameter so scoring stays reproducible in tests

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::debug;

use super::themes::ThemeLabel;
use crate::data::Article;

/// Hand-tuned scoring defaults carried over from the original report tool.
/// Weights are configuration, not invariants.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub major_companies: Vec<&'static str>,
    pub impact_keywords: Vec<&'static str>,
    pub urgency_keywords: Vec<&'static str>,
    pub company_weight: i64,
    pub impact_weight: i64,
    pub urgency_weight: i64,
    pub recency_bonus: i64,
    pub recency_window_hours: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            major_companies: vec![
                "apple", "microsoft", "google", "amazon", "tesla", "meta", "nvidia",
            ],
            impact_keywords: vec![
                "billion", "million", "record", "historic", "breakthrough", "crisis",
            ],
            urgency_keywords: vec!["breaking", "just in", "urgent", "alert"],
            company_weight: 5,
            impact_weight: 3,
            urgency_weight: 4,
            recency_bonus: 5,
            recency_window_hours: 24,
        }
    }
}

/// Score one article against the keyword tables. The recency bonus applies
/// when the article was created less than the configured window before `now`;
/// an unparseable timestamp simply forfeits the bonus.
pub fn score_article(article: &Article, now: DateTime<Utc>, config: &ScoringConfig) -> i64 {
    let text = format!("{} {}", article.title, article.teaser).to_lowercase();

    let mut score = 0;

    score += config.company_weight
        * config
            .major_companies
            .iter()
            .filter(|name| text.contains(*name))
            .count() as i64;

    score += config.impact_weight
        * config
            .impact_keywords
            .iter()
            .filter(|word| text.contains(*word))
            .count() as i64;

    score += config.urgency_weight
        * config
            .urgency_keywords
            .iter()
            .filter(|word| text.contains(*word))
            .count() as i64;

    if let Ok(created) = DateTime::parse_from_rfc3339(&article.created) {
        let age = now.signed_duration_since(created.with_timezone(&Utc));
        if age < Duration::hours(config.recency_window_hours) {
            score += config.recency_bonus;
        }
    }

    score
}

/// Select the top-K stories per theme. Within a bucket the sort is stable
/// descending by score, so equal-score articles keep their fetch order.
/// Themes with no articles are absent from the result map.
pub fn extract_key_stories(
    buckets: &BTreeMap<ThemeLabel, Vec<Article>>,
    limit: usize,
    now: DateTime<Utc>,
    config: &ScoringConfig,
) -> BTreeMap<ThemeLabel, Vec<Article>> {
    let mut key_stories = BTreeMap::new();

    for (theme, articles) in buckets {
        if articles.is_empty() {
            continue;
        }

        let mut scored: Vec<(&Article, i64)> = articles
            .iter()
            .map(|article| (article, score_article(article, now, config)))
            .collect();

        // sort_by is stable; ties keep fetch order
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        debug!(
            "Theme {}: {} articles, top score {}",
            theme,
            scored.len(),
            scored.first().map(|(_, s)| *s).unwrap_or(0)
        );

        key_stories.insert(
            *theme,
            scored
                .into_iter()
                .take(limit)
                .map(|(article, _)| article.clone())
                .collect(),
        );
    }

    key_stories
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(title: &str, teaser: &str, created: &str) -> Article {
        Article {
            title: title.to_string(),
            teaser: teaser.to_string(),
            created: created.to_string(),
            url: "https://example.com/a".to_string(),
            raw: serde_json::Value::Null,
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 21, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn test_additive_keyword_weights() {
        let config = ScoringConfig::default();
        // One company (+5), one impact word (+3), one urgency word (+4),
        // created long before `now` so no recency bonus.
        let a = article(
            "Breaking: Apple commits billion to new campus",
            "",
            "2025-01-01T00:00:00Z",
        );
        assert_eq!(score_article(&a, fixed_now(), &config), 12);
    }

    #[test]
    fn test_recency_bonus_with_injected_now() {
        let config = ScoringConfig::default();
        let a = article("Quiet market day", "", "2025-08-21T06:00:00Z");
        assert_eq!(score_article(&a, fixed_now(), &config), 5);

        // Same article evaluated two days later loses the bonus
        let later = fixed_now() + Duration::days(2);
        assert_eq!(score_article(&a, later, &config), 0);
    }

    #[test]
    fn test_unparseable_timestamp_skips_bonus() {
        let config = ScoringConfig::default();
        let a = article("Quiet market day", "", "yesterday-ish");
        assert_eq!(score_article(&a, fixed_now(), &config), 0);
    }

    #[test]
    fn test_score_ties_keep_fetch_order() {
        let config = ScoringConfig::default();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            ThemeLabel::Other,
            vec![
                article("first", "", "2025-01-01T00:00:00Z"),
                article("second", "", "2025-01-01T00:00:00Z"),
            ],
        );

        let stories = extract_key_stories(&buckets, 3, fixed_now(), &config);
        let other = &stories[&ThemeLabel::Other];
        assert_eq!(other[0].title, "first");
        assert_eq!(other[1].title, "second");
    }

    #[test]
    fn test_higher_score_wins_regardless_of_order() {
        let config = ScoringConfig::default();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            ThemeLabel::Other,
            vec![
                article("plain story", "", "2025-01-01T00:00:00Z"),
                article("Nvidia posts record billion quarter", "", "2025-01-01T00:00:00Z"),
            ],
        );

        let stories = extract_key_stories(&buckets, 3, fixed_now(), &config);
        assert_eq!(stories[&ThemeLabel::Other][0].title, "Nvidia posts record billion quarter");
    }

    #[test]
    fn test_limit_is_enforced() {
        let config = ScoringConfig::default();
        let mut buckets = BTreeMap::new();
        buckets.insert(
            ThemeLabel::Other,
            (0..5)
                .map(|i| article(&format!("story {}", i), "", "2025-01-01T00:00:00Z"))
                .collect(),
        );

        let stories = extract_key_stories(&buckets, 3, fixed_now(), &config);
        assert_eq!(stories[&ThemeLabel::Other].len(), 3);
    }

    #[test]
    fn test_empty_buckets_are_omitted() {
        let config = ScoringConfig::default();
        let mut buckets: BTreeMap<ThemeLabel, Vec<Article>> = BTreeMap::new();
        buckets.insert(ThemeLabel::Crypto, vec![]);

        let stories = extract_key_stories(&buckets, 3, fixed_now(), &config);
        assert!(stories.is_empty());
    }
}
