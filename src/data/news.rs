use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DataError, DataResult};

/// A news article as delivered by the provider. Field values are carried
/// verbatim; the original payload is kept in `raw` for downstream exporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub teaser: String,
    /// Creation timestamp as supplied by the provider (ISO-8601-ish,
    /// may include a trailing 'Z')
    pub created: String,
    pub url: String,
    #[serde(default)]
    pub raw: serde_json::Value,
}

/// Source of news articles for a date range
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_articles(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        page_size: usize,
    ) -> DataResult<Vec<Article>>;
}

/// News client backed by the Benzinga v2 news endpoint
#[derive(Debug)]
pub struct BenzingaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl BenzingaClient {
    const BASE_URL: &'static str = "https://api.benzinga.com/api";

    pub fn new(api_key: String, timeout_seconds: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .user_agent(concat!("marketbrief/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: Self::BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl NewsProvider for BenzingaClient {
    async fn fetch_articles(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
        page_size: usize,
    ) -> DataResult<Vec<Article>> {
        let url = format!("{}/v2/news", self.base_url);

        debug!(
            "Benzinga API request: GET {} ({} to {})",
            url, date_from, date_to
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("token", self.api_key.as_str()),
                ("pageSize", &page_size.to_string()),
                ("displayOutput", "full"),
                ("dateFrom", &date_from.format("%Y-%m-%d").to_string()),
                ("dateTo", &date_to.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DataError::api_error(
                status_code,
                format!("Benzinga: {}", error_text),
            ));
        }

        let body: serde_json::Value = response.json().await?;

        // The endpoint returns a bare JSON array of article objects
        let items = body
            .as_array()
            .ok_or_else(|| DataError::parse_error("No article array in Benzinga response"))?;

        let mut articles = Vec::with_capacity(items.len());
        for item in items {
            let title = item["title"].as_str().unwrap_or("No title").to_string();
            let teaser = item["teaser"].as_str().unwrap_or("").to_string();
            let created = item["created"].as_str().unwrap_or("").to_string();
            let url = item["url"].as_str().unwrap_or("").to_string();

            articles.push(Article {
                title,
                teaser,
                created,
                url,
                raw: item.clone(),
            });
        }

        info!("Fetched {} news articles from Benzinga", articles.len());
        Ok(articles)
    }
}
