// NewsAPI v2 client
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::http::send_json;
use crate::media::null_as_default;
use crate::retry::{with_retry, RetryConfig};

pub const NEWS_API_BASE: &str = "https://newsapi.org/v2/";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_results: u32,
    /// NewsAPI omits this on some partial responses
    pub articles: Option<Vec<Article>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source: ArticleSource,
    pub author: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Request knobs with NewsAPI's usual defaults
#[derive(Debug, Clone, PartialEq)]
pub struct NewsOptions {
    pub country: String,
    pub language: String,
    pub sort_by: String,
    pub search_in: String,
}

impl Default for NewsOptions {
    fn default() -> Self {
        Self {
            country: "us".to_string(),
            language: "en".to_string(),
            sort_by: "publishedAt".to_string(),
            search_in: "title,description".to_string(),
        }
    }
}

pub struct NewsClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    options: NewsOptions,
    retry_config: RetryConfig,
}

impl NewsClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, NEWS_API_BASE)
    }

    /// Point the client somewhere else (a proxy or a local mock)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Marquee/0.1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !api_key.is_empty() {
            let mut value = HeaderValue::from_str(&api_key)
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid API key header: {}", e)))?;
            value.set_sensitive(true);
            headers.insert("X-Api-Key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            client,
            api_key,
            base_url: normalize_base(base_url.into()),
            options: NewsOptions::default(),
            retry_config: RetryConfig::none(),
        })
    }

    pub fn with_options(mut self, options: NewsOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn options(&self) -> &NewsOptions {
        &self.options
    }

    /// Top headlines for one category, e.g. "business"
    pub async fn top_headlines(&self, category: &str) -> Result<NewsResponse> {
        let url = format!("{}top-headlines", self.base_url);
        let category = category.to_lowercase();

        with_retry(
            &self.retry_config,
            || {
                let request = self.client.get(&url).query(&[
                    ("category", category.as_str()),
                    ("country", self.options.country.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ]);
                send_json(request)
            },
            ApiError::is_connection_failure,
        )
        .await
    }

    /// Full-text search over titles and descriptions, newest first
    pub async fn search(&self, query: &str) -> Result<NewsResponse> {
        let url = format!("{}everything", self.base_url);

        with_retry(
            &self.retry_config,
            || {
                let request = self.client.get(&url).query(&[
                    ("q", query),
                    ("searchIn", self.options.search_in.as_str()),
                    ("language", self.options.language.as_str()),
                    ("sortBy", self.options.sort_by.as_str()),
                    ("apiKey", self.api_key.as_str()),
                ]);
                send_json(request)
            },
            ApiError::is_connection_failure,
        )
        .await
    }
}

/// Relative paths get joined onto the base, so it needs exactly one trailing slash
pub(crate) fn normalize_base(base_url: String) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_decodes_camel_case() {
        let json = r#"{
            "source": {"id": null, "name": "The Verge"},
            "author": null,
            "title": "A headline",
            "description": "Something happened",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg",
            "publishedAt": "2026-10-19T08:30:00Z",
            "content": null
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.source.name, "The Verge");
        assert_eq!(article.url_to_image.as_deref(), Some("https://example.com/a.jpg"));
        assert_eq!(article.published_at.as_deref(), Some("2026-10-19T08:30:00Z"));
    }

    #[test]
    fn test_article_with_null_source_name() {
        let json = r#"{
            "source": {"id": "wired", "name": null},
            "author": null,
            "title": "Another headline",
            "description": null,
            "url": "https://example.com/b",
            "urlToImage": null,
            "publishedAt": null,
            "content": null
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.source.name, "");
        assert_eq!(article.source.id.as_deref(), Some("wired"));

        let resp: NewsResponse =
            serde_json::from_str(r#"{"status": null, "totalResults": null, "articles": []}"#).unwrap();
        assert_eq!(resp.status, "");
        assert_eq!(resp.total_results, 0);
    }

    #[test]
    fn test_response_without_articles_still_decodes() {
        let resp: NewsResponse = serde_json::from_str(r#"{"status": "ok", "totalResults": 0}"#).unwrap();
        assert!(resp.articles.is_none());
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base("https://newsapi.org/v2".into()), "https://newsapi.org/v2/");
        assert_eq!(normalize_base("https://newsapi.org/v2//".into()), "https://newsapi.org/v2/");
    }

    #[test]
    fn test_client_rejects_unprintable_key() {
        assert!(matches!(
            NewsClient::new("bad\nkey"),
            Err(ApiError::InvalidRequest(_))
        ));
    }
}
