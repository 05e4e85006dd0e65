// Client for the placeholder users REST API
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::multipart::Part;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::http::{send_empty, send_json};
use crate::media::{null_as_default, UploadResponse};
use crate::news::normalize_base;
use crate::retry::{with_retry, RetryConfig};
use crate::upload::ImageFile;

pub const USERS_API_BASE: &str = "https://api.example.com/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub city: Option<String>,
    pub job: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub followers_count: Option<u32>,
    pub following_count: Option<u32>,
    pub posts: Option<Vec<Post>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments_count: u32,
}

/// Connection settings for [`UsersClient`]
#[derive(Debug, Clone)]
pub struct UsersClientConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
    pub retry_on_connection_failure: bool,
}

impl Default for UsersClientConfig {
    fn default() -> Self {
        Self {
            base_url: USERS_API_BASE.to_string(),
            bearer_token: None,
            timeout: DEFAULT_TIMEOUT,
            retry_on_connection_failure: true,
        }
    }
}

pub struct UsersClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl UsersClient {
    pub fn new(config: UsersClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Marquee/0.1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = config.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert(AUTHORIZATION, bearer(token)?);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        // Only connection failures are retried, never HTTP statuses
        let retry_config = if config.retry_on_connection_failure {
            RetryConfig::connection_failures()
        } else {
            RetryConfig::none()
        };

        Ok(Self {
            client,
            base_url: normalize_base(config.base_url),
            retry_config,
        })
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Absolute URLs are used as they are, anything else is relative to the base
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.url(url)
        }
    }

    async fn run<T, F>(&self, build: F) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> Result<reqwest::RequestBuilder>,
    {
        with_retry(
            &self.retry_config,
            || async { send_json(build()?).await },
            ApiError::is_connection_failure,
        )
        .await
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        let url = self.url(&format!("users/{}", id));
        self.run(|| Ok(self.client.get(&url))).await
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let url = self.url("users");
        self.run(|| Ok(self.client.post(&url).json(user))).await
    }

    /// Same endpoint as [`create_user`](Self::create_user), kept as its own call for sign-up flows
    pub async fn register_user(&self, user: &User) -> Result<User> {
        let url = self.url("users");
        self.run(|| Ok(self.client.post(&url).json(user))).await
    }

    pub async fn update_user(&self, id: i64, user: &User) -> Result<User> {
        let url = self.url(&format!("users/{}", id));
        self.run(|| Ok(self.client.put(&url).json(user))).await
    }

    /// Any 2xx is a success, with or without a body
    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let url = self.url(&format!("users/{}", id));
        with_retry(
            &self.retry_config,
            || send_empty(self.client.delete(&url)),
            ApiError::is_connection_failure,
        )
        .await
    }

    pub async fn users_by_status(&self, status: &str) -> Result<Vec<User>> {
        let url = self.url("users");
        self.run(|| Ok(self.client.get(&url).query(&[("status", status)])))
            .await
    }

    /// Arbitrary filters, e.g. `age=30&city=New York&job=Developer`
    pub async fn users_by_filters(&self, filters: &BTreeMap<String, String>) -> Result<Vec<User>> {
        let url = self.url("users");
        self.run(|| Ok(self.client.get(&url).query(filters))).await
    }

    pub async fn users_by_url(&self, url: &str) -> Result<Vec<User>> {
        let url = self.resolve_url(url);
        self.run(|| Ok(self.client.get(&url))).await
    }

    /// Form-encoded create: `name=...&job=...`
    pub async fn create_user_with_fields(&self, name: &str, job: &str) -> Result<User> {
        let url = self.url("api/users");
        self.run(|| Ok(self.client.post(&url).form(&[("name", name), ("job", job)])))
            .await
    }

    /// Profile with an explicit Authorization header, overriding the default token
    pub async fn user_profile(&self, token: &str) -> Result<UserProfile> {
        let url = self.url("profile");
        let mut value = HeaderValue::from_str(token)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid Authorization header: {}", e)))?;
        value.set_sensitive(true);
        self.run(|| Ok(self.client.get(&url).header(AUTHORIZATION, value.clone())))
            .await
    }

    pub async fn user_profile_with_headers(
        &self,
        headers: &BTreeMap<String, String>,
    ) -> Result<UserProfile> {
        let url = self.url("profile");
        let headers = header_map(headers)?;
        self.run(|| Ok(self.client.get(&url).headers(headers.clone())))
            .await
    }

    /// Multipart upload: the image under `file` plus a plain-text `description`
    pub async fn upload_image(&self, path: &Path, description: &str) -> Result<UploadResponse> {
        let url = self.url("upload");
        let image = ImageFile::read(path).await?;

        self.run(|| {
            let description = Part::text(description.to_string())
                .mime_str("text/plain")
                .map_err(ApiError::from_transport)?;
            let form = image.form()?.part("description", description);
            Ok(self.client.post(&url).multipart(form))
        })
        .await
    }
}

fn bearer(token: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ApiError::InvalidRequest(format!("Invalid bearer token: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid header name {}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid header value: {}", e)))?;
        map.insert(name, value);
    }
    Ok(map)
}
