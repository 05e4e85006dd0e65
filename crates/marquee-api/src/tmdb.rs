// TMDB v3 client
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::{ApiError, Result};
use crate::http::send_json;
use crate::media::*;
use crate::news::normalize_base;
use crate::retry::{with_retry, RetryConfig};
use crate::upload::ImageFile;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3/";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const DEFAULT_SORT: &str = "popularity.desc";

/// Where the user approves a request token in the browser
pub fn approval_url(request_token: &str) -> String {
    format!("https://www.themoviedb.org/authenticate/{}", request_token)
}

/// TMDB accepts either a v4 read token as a bearer header or a v3 `api_key`
/// query parameter. Either or both may be set.
#[derive(Debug, Clone, Default)]
pub struct TmdbAuth {
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl TmdbAuth {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
            || self.bearer_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    upload_url: String,
    retry_config: RetryConfig,
}

impl TmdbClient {
    pub fn new(auth: TmdbAuth) -> Result<Self> {
        Self::with_base_url(auth, TMDB_API_BASE)
    }

    pub fn with_base_url(auth: TmdbAuth, base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Marquee/0.1.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth.bearer_token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid bearer token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ApiError::from_transport)?;

        let base_url = normalize_base(base_url.into());
        Ok(Self {
            client,
            api_key: auth.api_key.filter(|k| !k.is_empty()),
            upload_url: format!("{}upload", base_url),
            base_url,
            retry_config: RetryConfig::none(),
        })
    }

    /// The upload endpoint is not part of TMDB proper, so it can live elsewhere
    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("api_key", key)]);
        }
        request
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        with_retry(
            &self.retry_config,
            || send_json(self.request(Method::GET, path).query(query)),
            ApiError::is_connection_failure,
        )
        .await
    }

    async fn send_body<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        with_retry(
            &self.retry_config,
            || send_json(self.request(method.clone(), path).query(query).json(body)),
            ApiError::is_connection_failure,
        )
        .await
    }

    fn session(session_id: &str) -> Vec<(&'static str, String)> {
        Self::rating_session(session_id, SessionKind::User)
    }

    /// Ratings are the only calls a guest session may make
    fn rating_session(session_id: &str, kind: SessionKind) -> Vec<(&'static str, String)> {
        vec![(kind.query_key(), session_id.to_string())]
    }

    fn listing(language: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![("language", language.to_string()), ("page", page.to_string())]
    }

    // ---- Account ----

    pub async fn account_details(&self, session_id: &str) -> Result<AccountDetails> {
        self.get("account", &Self::session(session_id)).await
    }

    pub async fn add_favorite(
        &self,
        account_id: i64,
        session_id: &str,
        request: &FavoriteRequest,
    ) -> Result<ResponseStatus> {
        let path = format!("account/{}/favorite", account_id);
        self.send_body(Method::POST, &path, &Self::session(session_id), request)
            .await
    }

    pub async fn add_to_watchlist(
        &self,
        account_id: i64,
        session_id: &str,
        request: &WatchlistRequest,
    ) -> Result<ResponseStatus> {
        let path = format!("account/{}/watchlist", account_id);
        self.send_body(Method::POST, &path, &Self::session(session_id), request)
            .await
    }

    pub async fn favorite_movies(&self, account_id: i64, session_id: &str) -> Result<MovieList> {
        self.account_list(account_id, session_id, "favorite/movies").await
    }

    pub async fn favorite_tv(&self, account_id: i64, session_id: &str) -> Result<TvList> {
        self.account_list(account_id, session_id, "favorite/tv").await
    }

    pub async fn rated_movies(&self, account_id: i64, session_id: &str) -> Result<MovieList> {
        self.account_list(account_id, session_id, "rated/movies").await
    }

    pub async fn rated_tv(&self, account_id: i64, session_id: &str) -> Result<TvList> {
        self.account_list(account_id, session_id, "rated/tv").await
    }

    pub async fn watchlist_movies(&self, account_id: i64, session_id: &str) -> Result<MovieList> {
        self.account_list(account_id, session_id, "watchlist/movies").await
    }

    pub async fn watchlist_tv(&self, account_id: i64, session_id: &str) -> Result<TvList> {
        self.account_list(account_id, session_id, "watchlist/tv").await
    }

    async fn account_list<T: DeserializeOwned>(
        &self,
        account_id: i64,
        session_id: &str,
        list: &str,
    ) -> Result<T> {
        let path = format!("account/{}/{}", account_id, list);
        self.get(&path, &Self::session(session_id)).await
    }

    // ---- Authentication ----

    pub async fn create_guest_session(&self) -> Result<GuestSessionResponse> {
        self.get("authentication/guest_session/new", &[]).await
    }

    pub async fn create_request_token(&self) -> Result<RequestTokenResponse> {
        self.get("authentication/token/new", &[]).await
    }

    /// Exchange an approved request token for a session
    pub async fn create_session(&self, request_token: &str) -> Result<SessionResponse> {
        let body = RequestToken {
            request_token: request_token.to_string(),
        };
        self.send_body(Method::POST, "authentication/session/new", &[], &body)
            .await
    }

    /// DELETE with a JSON body, which TMDB insists on
    pub async fn delete_session(&self, session_id: &str) -> Result<ResponseStatus> {
        let body = SessionBody {
            session_id: session_id.to_string(),
        };
        self.send_body(Method::DELETE, "authentication/session", &[], &body)
            .await
    }

    // ---- Certifications ----

    pub async fn movie_certifications(&self) -> Result<CertificationResponse> {
        self.get("certification/movie/list", &[]).await
    }

    pub async fn tv_certifications(&self) -> Result<CertificationResponse> {
        self.get("certification/tv/list", &[]).await
    }

    // ---- Movies ----

    pub async fn popular_movies(&self, language: &str, page: u32) -> Result<MovieList> {
        self.get("movie/popular", &Self::listing(language, page)).await
    }

    pub async fn movie_details(&self, movie_id: i64) -> Result<MovieDetail> {
        self.get(&format!("movie/{}", movie_id), &[]).await
    }

    pub async fn rate_movie(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Result<ResponseStatus> {
        let path = format!("movie/{}/rating", movie_id);
        let query = Self::rating_session(session_id, kind);
        self.send_body(Method::POST, &path, &query, &rating).await
    }

    pub async fn delete_movie_rating(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Result<ResponseStatus> {
        self.delete_rating(&format!("movie/{}/rating", movie_id), session_id, kind)
            .await
    }

    // ---- TV ----

    pub async fn popular_tv(&self, language: &str, page: u32) -> Result<TvList> {
        self.get("tv/popular", &Self::listing(language, page)).await
    }

    pub async fn tv_details(&self, tv_id: i64) -> Result<TvDetail> {
        self.get(&format!("tv/{}", tv_id), &[]).await
    }

    pub async fn rate_tv(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Result<ResponseStatus> {
        let path = format!("tv/{}/rating", tv_id);
        let query = Self::rating_session(session_id, kind);
        self.send_body(Method::POST, &path, &query, &rating).await
    }

    pub async fn delete_tv_rating(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Result<ResponseStatus> {
        self.delete_rating(&format!("tv/{}/rating", tv_id), session_id, kind)
            .await
    }

    async fn delete_rating(
        &self,
        path: &str,
        session_id: &str,
        kind: SessionKind,
    ) -> Result<ResponseStatus> {
        let query = Self::rating_session(session_id, kind);
        with_retry(
            &self.retry_config,
            || send_json(self.request(Method::DELETE, path).query(&query)),
            ApiError::is_connection_failure,
        )
        .await
    }

    // ---- Discover ----

    pub async fn discover_movies(
        &self,
        language: &str,
        sort_by: &str,
        page: u32,
    ) -> Result<MovieList> {
        let mut query = Self::listing(language, page);
        query.push(("sort_by", sort_by.to_string()));
        self.get("discover/movie", &query).await
    }

    pub async fn discover_tv(&self, language: &str, sort_by: &str, page: u32) -> Result<TvList> {
        let mut query = Self::listing(language, page);
        query.push(("sort_by", sort_by.to_string()));
        self.get("discover/tv", &query).await
    }

    // ---- Search ----

    pub async fn search_movies(&self, query: &str, language: &str, page: u32) -> Result<MovieList> {
        self.search("search/movie", query, language, page).await
    }

    pub async fn search_tv(&self, query: &str, language: &str, page: u32) -> Result<TvList> {
        self.search("search/tv", query, language, page).await
    }

    pub async fn search_people(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Result<PeopleList> {
        self.search("search/person", query, language, page).await
    }

    async fn search<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &str,
        language: &str,
        page: u32,
    ) -> Result<T> {
        let mut params = vec![("query", query.to_string())];
        params.extend(Self::listing(language, page));
        self.get(path, &params).await
    }

    // ---- Lists ----

    pub async fn list_details(&self, list_id: &str) -> Result<ListDetail> {
        self.get(&format!("list/{}", list_id), &[]).await
    }

    pub async fn create_list(
        &self,
        session_id: &str,
        request: &CreateListRequest,
    ) -> Result<ListCreateResponse> {
        self.send_body(Method::POST, "list", &Self::session(session_id), request)
            .await
    }

    pub async fn add_to_list(
        &self,
        list_id: &str,
        session_id: &str,
        media_id: i64,
    ) -> Result<ResponseStatus> {
        let path = format!("list/{}/add_item", list_id);
        let body = MediaItemRequest { media_id };
        self.send_body(Method::POST, &path, &Self::session(session_id), &body)
            .await
    }

    // ---- Upload ----

    /// Multipart POST with the image under the `file` part
    pub async fn upload_image(&self, path: &Path) -> Result<UploadResponse> {
        let image = ImageFile::read(path).await?;

        with_retry(
            &self.retry_config,
            || async {
                let form = image.form()?;
                send_json(self.client.post(&self.upload_url).multipart(form)).await
            },
            ApiError::is_connection_failure,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_is_configured() {
        assert!(!TmdbAuth::default().is_configured());
        assert!(!TmdbAuth {
            api_key: Some(String::new()),
            bearer_token: None
        }
        .is_configured());
        assert!(TmdbAuth {
            api_key: None,
            bearer_token: Some("eyJ...".into())
        }
        .is_configured());
    }

    #[test]
    fn test_approval_url() {
        assert_eq!(
            approval_url("abc123"),
            "https://www.themoviedb.org/authenticate/abc123"
        );
    }

    #[test]
    fn test_api_key_goes_on_every_request() {
        let client = TmdbClient::with_base_url(
            TmdbAuth {
                api_key: Some("k3y".into()),
                bearer_token: None,
            },
            "http://localhost:9999/3",
        )
        .unwrap();

        let request = client
            .request(Method::GET, "movie/550")
            .query(&[("language", "en-US")])
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://localhost:9999/3/movie/550?api_key=k3y&language=en-US"
        );
    }

    #[test]
    fn test_upload_url_defaults_next_to_base() {
        let client =
            TmdbClient::with_base_url(TmdbAuth::default(), "http://localhost:1/3/").unwrap();
        assert_eq!(client.upload_url, "http://localhost:1/3/upload");
        let client = client.with_upload_url("http://files.local/upload");
        assert_eq!(client.upload_url, "http://files.local/upload");
    }
}
