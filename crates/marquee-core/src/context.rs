// Wiring: config in, clients and repositories out
use marquee_api::news::{NewsClient, NewsOptions};
use marquee_api::users::{UsersClient, UsersClientConfig};
use marquee_api::{TmdbAuth, TmdbClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::repository::{
    MediaRepository, NewsApiRepository, NewsRepository, RestUserRepository, TmdbRepository,
    UserRepository,
};
use crate::usecase::{GetTopHeadlines, MediaUseCases, SearchNews, UserUseCases};
use crate::{Config, Error, Result};

pub fn news_client(config: &Config) -> Result<NewsClient> {
    let api_key = config
        .news
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            Error::ConfigError(
                "NewsAPI key missing. Set NEWS_API_KEY or news.api_key in config.toml".into(),
            )
        })?;

    let options = NewsOptions {
        country: config.news.country.clone(),
        language: config.news.language.clone(),
        sort_by: config.news.sort_by.clone(),
        ..NewsOptions::default()
    };

    debug!("NewsAPI base URL: {}", config.news.base_url);
    Ok(NewsClient::with_base_url(api_key, &config.news.base_url)?.with_options(options))
}

pub fn tmdb_client(config: &Config) -> Result<TmdbClient> {
    let auth = TmdbAuth {
        api_key: config.tmdb.api_key.clone(),
        bearer_token: config.tmdb.bearer_token.clone(),
    };
    if !auth.is_configured() {
        return Err(Error::ConfigError(
            "TMDB credentials missing. Set TMDB_API_KEY or TMDB_BEARER_TOKEN, or fill in [tmdb] in config.toml"
                .into(),
        ));
    }

    debug!("TMDB base URL: {}", config.tmdb.base_url);
    let client = TmdbClient::with_base_url(auth, &config.tmdb.base_url)?;
    Ok(match &config.tmdb.upload_url {
        Some(url) => client.with_upload_url(url),
        None => client,
    })
}

pub fn users_client(config: &Config) -> Result<UsersClient> {
    debug!("Users API base URL: {}", config.users.base_url);
    Ok(UsersClient::new(UsersClientConfig {
        base_url: config.users.base_url.clone(),
        bearer_token: config.users.bearer_token.clone(),
        timeout: Duration::from_secs(config.users.timeout_secs),
        retry_on_connection_failure: config.users.retry_on_connection_failure,
    })?)
}

pub fn news_repository(config: &Config) -> Result<Arc<dyn NewsRepository>> {
    Ok(Arc::new(NewsApiRepository::new(news_client(config)?)))
}

pub fn media_repository(config: &Config) -> Result<Arc<dyn MediaRepository>> {
    Ok(Arc::new(TmdbRepository::new(tmdb_client(config)?)))
}

pub fn user_repository(config: &Config) -> Result<Arc<dyn UserRepository>> {
    Ok(Arc::new(RestUserRepository::new(users_client(config)?)))
}

/// The news pair, built from one repository
pub fn news_use_cases(config: &Config) -> Result<(GetTopHeadlines, SearchNews)> {
    let repo = news_repository(config)?;
    Ok((GetTopHeadlines::new(repo.clone()), SearchNews::new(repo)))
}

pub fn media_use_cases(config: &Config) -> Result<MediaUseCases> {
    Ok(MediaUseCases::new(media_repository(config)?))
}

pub fn user_use_cases(config: &Config) -> Result<UserUseCases> {
    Ok(UserUseCases::new(user_repository(config)?))
}
