// Repositories - box every API call outcome in a Resource
//
// Nothing here returns Loading and nothing here returns Err; a failed call is
// just another Resource variant for the caller to render.
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

use marquee_api::media::*;
use marquee_api::news::Article;
use marquee_api::users::{User, UserProfile};
use tracing::warn;

use crate::Resource;

pub mod news;
pub mod tmdb;
pub mod users;

pub use news::NewsApiRepository;
pub use tmdb::TmdbRepository;
pub use users::RestUserRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsRepository: Send + Sync {
    async fn top_headlines(&self, category: &str) -> Resource<Vec<Article>>;

    async fn search_news(&self, query: &str) -> Resource<Vec<Article>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    // Account
    async fn account_details(&self, session_id: &str) -> Resource<AccountDetails>;
    async fn add_favorite(
        &self,
        account_id: i64,
        session_id: &str,
        request: FavoriteRequest,
    ) -> Resource<ResponseStatus>;
    async fn add_to_watchlist(
        &self,
        account_id: i64,
        session_id: &str,
        request: WatchlistRequest,
    ) -> Resource<ResponseStatus>;
    async fn favorite_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList>;
    async fn favorite_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList>;
    async fn rated_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList>;
    async fn rated_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList>;
    async fn watchlist_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList>;
    async fn watchlist_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList>;

    // Authentication
    async fn create_guest_session(&self) -> Resource<GuestSessionResponse>;
    async fn create_request_token(&self) -> Resource<RequestTokenResponse>;
    async fn create_session(&self, request_token: &str) -> Resource<SessionResponse>;
    async fn delete_session(&self, session_id: &str) -> Resource<ResponseStatus>;

    // Certifications
    async fn movie_certifications(&self) -> Resource<CertificationResponse>;
    async fn tv_certifications(&self) -> Resource<CertificationResponse>;

    // Movies
    async fn popular_movies(&self, language: &str, page: u32) -> Resource<MovieList>;
    async fn movie_details(&self, movie_id: i64) -> Resource<MovieDetail>;
    async fn rate_movie(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus>;
    async fn delete_movie_rating(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus>;

    // TV
    async fn popular_tv(&self, language: &str, page: u32) -> Resource<TvList>;
    async fn tv_details(&self, tv_id: i64) -> Resource<TvDetail>;
    async fn rate_tv(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus>;
    async fn delete_tv_rating(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus>;

    // Discover
    async fn discover_movies(
        &self,
        language: &str,
        sort_by: &str,
        page: u32,
    ) -> Resource<MovieList>;
    async fn discover_tv(&self, language: &str, sort_by: &str, page: u32) -> Resource<TvList>;

    // Search
    async fn search_movies(&self, query: &str, language: &str, page: u32) -> Resource<MovieList>;
    async fn search_tv(&self, query: &str, language: &str, page: u32) -> Resource<TvList>;
    async fn search_people(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Resource<PeopleList>;

    // Lists
    async fn list_details(&self, list_id: &str) -> Resource<ListDetail>;
    async fn create_list(
        &self,
        session_id: &str,
        request: CreateListRequest,
    ) -> Resource<ListCreateResponse>;
    async fn add_to_list(
        &self,
        list_id: &str,
        session_id: &str,
        media_id: i64,
    ) -> Resource<ResponseStatus>;

    // Upload
    async fn upload_image(&self, path: &Path) -> Resource<UploadResponse>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_user(&self, id: i64) -> Resource<User>;
    async fn create_user(&self, user: User) -> Resource<User>;
    async fn register_user(&self, user: User) -> Resource<User>;
    async fn update_user(&self, id: i64, user: User) -> Resource<User>;
    async fn delete_user(&self, id: i64) -> Resource<()>;
    async fn users_by_status(&self, status: &str) -> Resource<Vec<User>>;
    async fn users_by_filters(&self, filters: BTreeMap<String, String>) -> Resource<Vec<User>>;
    async fn users_by_url(&self, url: &str) -> Resource<Vec<User>>;
    async fn create_user_with_fields(&self, name: &str, job: &str) -> Resource<User>;
    async fn user_profile(&self, token: &str) -> Resource<UserProfile>;
    async fn user_profile_with_headers(
        &self,
        headers: BTreeMap<String, String>,
    ) -> Resource<UserProfile>;
    async fn upload_image(&self, path: &Path, description: &str) -> Resource<UploadResponse>;
}

/// Box a client result, logging failures under the operation's name
pub(crate) fn boxed<T>(operation: &str, result: marquee_api::Result<T>) -> Resource<T> {
    if let Err(ref e) = result {
        warn!("Failed to {}: {}", operation, e);
    }
    Resource::from(result)
}
