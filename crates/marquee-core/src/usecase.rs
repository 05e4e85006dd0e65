// Use cases - one call per repository method, plus a Loading-first stream of it
use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use marquee_api::media::*;
use marquee_api::news::Article;
use marquee_api::users::{User, UserProfile};

use crate::repository::{MediaRepository, NewsRepository, UserRepository};
use crate::resource::{resource_stream, Resource, ResourceStream};

#[derive(Clone)]
pub struct GetTopHeadlines {
    repo: Arc<dyn NewsRepository>,
}

impl GetTopHeadlines {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }

    pub async fn call(&self, category: &str) -> Resource<Vec<Article>> {
        self.repo.top_headlines(category).await
    }

    pub fn stream(&self, category: String) -> ResourceStream<'static, Vec<Article>> {
        let repo = self.repo.clone();
        resource_stream(async move { repo.top_headlines(&category).await })
    }
}

#[derive(Clone)]
pub struct SearchNews {
    repo: Arc<dyn NewsRepository>,
}

impl SearchNews {
    pub fn new(repo: Arc<dyn NewsRepository>) -> Self {
        Self { repo }
    }

    pub async fn call(&self, query: &str) -> Resource<Vec<Article>> {
        self.repo.search_news(query).await
    }

    pub fn stream(&self, query: String) -> ResourceStream<'static, Vec<Article>> {
        let repo = self.repo.clone();
        resource_stream(async move { repo.search_news(&query).await })
    }
}

/// What the movie screen needs from TMDB
#[derive(Clone)]
pub struct MediaUseCases {
    repo: Arc<dyn MediaRepository>,
}

impl MediaUseCases {
    pub fn new(repo: Arc<dyn MediaRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &dyn MediaRepository {
        self.repo.as_ref()
    }

    fn stream<T, F, Fut>(&self, call: F) -> ResourceStream<'static, T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn MediaRepository>) -> Fut,
        Fut: Future<Output = Resource<T>> + Send + 'static,
    {
        resource_stream(call(self.repo.clone()))
    }

    pub async fn popular_movies(&self, language: &str, page: u32) -> Resource<MovieList> {
        self.repo.popular_movies(language, page).await
    }

    pub fn popular_movies_stream(
        &self,
        language: String,
        page: u32,
    ) -> ResourceStream<'static, MovieList> {
        self.stream(move |repo| async move { repo.popular_movies(&language, page).await })
    }

    pub async fn movie_details(&self, movie_id: i64) -> Resource<MovieDetail> {
        self.repo.movie_details(movie_id).await
    }

    pub fn movie_details_stream(&self, movie_id: i64) -> ResourceStream<'static, MovieDetail> {
        self.stream(move |repo| async move { repo.movie_details(movie_id).await })
    }

    pub async fn search_movies(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Resource<MovieList> {
        self.repo.search_movies(query, language, page).await
    }

    pub fn search_movies_stream(
        &self,
        query: String,
        language: String,
        page: u32,
    ) -> ResourceStream<'static, MovieList> {
        self.stream(move |repo| async move { repo.search_movies(&query, &language, page).await })
    }

    pub async fn rate_movie(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus> {
        self.repo.rate_movie(movie_id, session_id, kind, rating).await
    }

    pub fn rate_movie_stream(
        &self,
        movie_id: i64,
        session_id: String,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> ResourceStream<'static, ResponseStatus> {
        self.stream(move |repo| async move {
            repo.rate_movie(movie_id, &session_id, kind, rating).await
        })
    }

    pub async fn delete_movie_rating(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus> {
        self.repo.delete_movie_rating(movie_id, session_id, kind).await
    }

    pub fn delete_movie_rating_stream(
        &self,
        movie_id: i64,
        session_id: String,
        kind: SessionKind,
    ) -> ResourceStream<'static, ResponseStatus> {
        self.stream(move |repo| async move {
            repo.delete_movie_rating(movie_id, &session_id, kind).await
        })
    }

    pub async fn add_to_watchlist(
        &self,
        account_id: i64,
        session_id: &str,
        request: WatchlistRequest,
    ) -> Resource<ResponseStatus> {
        self.repo.add_to_watchlist(account_id, session_id, request).await
    }

    pub fn add_to_watchlist_stream(
        &self,
        account_id: i64,
        session_id: String,
        request: WatchlistRequest,
    ) -> ResourceStream<'static, ResponseStatus> {
        self.stream(move |repo| async move {
            repo.add_to_watchlist(account_id, &session_id, request).await
        })
    }

    pub async fn popular_tv(&self, language: &str, page: u32) -> Resource<TvList> {
        self.repo.popular_tv(language, page).await
    }

    pub fn popular_tv_stream(
        &self,
        language: String,
        page: u32,
    ) -> ResourceStream<'static, TvList> {
        self.stream(move |repo| async move { repo.popular_tv(&language, page).await })
    }

    pub async fn tv_details(&self, tv_id: i64) -> Resource<TvDetail> {
        self.repo.tv_details(tv_id).await
    }

    pub fn tv_details_stream(&self, tv_id: i64) -> ResourceStream<'static, TvDetail> {
        self.stream(move |repo| async move { repo.tv_details(tv_id).await })
    }

    pub async fn rate_tv(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus> {
        self.repo.rate_tv(tv_id, session_id, kind, rating).await
    }

    pub fn rate_tv_stream(
        &self,
        tv_id: i64,
        session_id: String,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> ResourceStream<'static, ResponseStatus> {
        self.stream(move |repo| async move {
            repo.rate_tv(tv_id, &session_id, kind, rating).await
        })
    }

    pub async fn delete_tv_rating(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus> {
        self.repo.delete_tv_rating(tv_id, session_id, kind).await
    }

    pub async fn account_details(&self, session_id: &str) -> Resource<AccountDetails> {
        self.repo.account_details(session_id).await
    }

    pub fn account_details_stream(
        &self,
        session_id: String,
    ) -> ResourceStream<'static, AccountDetails> {
        self.stream(move |repo| async move { repo.account_details(&session_id).await })
    }

    pub async fn favorite_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList> {
        self.repo.favorite_movies(account_id, session_id).await
    }

    pub fn favorite_movies_stream(
        &self,
        account_id: i64,
        session_id: String,
    ) -> ResourceStream<'static, MovieList> {
        self.stream(move |repo| async move { repo.favorite_movies(account_id, &session_id).await })
    }

    pub async fn watchlist_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList> {
        self.repo.watchlist_movies(account_id, session_id).await
    }

    pub fn watchlist_movies_stream(
        &self,
        account_id: i64,
        session_id: String,
    ) -> ResourceStream<'static, MovieList> {
        self.stream(move |repo| async move { repo.watchlist_movies(account_id, &session_id).await })
    }

    pub async fn add_favorite(
        &self,
        account_id: i64,
        session_id: &str,
        request: FavoriteRequest,
    ) -> Resource<ResponseStatus> {
        self.repo.add_favorite(account_id, session_id, request).await
    }

    pub fn add_favorite_stream(
        &self,
        account_id: i64,
        session_id: String,
        request: FavoriteRequest,
    ) -> ResourceStream<'static, ResponseStatus> {
        self.stream(move |repo| async move {
            repo.add_favorite(account_id, &session_id, request).await
        })
    }

    pub async fn upload_image(&self, path: PathBuf) -> Resource<UploadResponse> {
        self.repo.upload_image(&path).await
    }

    pub fn upload_image_stream(&self, path: PathBuf) -> ResourceStream<'static, UploadResponse> {
        self.stream(move |repo| async move { repo.upload_image(&path).await })
    }
}

/// The users demo, one use case per endpoint
#[derive(Clone)]
pub struct UserUseCases {
    repo: Arc<dyn UserRepository>,
}

impl UserUseCases {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    fn stream<T, F, Fut>(&self, call: F) -> ResourceStream<'static, T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn UserRepository>) -> Fut,
        Fut: Future<Output = Resource<T>> + Send + 'static,
    {
        resource_stream(call(self.repo.clone()))
    }

    pub fn get_user(&self, id: i64) -> ResourceStream<'static, User> {
        self.stream(move |repo| async move { repo.get_user(id).await })
    }

    pub fn create_user(&self, user: User) -> ResourceStream<'static, User> {
        self.stream(move |repo| async move { repo.create_user(user).await })
    }

    pub fn register_user(&self, user: User) -> ResourceStream<'static, User> {
        self.stream(move |repo| async move { repo.register_user(user).await })
    }

    pub fn update_user(&self, id: i64, user: User) -> ResourceStream<'static, User> {
        self.stream(move |repo| async move { repo.update_user(id, user).await })
    }

    pub fn delete_user(&self, id: i64) -> ResourceStream<'static, ()> {
        self.stream(move |repo| async move { repo.delete_user(id).await })
    }

    pub fn users_by_status(&self, status: String) -> ResourceStream<'static, Vec<User>> {
        self.stream(move |repo| async move { repo.users_by_status(&status).await })
    }

    pub fn users_by_filters(
        &self,
        filters: BTreeMap<String, String>,
    ) -> ResourceStream<'static, Vec<User>> {
        self.stream(move |repo| async move { repo.users_by_filters(filters).await })
    }

    pub fn users_by_url(&self, url: String) -> ResourceStream<'static, Vec<User>> {
        self.stream(move |repo| async move { repo.users_by_url(&url).await })
    }

    pub fn create_user_with_fields(
        &self,
        name: String,
        job: String,
    ) -> ResourceStream<'static, User> {
        self.stream(move |repo| async move { repo.create_user_with_fields(&name, &job).await })
    }

    pub fn user_profile(&self, token: String) -> ResourceStream<'static, UserProfile> {
        self.stream(move |repo| async move { repo.user_profile(&token).await })
    }

    pub fn user_profile_with_headers(
        &self,
        headers: BTreeMap<String, String>,
    ) -> ResourceStream<'static, UserProfile> {
        self.stream(move |repo| async move { repo.user_profile_with_headers(headers).await })
    }

    pub fn upload_image(
        &self,
        path: PathBuf,
        description: String,
    ) -> ResourceStream<'static, UploadResponse> {
        self.stream(move |repo| async move { repo.upload_image(&path, &description).await })
    }
}
