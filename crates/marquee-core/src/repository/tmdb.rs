// TMDB repository - bridges TmdbClient with MediaRepository
use async_trait::async_trait;
use marquee_api::media::*;
use marquee_api::TmdbClient;
use std::path::Path;

use super::{boxed, MediaRepository};
use crate::Resource;

pub struct TmdbRepository {
    client: TmdbClient,
}

impl TmdbRepository {
    pub fn new(client: TmdbClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaRepository for TmdbRepository {
    async fn account_details(&self, session_id: &str) -> Resource<AccountDetails> {
        boxed(
            "fetch account details",
            self.client.account_details(session_id).await,
        )
    }

    async fn add_favorite(
        &self,
        account_id: i64,
        session_id: &str,
        request: FavoriteRequest,
    ) -> Resource<ResponseStatus> {
        boxed(
            "add favorite",
            self.client.add_favorite(account_id, session_id, &request).await,
        )
    }

    async fn add_to_watchlist(
        &self,
        account_id: i64,
        session_id: &str,
        request: WatchlistRequest,
    ) -> Resource<ResponseStatus> {
        boxed(
            "add to watchlist",
            self.client
                .add_to_watchlist(account_id, session_id, &request)
                .await,
        )
    }

    async fn favorite_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList> {
        boxed(
            "fetch favorite movies",
            self.client.favorite_movies(account_id, session_id).await,
        )
    }

    async fn favorite_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList> {
        boxed(
            "fetch favorite TV shows",
            self.client.favorite_tv(account_id, session_id).await,
        )
    }

    async fn rated_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList> {
        boxed(
            "fetch rated movies",
            self.client.rated_movies(account_id, session_id).await,
        )
    }

    async fn rated_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList> {
        boxed(
            "fetch rated TV shows",
            self.client.rated_tv(account_id, session_id).await,
        )
    }

    async fn watchlist_movies(&self, account_id: i64, session_id: &str) -> Resource<MovieList> {
        boxed(
            "fetch watchlist movies",
            self.client.watchlist_movies(account_id, session_id).await,
        )
    }

    async fn watchlist_tv(&self, account_id: i64, session_id: &str) -> Resource<TvList> {
        boxed(
            "fetch watchlist TV shows",
            self.client.watchlist_tv(account_id, session_id).await,
        )
    }

    async fn create_guest_session(&self) -> Resource<GuestSessionResponse> {
        boxed(
            "create guest session",
            self.client.create_guest_session().await,
        )
    }

    async fn create_request_token(&self) -> Resource<RequestTokenResponse> {
        boxed(
            "create request token",
            self.client.create_request_token().await,
        )
    }

    async fn create_session(&self, request_token: &str) -> Resource<SessionResponse> {
        boxed(
            "create session",
            self.client.create_session(request_token).await,
        )
    }

    async fn delete_session(&self, session_id: &str) -> Resource<ResponseStatus> {
        boxed("delete session", self.client.delete_session(session_id).await)
    }

    async fn movie_certifications(&self) -> Resource<CertificationResponse> {
        boxed(
            "fetch movie certifications",
            self.client.movie_certifications().await,
        )
    }

    async fn tv_certifications(&self) -> Resource<CertificationResponse> {
        boxed(
            "fetch TV certifications",
            self.client.tv_certifications().await,
        )
    }

    async fn popular_movies(&self, language: &str, page: u32) -> Resource<MovieList> {
        boxed(
            "fetch popular movies",
            self.client.popular_movies(language, page).await,
        )
    }

    async fn movie_details(&self, movie_id: i64) -> Resource<MovieDetail> {
        boxed(
            "fetch movie details",
            self.client.movie_details(movie_id).await,
        )
    }

    async fn rate_movie(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus> {
        boxed(
            "rate movie",
            self.client
                .rate_movie(movie_id, session_id, kind, rating)
                .await,
        )
    }

    async fn delete_movie_rating(
        &self,
        movie_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus> {
        boxed(
            "delete movie rating",
            self.client
                .delete_movie_rating(movie_id, session_id, kind)
                .await,
        )
    }

    async fn popular_tv(&self, language: &str, page: u32) -> Resource<TvList> {
        boxed(
            "fetch popular TV shows",
            self.client.popular_tv(language, page).await,
        )
    }

    async fn tv_details(&self, tv_id: i64) -> Resource<TvDetail> {
        boxed("fetch TV details", self.client.tv_details(tv_id).await)
    }

    async fn rate_tv(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
        rating: RatingRequest,
    ) -> Resource<ResponseStatus> {
        boxed(
            "rate TV show",
            self.client.rate_tv(tv_id, session_id, kind, rating).await,
        )
    }

    async fn delete_tv_rating(
        &self,
        tv_id: i64,
        session_id: &str,
        kind: SessionKind,
    ) -> Resource<ResponseStatus> {
        boxed(
            "delete TV rating",
            self.client.delete_tv_rating(tv_id, session_id, kind).await,
        )
    }

    async fn discover_movies(
        &self,
        language: &str,
        sort_by: &str,
        page: u32,
    ) -> Resource<MovieList> {
        boxed(
            "discover movies",
            self.client.discover_movies(language, sort_by, page).await,
        )
    }

    async fn discover_tv(&self, language: &str, sort_by: &str, page: u32) -> Resource<TvList> {
        boxed(
            "discover TV shows",
            self.client.discover_tv(language, sort_by, page).await,
        )
    }

    async fn search_movies(&self, query: &str, language: &str, page: u32) -> Resource<MovieList> {
        boxed(
            "search movies",
            self.client.search_movies(query, language, page).await,
        )
    }

    async fn search_tv(&self, query: &str, language: &str, page: u32) -> Resource<TvList> {
        boxed(
            "search TV shows",
            self.client.search_tv(query, language, page).await,
        )
    }

    async fn search_people(
        &self,
        query: &str,
        language: &str,
        page: u32,
    ) -> Resource<PeopleList> {
        boxed(
            "search people",
            self.client.search_people(query, language, page).await,
        )
    }

    async fn list_details(&self, list_id: &str) -> Resource<ListDetail> {
        boxed("fetch list details", self.client.list_details(list_id).await)
    }

    async fn create_list(
        &self,
        session_id: &str,
        request: CreateListRequest,
    ) -> Resource<ListCreateResponse> {
        boxed(
            "create list",
            self.client.create_list(session_id, &request).await,
        )
    }

    async fn add_to_list(
        &self,
        list_id: &str,
        session_id: &str,
        media_id: i64,
    ) -> Resource<ResponseStatus> {
        boxed(
            "add item to list",
            self.client.add_to_list(list_id, session_id, media_id).await,
        )
    }

    async fn upload_image(&self, path: &Path) -> Resource<UploadResponse> {
        boxed("upload image", self.client.upload_image(path).await)
    }
}
