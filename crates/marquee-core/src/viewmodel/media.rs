// Movie / TV / account screen state, driven by TMDB intents
use marquee_api::media::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Reducer, Store, UiState};
use crate::resource::ResourceStream;
use crate::session::{open_session, SessionInfo, TokenApprover};
use crate::usecase::MediaUseCases;
use crate::Resource;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaState {
    pub is_loading: bool,

    pub popular_movies: Option<MovieList>,
    pub movie_detail: Option<MovieDetail>,
    pub searched_movies: Option<MovieList>,
    pub movie_rating_status: Option<ResponseStatus>,
    pub movie_watchlist_status: Option<ResponseStatus>,

    pub popular_tv: Option<TvList>,
    pub tv_detail: Option<TvDetail>,
    pub tv_rating_status: Option<ResponseStatus>,
    pub tv_watchlist_status: Option<ResponseStatus>,

    pub account_details: Option<AccountDetails>,
    pub favorite_movies: Option<MovieList>,
    pub watchlist_movies: Option<MovieList>,
    pub favorite_status: Option<ResponseStatus>,

    pub upload_response: Option<UploadResponse>,

    pub session_id: Option<String>,
    pub account_id: Option<i64>,
    pub is_guest: bool,

    pub error_message: Option<String>,
}

impl UiState for MediaState {}

impl MediaState {
    pub fn has_session(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn session_kind(&self) -> SessionKind {
        if self.is_guest {
            SessionKind::Guest
        } else {
            SessionKind::User
        }
    }
}

const GUEST_REFUSED: &str = "Guest sessions can only rate titles. Run `marquee login` first";

/// Session and account come from state, so intents only carry what the user picked
#[derive(Debug, Clone, PartialEq)]
pub enum MediaIntent {
    InitializeSession,
    /// Adopt a session saved by an earlier run
    RestoreSession(SessionInfo),

    LoadPopularMovies { language: String, page: u32 },
    LoadMovieDetails(i64),
    SearchMovies { query: String, language: String, page: u32 },
    RateMovie { movie_id: i64, rating: f64 },
    DeleteMovieRating(i64),
    AddMovieToWatchlist(i64),

    LoadPopularTv { language: String, page: u32 },
    LoadTvDetails(i64),
    RateTv { tv_id: i64, rating: f64 },
    AddTvToWatchlist(i64),

    LoadAccountDetails,
    LoadFavoriteMovies,
    LoadWatchlistMovies,
    AddFavorite { media_type: MediaType, media_id: i64, favorite: bool },

    UploadImage(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaUpdate {
    /// A load began: spinner on, stale error gone
    Started,
    Failed(String),

    SessionOpened(Resource<String>),
    SessionAccount(Resource<AccountDetails>),
    SessionRestored(SessionInfo),

    PopularMovies(Resource<MovieList>),
    MovieDetail(Resource<MovieDetail>),
    SearchedMovies(Resource<MovieList>),
    MovieRating(Resource<ResponseStatus>),
    MovieWatchlist(Resource<ResponseStatus>),

    PopularTv(Resource<TvList>),
    TvDetail(Resource<TvDetail>),
    TvRating(Resource<ResponseStatus>),
    TvWatchlist(Resource<ResponseStatus>),

    AccountDetails(Resource<AccountDetails>),
    FavoriteMovies(Resource<MovieList>),
    WatchlistMovies(Resource<MovieList>),
    Favorite(Resource<ResponseStatus>),

    Upload(Resource<UploadResponse>),
}

pub struct MediaReducer;

impl Reducer for MediaReducer {
    type State = MediaState;
    type Update = MediaUpdate;

    fn reduce(state: MediaState, update: MediaUpdate) -> MediaState {
        match update {
            MediaUpdate::Started => MediaState {
                is_loading: true,
                error_message: None,
                ..state
            },
            MediaUpdate::Failed(message) => MediaState {
                is_loading: false,
                error_message: Some(message),
                ..state
            },

            MediaUpdate::SessionOpened(resource) => {
                apply(state, resource, |s, session_id| MediaState {
                    // The account lookup follows
                    is_loading: true,
                    session_id: Some(session_id),
                    is_guest: false,
                    ..s
                })
            }
            MediaUpdate::SessionAccount(resource) => {
                apply(state, resource, |s, account| MediaState {
                    account_id: Some(account.id),
                    account_details: Some(account),
                    ..s
                })
            }
            MediaUpdate::SessionRestored(session) => MediaState {
                is_guest: session.is_guest(),
                session_id: Some(session.session_id),
                account_id: session.account_id,
                ..state
            },

            MediaUpdate::PopularMovies(r) => apply(state, r, |s, v| MediaState {
                popular_movies: Some(v),
                ..s
            }),
            MediaUpdate::MovieDetail(r) => apply(state, r, |s, v| MediaState {
                movie_detail: Some(v),
                ..s
            }),
            MediaUpdate::SearchedMovies(r) => apply(state, r, |s, v| MediaState {
                searched_movies: Some(v),
                ..s
            }),
            MediaUpdate::MovieRating(r) => apply(state, r, |s, v| MediaState {
                movie_rating_status: Some(v),
                ..s
            }),
            MediaUpdate::MovieWatchlist(r) => apply(state, r, |s, v| MediaState {
                movie_watchlist_status: Some(v),
                ..s
            }),

            MediaUpdate::PopularTv(r) => apply(state, r, |s, v| MediaState {
                popular_tv: Some(v),
                ..s
            }),
            MediaUpdate::TvDetail(r) => apply(state, r, |s, v| MediaState {
                tv_detail: Some(v),
                ..s
            }),
            MediaUpdate::TvRating(r) => apply(state, r, |s, v| MediaState {
                tv_rating_status: Some(v),
                ..s
            }),
            MediaUpdate::TvWatchlist(r) => apply(state, r, |s, v| MediaState {
                tv_watchlist_status: Some(v),
                ..s
            }),

            MediaUpdate::AccountDetails(r) => apply(state, r, |s, v| MediaState {
                account_details: Some(v),
                ..s
            }),
            MediaUpdate::FavoriteMovies(r) => apply(state, r, |s, v| MediaState {
                favorite_movies: Some(v),
                ..s
            }),
            MediaUpdate::WatchlistMovies(r) => apply(state, r, |s, v| MediaState {
                watchlist_movies: Some(v),
                ..s
            }),
            MediaUpdate::Favorite(r) => apply(state, r, |s, v| MediaState {
                favorite_status: Some(v),
                ..s
            }),

            MediaUpdate::Upload(r) if r.is_error() => MediaState {
                upload_response: None,
                ..apply(state, r, |s, _| s)
            },
            MediaUpdate::Upload(r) => apply(state, r, |s, v| MediaState {
                upload_response: Some(v),
                ..s
            }),
        }
    }
}

/// Loading, success and failure handling shared by every call result
fn apply<T>(
    state: MediaState,
    resource: Resource<T>,
    store: impl FnOnce(MediaState, T) -> MediaState,
) -> MediaState {
    match resource {
        Resource::Loading => MediaState {
            is_loading: true,
            ..state
        },
        Resource::Success(data) => store(
            MediaState {
                is_loading: false,
                ..state
            },
            data,
        ),
        failed => MediaState {
            is_loading: false,
            error_message: failed.error_message(),
            ..state
        },
    }
}

#[derive(Clone)]
pub struct MediaViewModel {
    store: Store<MediaReducer>,
    use_cases: MediaUseCases,
    approver: Arc<dyn TokenApprover>,
}

impl MediaViewModel {
    pub fn new(use_cases: MediaUseCases, approver: Arc<dyn TokenApprover>) -> Self {
        Self {
            store: Store::default(),
            use_cases,
            approver,
        }
    }

    pub fn state(&self) -> MediaState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<MediaState> {
        self.store.subscribe()
    }

    /// Queue for intents; each one is handled on its own task.
    ///
    /// The loop ends when every sender is dropped. Must be called from within
    /// a Tokio runtime.
    pub fn spawn_intent_loop(&self) -> (mpsc::UnboundedSender<MediaIntent>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<MediaIntent>();
        let vm = self.clone();

        let handle = tokio::spawn(async move {
            while let Some(intent) = rx.recv().await {
                let vm = vm.clone();
                tokio::spawn(async move { vm.handle(intent).await });
            }
            debug!("Media intent channel closed");
        });

        (tx, handle)
    }

    /// Run one intent to completion
    pub async fn handle(&self, intent: MediaIntent) {
        debug!("Handling {:?}", intent);

        match intent {
            MediaIntent::InitializeSession => self.initialize_session().await,
            MediaIntent::RestoreSession(session) => {
                self.store.dispatch(MediaUpdate::SessionRestored(session))
            }

            MediaIntent::LoadPopularMovies { language, page } => {
                self.load(
                    self.use_cases.popular_movies_stream(language, page),
                    MediaUpdate::PopularMovies,
                )
                .await
            }
            MediaIntent::LoadMovieDetails(movie_id) => {
                self.load(
                    self.use_cases.movie_details_stream(movie_id),
                    MediaUpdate::MovieDetail,
                )
                .await
            }
            MediaIntent::SearchMovies {
                query,
                language,
                page,
            } => {
                self.load(
                    self.use_cases.search_movies_stream(query, language, page),
                    MediaUpdate::SearchedMovies,
                )
                .await
            }
            MediaIntent::RateMovie { movie_id, rating } => {
                let Some((session_id, kind)) = self.session() else {
                    return;
                };
                let Some(rating) = self.rating(rating) else {
                    return;
                };
                self.store
                    .drive(
                        self.use_cases
                            .rate_movie_stream(movie_id, session_id, kind, rating),
                        MediaUpdate::MovieRating,
                    )
                    .await
            }
            MediaIntent::DeleteMovieRating(movie_id) => {
                let Some((session_id, kind)) = self.session() else {
                    return;
                };
                self.store
                    .drive(
                        self.use_cases
                            .delete_movie_rating_stream(movie_id, session_id, kind),
                        MediaUpdate::MovieRating,
                    )
                    .await
            }
            MediaIntent::AddMovieToWatchlist(movie_id) => {
                let Some((account_id, session_id)) = self.account() else {
                    return;
                };
                let request = WatchlistRequest {
                    media_type: MediaType::Movie,
                    media_id: movie_id,
                    watchlist: true,
                };
                self.store
                    .drive(
                        self.use_cases
                            .add_to_watchlist_stream(account_id, session_id, request),
                        MediaUpdate::MovieWatchlist,
                    )
                    .await
            }

            MediaIntent::LoadPopularTv { language, page } => {
                self.load(
                    self.use_cases.popular_tv_stream(language, page),
                    MediaUpdate::PopularTv,
                )
                .await
            }
            MediaIntent::LoadTvDetails(tv_id) => {
                self.load(self.use_cases.tv_details_stream(tv_id), MediaUpdate::TvDetail)
                    .await
            }
            MediaIntent::RateTv { tv_id, rating } => {
                let Some((session_id, kind)) = self.session() else {
                    return;
                };
                let Some(rating) = self.rating(rating) else {
                    return;
                };
                self.store
                    .drive(
                        self.use_cases.rate_tv_stream(tv_id, session_id, kind, rating),
                        MediaUpdate::TvRating,
                    )
                    .await
            }
            MediaIntent::AddTvToWatchlist(tv_id) => {
                let Some((account_id, session_id)) = self.account() else {
                    return;
                };
                let request = WatchlistRequest {
                    media_type: MediaType::Tv,
                    media_id: tv_id,
                    watchlist: true,
                };
                self.store
                    .drive(
                        self.use_cases
                            .add_to_watchlist_stream(account_id, session_id, request),
                        MediaUpdate::TvWatchlist,
                    )
                    .await
            }

            MediaIntent::LoadAccountDetails => {
                let Some(session_id) = self.user_session() else {
                    return;
                };
                self.load(
                    self.use_cases.account_details_stream(session_id),
                    MediaUpdate::AccountDetails,
                )
                .await
            }
            MediaIntent::LoadFavoriteMovies => {
                let Some((account_id, session_id)) = self.account() else {
                    return;
                };
                self.load(
                    self.use_cases.favorite_movies_stream(account_id, session_id),
                    MediaUpdate::FavoriteMovies,
                )
                .await
            }
            MediaIntent::LoadWatchlistMovies => {
                let Some((account_id, session_id)) = self.account() else {
                    return;
                };
                self.load(
                    self.use_cases.watchlist_movies_stream(account_id, session_id),
                    MediaUpdate::WatchlistMovies,
                )
                .await
            }
            MediaIntent::AddFavorite {
                media_type,
                media_id,
                favorite,
            } => {
                let Some((account_id, session_id)) = self.account() else {
                    return;
                };
                let request = FavoriteRequest {
                    media_type,
                    media_id,
                    favorite,
                };
                self.store
                    .drive(
                        self.use_cases.add_favorite_stream(account_id, session_id, request),
                        MediaUpdate::Favorite,
                    )
                    .await
            }

            MediaIntent::UploadImage(path) => {
                self.store
                    .drive(self.use_cases.upload_image_stream(path), MediaUpdate::Upload)
                    .await
            }
        }
    }

    async fn load<T>(&self, stream: ResourceStream<'_, T>, wrap: fn(Resource<T>) -> MediaUpdate) {
        self.store.dispatch(MediaUpdate::Started);
        self.store.drive(stream, wrap).await;
    }

    /// Token, approval, session id into state, then the account id
    async fn initialize_session(&self) {
        self.store.dispatch(MediaUpdate::Started);

        let opened = open_session(self.use_cases.repository(), self.approver.as_ref()).await;
        let session_id = opened.data().cloned();
        self.store.dispatch(MediaUpdate::SessionOpened(opened));

        let Some(session_id) = session_id else {
            return;
        };

        let account = self.use_cases.account_details(&session_id).await;
        self.store.dispatch(MediaUpdate::SessionAccount(account));
    }

    /// Any session. Ratings are the only calls that accept a guest.
    fn session(&self) -> Option<(String, SessionKind)> {
        let state = self.store.state();
        let kind = state.session_kind();
        match state.session_id {
            Some(session_id) => Some((session_id, kind)),
            None => {
                self.store
                    .dispatch(MediaUpdate::Failed("No active session".to_string()));
                None
            }
        }
    }

    /// A signed-in session, refused for guests before any request goes out
    fn user_session(&self) -> Option<String> {
        let (session_id, kind) = self.session()?;
        if kind == SessionKind::Guest {
            self.store
                .dispatch(MediaUpdate::Failed(GUEST_REFUSED.to_string()));
            return None;
        }
        Some(session_id)
    }

    fn account(&self) -> Option<(i64, String)> {
        let session_id = self.user_session()?;
        match self.store.state().account_id {
            Some(account_id) => Some((account_id, session_id)),
            None => {
                self.store.dispatch(MediaUpdate::Failed(
                    "Account details have not loaded for this session".to_string(),
                ));
                None
            }
        }
    }

    fn rating(&self, value: f64) -> Option<RatingRequest> {
        match RatingRequest::new(value) {
            Ok(rating) => Some(rating),
            Err(message) => {
                self.store.dispatch(MediaUpdate::Failed(message));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockMediaRepository;
    use crate::session::MockTokenApprover;
    use crate::ErrorKind;

    fn failed<T>(message: &str) -> Resource<T> {
        Resource::error(ErrorKind::Unexpected, message)
    }

    fn movie(id: i64, title: &str) -> Movie {
        serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
    }

    fn page(movies: Vec<Movie>) -> MovieList {
        Paged {
            page: 1,
            total_pages: 1,
            total_results: movies.len() as u32,
            results: movies,
        }
    }

    fn ok_status() -> ResponseStatus {
        ResponseStatus {
            status_code: 1,
            status_message: "Success.".into(),
        }
    }

    fn view_model(repo: MockMediaRepository) -> MediaViewModel {
        let mut approver = MockTokenApprover::new();
        approver.expect_approve().return_const(true);
        MediaViewModel::new(MediaUseCases::new(Arc::new(repo)), Arc::new(approver))
    }

    fn signed_in(vm: &MediaViewModel) {
        vm.store.dispatch(MediaUpdate::SessionRestored(SessionInfo {
            session_id: "sess".into(),
            account_id: Some(42),
        }));
    }

    #[test]
    fn test_loading_intent_clears_previous_error() {
        let state = MediaState {
            error_message: Some("boom".into()),
            ..Default::default()
        };
        let state = MediaReducer::reduce(state, MediaUpdate::Started);
        assert!(state.is_loading);
        assert_eq!(state.error_message, None);
    }

    #[test]
    fn test_server_error_shows_server_message() {
        let state = MediaReducer::reduce(
            MediaState {
                is_loading: true,
                ..Default::default()
            },
            MediaUpdate::MovieDetail(Resource::ServerError {
                status_code: 404,
                status: "Not Found".into(),
                server_message: "The resource you requested could not be found.".into(),
            }),
        );
        assert!(!state.is_loading);
        assert_eq!(
            state.error_message.as_deref(),
            Some("404: The resource you requested could not be found.")
        );
        assert_eq!(state.movie_detail, None);
    }

    #[test]
    fn test_upload_failure_clears_previous_result() {
        let state = MediaState {
            upload_response: Some(UploadResponse {
                message: "ok".into(),
                file_url: "https://cdn.example/a.png".into(),
            }),
            ..Default::default()
        };
        let state = MediaReducer::reduce(state, MediaUpdate::Upload(failed("disk gone")));
        assert_eq!(state.upload_response, None);
        assert_eq!(state.error_message.as_deref(), Some("disk gone"));
    }

    #[tokio::test]
    async fn test_popular_movies_lands_in_state() {
        let mut repo = MockMediaRepository::new();
        repo.expect_popular_movies()
            .withf(|language, page| language == "en-US" && *page == 2)
            .times(1)
            .returning(|_, _| Resource::Success(page(vec![movie(1, "Heat")])));

        let vm = view_model(repo);
        vm.handle(MediaIntent::LoadPopularMovies {
            language: "en-US".into(),
            page: 2,
        })
        .await;

        let state = vm.state();
        assert!(!state.is_loading);
        assert_eq!(state.popular_movies, Some(page(vec![movie(1, "Heat")])));
        assert_eq!(state.error_message, None);
    }

    #[tokio::test]
    async fn test_initialize_session_stores_session_then_account() {
        let mut repo = MockMediaRepository::new();
        repo.expect_create_request_token().returning(|| {
            Resource::Success(RequestTokenResponse {
                success: true,
                expires_at: String::new(),
                request_token: "tok".into(),
            })
        });
        repo.expect_create_session().returning(|_| {
            Resource::Success(SessionResponse {
                success: true,
                session_id: Some("sess".into()),
            })
        });
        repo.expect_account_details()
            .withf(|s| s == "sess")
            .returning(|_| {
                Resource::Success(
                    serde_json::from_value(serde_json::json!({ "id": 42, "username": "cinephile" }))
                        .unwrap(),
                )
            });

        let vm = view_model(repo);
        vm.handle(MediaIntent::InitializeSession).await;

        let state = vm.state();
        assert_eq!(state.session_id.as_deref(), Some("sess"));
        assert_eq!(state.account_id, Some(42));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_initialize_session_stops_at_first_failure() {
        let mut repo = MockMediaRepository::new();
        repo.expect_create_request_token().returning(|| {
            Resource::error(ErrorKind::Network, "Network error: connection refused")
        });
        repo.expect_create_session().never();
        repo.expect_account_details().never();

        let vm = view_model(repo);
        vm.handle(MediaIntent::InitializeSession).await;

        let state = vm.state();
        assert_eq!(state.session_id, None);
        assert_eq!(
            state.error_message.as_deref(),
            Some("Network error: connection refused")
        );
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_rating_requires_a_session() {
        let mut repo = MockMediaRepository::new();
        repo.expect_rate_movie().never();

        let vm = view_model(repo);
        vm.handle(MediaIntent::RateMovie {
            movie_id: 1,
            rating: 8.0,
        })
        .await;

        assert_eq!(vm.state().error_message.as_deref(), Some("No active session"));
    }

    #[tokio::test]
    async fn test_out_of_range_rating_never_hits_the_api() {
        let mut repo = MockMediaRepository::new();
        repo.expect_rate_tv().never();

        let vm = view_model(repo);
        signed_in(&vm);
        vm.handle(MediaIntent::RateTv {
            tv_id: 1,
            rating: 11.0,
        })
        .await;

        assert!(vm.state().error_message.is_some());
    }

    #[tokio::test]
    async fn test_watchlist_uses_state_account_and_media_type() {
        let mut repo = MockMediaRepository::new();
        repo.expect_add_to_watchlist()
            .withf(|account_id, session_id, request| {
                *account_id == 42
                    && session_id == "sess"
                    && request.media_type == MediaType::Tv
                    && request.media_id == 1399
                    && request.watchlist
            })
            .times(1)
            .returning(|_, _, _| Resource::Success(ok_status()));

        let vm = view_model(repo);
        signed_in(&vm);
        vm.handle(MediaIntent::AddTvToWatchlist(1399)).await;

        assert_eq!(vm.state().tv_watchlist_status, Some(ok_status()));
    }

    #[tokio::test]
    async fn test_intent_loop_handles_queued_intents() {
        let mut repo = MockMediaRepository::new();
        repo.expect_movie_details()
            .withf(|id| *id == 603)
            .returning(|_| {
                Resource::Success(
                    serde_json::from_value(serde_json::json!({ "id": 603, "title": "The Matrix" }))
                        .unwrap(),
                )
            });

        let vm = view_model(repo);
        let mut rx = vm.subscribe();
        let (tx, _loop) = vm.spawn_intent_loop();
        tx.send(MediaIntent::LoadMovieDetails(603)).unwrap();

        let state = rx
            .wait_for(|s| s.movie_detail.is_some())
            .await
            .unwrap()
            .clone();
        assert_eq!(state.movie_detail.map(|d| d.title), Some("The Matrix".to_string()));
    }

    fn guest(vm: &MediaViewModel) {
        vm.store.dispatch(MediaUpdate::SessionRestored(SessionInfo {
            session_id: "guest-1".into(),
            account_id: None,
        }));
    }

    #[tokio::test]
    async fn test_guest_rating_sends_guest_kind() {
        let mut repo = MockMediaRepository::new();
        repo.expect_rate_movie()
            .withf(|movie_id, session_id, kind, rating| {
                *movie_id == 550
                    && session_id == "guest-1"
                    && *kind == SessionKind::Guest
                    && rating.value == 7.5
            })
            .times(1)
            .returning(|_, _, _, _| Resource::Success(ok_status()));

        let vm = view_model(repo);
        guest(&vm);
        vm.handle(MediaIntent::RateMovie {
            movie_id: 550,
            rating: 7.5,
        })
        .await;

        assert_eq!(vm.state().movie_rating_status, Some(ok_status()));
    }

    #[tokio::test]
    async fn test_guest_is_refused_account_calls_before_any_request() {
        let mut repo = MockMediaRepository::new();
        repo.expect_account_details().never();
        repo.expect_add_to_watchlist().never();
        repo.expect_favorite_movies().never();

        let vm = view_model(repo);
        guest(&vm);

        vm.handle(MediaIntent::LoadAccountDetails).await;
        assert_eq!(vm.state().error_message.as_deref(), Some(GUEST_REFUSED));

        vm.handle(MediaIntent::AddMovieToWatchlist(550)).await;
        vm.handle(MediaIntent::LoadFavoriteMovies).await;
        assert_eq!(vm.state().error_message.as_deref(), Some(GUEST_REFUSED));
    }

    #[tokio::test]
    async fn test_signed_in_rating_sends_user_kind() {
        let mut repo = MockMediaRepository::new();
        repo.expect_delete_movie_rating()
            .withf(|movie_id, session_id, kind| {
                *movie_id == 550 && session_id == "sess" && *kind == SessionKind::User
            })
            .times(1)
            .returning(|_, _, _| Resource::Success(ok_status()));

        let vm = view_model(repo);
        signed_in(&vm);
        vm.handle(MediaIntent::DeleteMovieRating(550)).await;

        assert_eq!(vm.state().movie_rating_status, Some(ok_status()));
    }
}
