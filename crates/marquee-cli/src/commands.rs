// Subcommand handlers
use anyhow::{anyhow, Context};
use marquee_api::media::{CreateListRequest, FavoriteRequest, WatchlistRequest};
use marquee_api::{MediaType, RatingRequest, User};
use marquee_core::session::{bootstrap_session, open_guest_session};
use marquee_core::viewmodel::{MediaViewModel, NewsViewModel, UserIntent, UserViewModel};
use marquee_core::{context, Config, Resource, SessionInfo, SessionStore};
use marquee_tui::{approval_channel, run_tui, App, TuiContext};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::approver::PromptApprover;
use crate::output::{emit, Done};
use crate::{
    AccountAction, Cli, Commands, ListAction, MarkArgs, TitleAction, UserAction, UserFields,
};

/// File, then environment, then flags
pub fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    config.apply_env();

    if let Some(language) = &cli.language {
        config.tmdb.language = language.clone();
    }
    if let Some(profile) = &cli.profile {
        config.session.profile = profile.clone();
    }
    Ok(config)
}

/// Success or the message the user should see
fn settle<T>(resource: Resource<T>) -> anyhow::Result<T> {
    match resource {
        Resource::Success(data) => Ok(data),
        other => Err(anyhow!(other
            .error_message()
            .unwrap_or_else(|| "Request did not finish".to_string()))),
    }
}

/// Any stored session, guest or not. Only ratings take a guest session.
fn require_session(store: &SessionStore, profile: &str) -> anyhow::Result<SessionInfo> {
    store.get(profile).ok_or_else(|| {
        anyhow!("Not logged in. Run `marquee login` (`marquee guest` is enough for ratings)")
    })
}

/// Session id and account id of a signed-in session; guests are turned away here
fn require_account(store: &SessionStore, profile: &str) -> anyhow::Result<(String, i64)> {
    let session = store
        .get(profile)
        .ok_or_else(|| anyhow!("Not logged in. Run `marquee login` first"))?;
    match session.account_id {
        Some(account_id) => Ok((session.session_id, account_id)),
        None => Err(anyhow!("Guest sessions can only rate titles. Run `marquee login` first")),
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let json = cli.json;

    let Some(command) = cli.command else {
        return launch_tui(config).await;
    };

    match command {
        Commands::Headlines { category } => {
            let (headlines, _) = context::news_use_cases(&config)?;
            let articles = settle(headlines.call(&category.label().to_lowercase()).await)?;
            emit(json, &articles)
        }
        Commands::NewsSearch { query } => {
            let (_, search) = context::news_use_cases(&config)?;
            let articles = settle(search.call(&query).await)?;
            emit(json, &articles)
        }
        Commands::Movies { action } => titles(MediaType::Movie, action, &config, json).await,
        Commands::Tv { action } => titles(MediaType::Tv, action, &config, json).await,
        Commands::People { query, page } => {
            let media = context::media_use_cases(&config)?;
            let people = settle(
                media
                    .repository()
                    .search_people(&query, &config.tmdb.language, page)
                    .await,
            )?;
            emit(json, &people)
        }
        Commands::Certifications { kind } => {
            let media = context::media_use_cases(&config)?;
            let repo = media.repository();
            let certifications = match kind {
                MediaType::Movie => repo.movie_certifications().await,
                MediaType::Tv => repo.tv_certifications().await,
            };
            emit(json, &settle(certifications)?)
        }
        Commands::Login => login(&config, json).await,
        Commands::Guest => {
            let media = context::media_use_cases(&config)?;
            let session = settle(open_guest_session(media.repository()).await)?;
            save_session(&config, &session)?;
            emit(
                json,
                &Done {
                    message: "Guest session started".into(),
                },
            )
        }
        Commands::Logout => logout(&config, json).await,
        Commands::Account { action } => account(action, &config, json).await,
        Commands::Favorite(args) => mark(args, true, &config, json).await,
        Commands::Watchlist(args) => mark(args, false, &config, json).await,
        Commands::List { action } => lists(action, &config, json).await,
        Commands::Upload { file } => {
            let media = context::media_use_cases(&config)?;
            let response = settle(media.upload_image(file).await)?;
            emit(json, &response)
        }
        Commands::Users { action } => users(action, &config, json).await,
    }
}

async fn launch_tui(config: Config) -> anyhow::Result<()> {
    let (headlines, search) = context::news_use_cases(&config)?;
    let news = NewsViewModel::new(headlines, search)
        .with_debounce(Duration::from_millis(config.ui.search_debounce_ms));

    let (approver, approvals) = approval_channel();
    let media = MediaViewModel::new(context::media_use_cases(&config)?, Arc::new(approver));

    info!("Starting TUI");
    let ctx = TuiContext {
        news,
        media,
        approvals,
        sessions: SessionStore::load()?,
        profile: config.session.profile.clone(),
        valid_for_days: config.session.valid_for_days,
        language: config.tmdb.language.clone(),
        mouse_enabled: config.ui.mouse_enabled,
    };
    run_tui(App::new(), ctx).await
}

fn save_session(config: &Config, session: &SessionInfo) -> anyhow::Result<()> {
    let mut store = SessionStore::load()?;
    store.set(&config.session.profile, session, config.session.valid_for_days);
    store.save()?;
    info!("Session saved for profile {}", config.session.profile);
    Ok(())
}

async fn login(config: &Config, json: bool) -> anyhow::Result<()> {
    let media = context::media_use_cases(config)?;
    let session = settle(bootstrap_session(media.repository(), &PromptApprover).await)?;
    save_session(config, &session)?;

    let message = match session.account_id {
        Some(id) => format!("Logged in to account {}", id),
        None => "Logged in".to_string(),
    };
    emit(json, &Done { message })
}

async fn logout(config: &Config, json: bool) -> anyhow::Result<()> {
    let profile = &config.session.profile;
    let mut store = SessionStore::load()?;
    let Some(session) = store.get(profile) else {
        return emit(
            json,
            &Done {
                message: format!("No stored session for profile {}", profile),
            },
        );
    };

    // Guest sessions can't be deleted remotely; they just expire
    if !session.is_guest() {
        let media = context::media_use_cases(config)?;
        match media.repository().delete_session(&session.session_id).await {
            Resource::Success(_) => info!("TMDB session deleted"),
            other => warn!(
                "TMDB did not delete the session: {}",
                other.error_message().unwrap_or_default()
            ),
        }
    }

    store.remove(profile);
    store.save()?;
    emit(
        json,
        &Done {
            message: "Logged out".into(),
        },
    )
}

async fn titles(
    kind: MediaType,
    action: TitleAction,
    config: &Config,
    json: bool,
) -> anyhow::Result<()> {
    let media = context::media_use_cases(config)?;
    let repo = media.repository();
    let language = config.tmdb.language.as_str();

    match (kind, action) {
        (MediaType::Movie, TitleAction::Popular { page }) => {
            emit(json, &settle(media.popular_movies(language, page).await)?)
        }
        (MediaType::Tv, TitleAction::Popular { page }) => {
            emit(json, &settle(media.popular_tv(language, page).await)?)
        }
        (MediaType::Movie, TitleAction::Show { id }) => {
            emit(json, &settle(media.movie_details(id).await)?)
        }
        (MediaType::Tv, TitleAction::Show { id }) => {
            emit(json, &settle(media.tv_details(id).await)?)
        }
        (MediaType::Movie, TitleAction::Search { query, page }) => {
            emit(json, &settle(media.search_movies(&query, language, page).await)?)
        }
        (MediaType::Tv, TitleAction::Search { query, page }) => {
            emit(json, &settle(repo.search_tv(&query, language, page).await)?)
        }
        (MediaType::Movie, TitleAction::Discover { sort_by, page }) => {
            emit(json, &settle(repo.discover_movies(language, &sort_by, page).await)?)
        }
        (MediaType::Tv, TitleAction::Discover { sort_by, page }) => {
            emit(json, &settle(repo.discover_tv(language, &sort_by, page).await)?)
        }
        (kind, TitleAction::Rate { id, rating }) => {
            let rating = RatingRequest::new(rating).map_err(anyhow::Error::msg)?;
            let session = require_session(&SessionStore::load()?, &config.session.profile)?;
            let (sid, session_kind) = (session.session_id.as_str(), session.kind());
            let status = match kind {
                MediaType::Movie => media.rate_movie(id, sid, session_kind, rating).await,
                MediaType::Tv => media.rate_tv(id, sid, session_kind, rating).await,
            };
            emit(json, &settle(status)?)
        }
        (kind, TitleAction::Unrate { id }) => {
            let session = require_session(&SessionStore::load()?, &config.session.profile)?;
            let (sid, session_kind) = (session.session_id.as_str(), session.kind());
            let status = match kind {
                MediaType::Movie => media.delete_movie_rating(id, sid, session_kind).await,
                MediaType::Tv => media.delete_tv_rating(id, sid, session_kind).await,
            };
            emit(json, &settle(status)?)
        }
    }
}

async fn account(action: AccountAction, config: &Config, json: bool) -> anyhow::Result<()> {
    let (session_id, account) = require_account(&SessionStore::load()?, &config.session.profile)?;
    let media = context::media_use_cases(config)?;
    let repo = media.repository();
    let sid = session_id.as_str();

    match action {
        AccountAction::Details => emit(json, &settle(media.account_details(sid).await)?),
        AccountAction::Favorites { tv: false } => {
            emit(json, &settle(media.favorite_movies(account, sid).await)?)
        }
        AccountAction::Favorites { tv: true } => {
            emit(json, &settle(repo.favorite_tv(account, sid).await)?)
        }
        AccountAction::Watchlist { tv: false } => {
            emit(json, &settle(media.watchlist_movies(account, sid).await)?)
        }
        AccountAction::Watchlist { tv: true } => {
            emit(json, &settle(repo.watchlist_tv(account, sid).await)?)
        }
        AccountAction::Rated { tv: false } => {
            emit(json, &settle(repo.rated_movies(account, sid).await)?)
        }
        AccountAction::Rated { tv: true } => {
            emit(json, &settle(repo.rated_tv(account, sid).await)?)
        }
    }
}

/// Favorite (or watchlist) on or off
async fn mark(args: MarkArgs, favorite: bool, config: &Config, json: bool) -> anyhow::Result<()> {
    let (session_id, account) = require_account(&SessionStore::load()?, &config.session.profile)?;
    let media = context::media_use_cases(config)?;

    let status = if favorite {
        media
            .add_favorite(
                account,
                &session_id,
                FavoriteRequest {
                    media_type: args.media_type,
                    media_id: args.id,
                    favorite: !args.remove,
                },
            )
            .await
    } else {
        media
            .add_to_watchlist(
                account,
                &session_id,
                WatchlistRequest {
                    media_type: args.media_type,
                    media_id: args.id,
                    watchlist: !args.remove,
                },
            )
            .await
    };
    emit(json, &settle(status)?)
}

async fn lists(action: ListAction, config: &Config, json: bool) -> anyhow::Result<()> {
    let media = context::media_use_cases(config)?;
    let repo = media.repository();

    match action {
        ListAction::Show { list_id } => emit(json, &settle(repo.list_details(&list_id).await)?),
        ListAction::Create { name, description } => {
            let (session_id, _) = require_account(&SessionStore::load()?, &config.session.profile)?;
            let language = config
                .tmdb
                .language
                .split('-')
                .next()
                .unwrap_or("en")
                .to_string();
            let request = CreateListRequest {
                name,
                description,
                language,
            };
            emit(json, &settle(repo.create_list(&session_id, request).await)?)
        }
        ListAction::Add { list_id, media_id } => {
            let (session_id, _) = require_account(&SessionStore::load()?, &config.session.profile)?;
            emit(
                json,
                &settle(repo.add_to_list(&list_id, &session_id, media_id).await)?,
            )
        }
    }
}

impl From<UserFields> for User {
    fn from(fields: UserFields) -> Self {
        User {
            id: 0,
            name: fields.name,
            email: fields.email,
            age: fields.age,
            city: fields.city,
            job: fields.job,
        }
    }
}

/// Which field of the users screen state a command fills
enum UserOutput {
    User,
    Users,
    Profile,
    Upload,
    Deleted(i64),
}

async fn users(action: UserAction, config: &Config, json: bool) -> anyhow::Result<()> {
    let vm = UserViewModel::new(context::user_use_cases(config)?);

    let (intent, output) = match action {
        UserAction::Get { id } => (UserIntent::GetUserById(id), UserOutput::User),
        UserAction::Create(fields) => (UserIntent::CreateUser(fields.into()), UserOutput::User),
        UserAction::Register(fields) => (UserIntent::RegisterUser(fields.into()), UserOutput::User),
        UserAction::Update { id, fields } => {
            let mut user: User = fields.into();
            user.id = id;
            (UserIntent::UpdateUser { id, user }, UserOutput::User)
        }
        UserAction::Delete { id } => (UserIntent::DeleteUser(id), UserOutput::Deleted(id)),
        UserAction::Status { status } => (UserIntent::GetUsersByStatus(status), UserOutput::Users),
        UserAction::Filter { filters } => (
            UserIntent::GetUsersByFilters(filters.into_iter().collect::<BTreeMap<_, _>>()),
            UserOutput::Users,
        ),
        UserAction::Url { url } => (UserIntent::GetUsersByUrl(url), UserOutput::Users),
        UserAction::Quick { name, job } => (
            UserIntent::CreateUserWithFields { name, job },
            UserOutput::User,
        ),
        UserAction::Profile { token } => {
            (UserIntent::GetUserProfile { token }, UserOutput::Profile)
        }
        UserAction::ProfileWithHeaders { headers } => (
            UserIntent::GetUserProfileWithHeaders(headers.into_iter().collect::<BTreeMap<_, _>>()),
            UserOutput::Profile,
        ),
        UserAction::Upload { file, description } => (
            UserIntent::UploadImage {
                path: file,
                description,
            },
            UserOutput::Upload,
        ),
    };

    vm.handle(intent).await;
    let state = vm.state();
    if let Some(error) = state.error_message {
        return Err(anyhow!(error));
    }

    let missing = || anyhow!("The users API returned nothing");
    match output {
        UserOutput::User => emit(json, &state.user.ok_or_else(missing)?),
        UserOutput::Users => emit(json, &state.users.ok_or_else(missing)?),
        UserOutput::Profile => emit(json, &state.user_profile.ok_or_else(missing)?),
        UserOutput::Upload => emit(json, &state.upload_response.ok_or_else(missing)?),
        UserOutput::Deleted(id) => emit(
            json,
            &Done {
                message: format!("Deleted user {}", id),
            },
        ),
    }
}
