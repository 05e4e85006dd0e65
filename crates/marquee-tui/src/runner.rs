// TUI event loop and terminal management
use crate::app::{AccountList, App, InputMode, MovieSource, Tab};
use crate::approval::ApprovalHandle;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use marquee_api::MediaType;
use marquee_core::session::{SessionInfo, SessionStore};
use marquee_core::viewmodel::{MediaIntent, MediaViewModel, NewsScreenEvent, NewsViewModel};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

const TICK: Duration = Duration::from_millis(100);

/// Everything the screen talks to
pub struct TuiContext {
    pub news: NewsViewModel,
    pub media: MediaViewModel,
    pub approvals: ApprovalHandle,
    pub sessions: SessionStore,
    pub profile: String,
    pub valid_for_days: u64,
    pub language: String,
    pub mouse_enabled: bool,
}

struct Session<'a> {
    ctx: &'a mut TuiContext,
    intents: UnboundedSender<MediaIntent>,
    saved: Option<SessionInfo>,
}

impl Session<'_> {
    fn send(&self, intent: MediaIntent) {
        if self.intents.send(intent).is_err() {
            warn!("Media intent loop has stopped");
        }
    }

    fn news(&self, event: NewsScreenEvent) {
        self.ctx.news.on_event(event);
    }

    /// Keep the on-disk session in step with the one in state
    fn persist(&mut self, app: &App) {
        let Some(session_id) = app.media.session_id.clone() else {
            return;
        };
        // A stored session without an account reads back as a guest
        if app.media.account_id.is_none() && !app.media.is_guest {
            return;
        }
        let current = SessionInfo {
            session_id,
            account_id: app.media.account_id,
        };
        if self.saved.as_ref() == Some(&current) {
            return;
        }

        self.ctx
            .sessions
            .set(&self.ctx.profile, &current, self.ctx.valid_for_days);
        match self.ctx.sessions.save() {
            Ok(()) => info!("Saved TMDB session for profile {}", self.ctx.profile),
            Err(e) => warn!("Failed to save session: {}", e),
        }
        self.saved = Some(current);
    }
}

pub async fn run_tui(mut app: App, mut ctx: TuiContext) -> anyhow::Result<()> {
    let (intents, intent_loop) = ctx.media.spawn_intent_loop();
    let saved = ctx.sessions.get(&ctx.profile);

    let mut session = Session {
        intents,
        saved: saved.clone(),
        ctx: &mut ctx,
    };

    if let Some(saved) = saved {
        info!("Restoring saved TMDB session");
        session.send(MediaIntent::RestoreSession(saved));
    }
    session.ctx.news.refresh();
    let language = session.ctx.language.clone();
    session.send(MediaIntent::LoadPopularMovies {
        language: language.clone(),
        page: 1,
    });
    session.send(MediaIntent::LoadPopularTv { language, page: 1 });

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if session.ctx.mouse_enabled {
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    } else {
        execute!(stdout, EnterAlternateScreen)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &mut session);

    // Restore terminal, even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    drop(session);
    intent_loop.abort();
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session<'_>,
) -> anyhow::Result<()> {
    loop {
        app.set_news(session.ctx.news.state());
        app.set_media(session.ctx.media.state());
        app.pending_approval = session.ctx.approvals.waiting_url();
        session.persist(app);

        terminal.draw(|f| crate::ui::render(f, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key, session)
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => app.next_item(),
                    MouseEventKind::ScrollUp => app.previous_item(),
                    _ => {}
                },
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    if app.pending_approval.is_some() {
        match key.code {
            KeyCode::Enter => session.ctx.approvals.answer(true),
            KeyCode::Esc => session.ctx.approvals.answer(false),
            _ => {}
        }
        return;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.toggle_help();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key, session),
        InputMode::NewsSearch => match key.code {
            KeyCode::Char(c) => {
                app.input.push(c);
                session.news(NewsScreenEvent::SearchQueryChanged(app.input.clone()));
            }
            KeyCode::Backspace => {
                app.input.pop();
                session.news(NewsScreenEvent::SearchQueryChanged(app.input.clone()));
            }
            KeyCode::Enter => app.enter_normal_mode(),
            KeyCode::Esc => {
                session.news(NewsScreenEvent::CloseIconClicked);
                app.enter_normal_mode();
            }
            _ => {}
        },
        InputMode::MovieSearch | InputMode::Rating | InputMode::UploadPath => match key.code {
            KeyCode::Char(c) => app.input.push(c),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Esc => app.enter_normal_mode(),
            KeyCode::Enter => {
                submit_input(app, session);
                app.enter_normal_mode();
            }
            _ => {}
        },
    }
}

fn submit_input(app: &mut App, session: &Session<'_>) {
    let input = app.input.trim().to_string();
    if input.is_empty() {
        return;
    }

    match app.input_mode {
        InputMode::MovieSearch => {
            app.show_movies_from(MovieSource::Search);
            session.send(MediaIntent::SearchMovies {
                query: input,
                language: session.ctx.language.clone(),
                page: 1,
            });
        }
        InputMode::Rating => {
            let Ok(rating) = input.parse::<f64>() else {
                app.notice = Some(format!("Not a rating: {}", input));
                return;
            };
            match app.tab {
                Tab::Tv => {
                    if let Some(show) = app.selected_tv() {
                        session.send(MediaIntent::RateTv {
                            tv_id: show.id,
                            rating,
                        });
                    }
                }
                _ => {
                    if let Some(movie) = app.selected_movie() {
                        session.send(MediaIntent::RateMovie {
                            movie_id: movie.id,
                            rating,
                        });
                    }
                }
            }
        }
        InputMode::UploadPath => {
            app.upload_path = input.clone();
            session.send(MediaIntent::UploadImage(PathBuf::from(input)));
        }
        InputMode::Normal | InputMode::NewsSearch => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    match key.code {
        KeyCode::Char('q') => return app.quit(),
        KeyCode::Char('?') => return app.toggle_help(),
        KeyCode::Tab => return app.next_tab(),
        KeyCode::BackTab => return app.previous_tab(),
        KeyCode::Char(c @ '1'..='5') => {
            return app.select_tab(c.to_digit(10).unwrap_or(1) as usize)
        }
        KeyCode::Esc => {
            app.notice = None;
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => return app.next_item(),
        KeyCode::Char('k') | KeyCode::Up => return app.previous_item(),
        _ => {}
    }

    match app.tab {
        Tab::News => handle_news_key(app, key, session),
        Tab::Movies => handle_movies_key(app, key, session),
        Tab::Tv => handle_tv_key(app, key, session),
        Tab::Account => handle_account_key(app, key, session),
        Tab::Upload => {
            if matches!(key.code, KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter) {
                app.enter_input_mode(InputMode::UploadPath);
            }
        }
    }
}

fn handle_news_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            session.news(NewsScreenEvent::CategoryChanged(app.news.category.previous()));
        }
        KeyCode::Char('l') | KeyCode::Right => {
            session.news(NewsScreenEvent::CategoryChanged(app.news.category.next()));
        }
        KeyCode::Char('r') => {
            session.ctx.news.refresh();
        }
        KeyCode::Char('/') => {
            session.news(NewsScreenEvent::SearchIconClicked);
            app.enter_input_mode(InputMode::NewsSearch);
        }
        KeyCode::Enter => {
            if let Some(article) = app.selected_article().cloned() {
                let url = article.url.clone();
                session.news(NewsScreenEvent::NewsCardClicked(article));
                if let Err(e) = open::that(&url) {
                    app.notice = Some(format!("Failed to open browser: {}", e));
                }
            }
        }
        _ => {}
    }
}

fn handle_movies_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    let selected = app.selected_movie().map(|m| m.id);

    match (key.code, selected) {
        (KeyCode::Char('/'), _) => app.enter_input_mode(InputMode::MovieSearch),
        (KeyCode::Char('p'), _) | (KeyCode::Char('r'), _) => {
            app.show_movies_from(MovieSource::Popular);
            session.send(MediaIntent::LoadPopularMovies {
                language: session.ctx.language.clone(),
                page: 1,
            });
        }
        (KeyCode::Enter, Some(id)) => session.send(MediaIntent::LoadMovieDetails(id)),
        (KeyCode::Char('s'), Some(_)) => app.enter_input_mode(InputMode::Rating),
        (KeyCode::Char('x'), Some(id)) => session.send(MediaIntent::DeleteMovieRating(id)),
        (KeyCode::Char('w'), Some(id)) => session.send(MediaIntent::AddMovieToWatchlist(id)),
        (KeyCode::Char('f'), Some(id)) | (KeyCode::Char('F'), Some(id)) => {
            session.send(MediaIntent::AddFavorite {
                media_type: MediaType::Movie,
                media_id: id,
                favorite: key.code == KeyCode::Char('f'),
            })
        }
        _ => {}
    }
}

fn handle_tv_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    let selected = app.selected_tv().map(|s| s.id);

    match (key.code, selected) {
        (KeyCode::Char('r'), _) => session.send(MediaIntent::LoadPopularTv {
            language: session.ctx.language.clone(),
            page: 1,
        }),
        (KeyCode::Enter, Some(id)) => session.send(MediaIntent::LoadTvDetails(id)),
        (KeyCode::Char('s'), Some(_)) => app.enter_input_mode(InputMode::Rating),
        (KeyCode::Char('w'), Some(id)) => session.send(MediaIntent::AddTvToWatchlist(id)),
        (KeyCode::Char('f'), Some(id)) | (KeyCode::Char('F'), Some(id)) => {
            session.send(MediaIntent::AddFavorite {
                media_type: MediaType::Tv,
                media_id: id,
                favorite: key.code == KeyCode::Char('f'),
            })
        }
        _ => {}
    }
}

fn handle_account_key(app: &mut App, key: KeyEvent, session: &Session<'_>) {
    match key.code {
        KeyCode::Char('l') => {
            app.notice = Some("Approve the request in your browser, then press Enter".into());
            session.send(MediaIntent::InitializeSession);
        }
        KeyCode::Char('a') | KeyCode::Char('r') => session.send(MediaIntent::LoadAccountDetails),
        KeyCode::Char('f') => {
            app.show_account_list(AccountList::Favorites);
            session.send(MediaIntent::LoadFavoriteMovies);
        }
        KeyCode::Char('w') => {
            app.show_account_list(AccountList::Watchlist);
            session.send(MediaIntent::LoadWatchlistMovies);
        }
        KeyCode::Enter => {
            if let Some(id) = app.selected_movie().map(|m| m.id) {
                app.tab = Tab::Movies;
                session.send(MediaIntent::LoadMovieDetails(id));
            }
        }
        _ => {}
    }
}
