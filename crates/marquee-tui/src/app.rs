// TUI application state: what is selected, what is being typed, and the
// latest snapshot of each view-model
use marquee_api::media::{Movie, TvShow};
use marquee_api::news::Article;
use marquee_core::viewmodel::{MediaState, NewsScreenState};
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    News,
    Movies,
    Tv,
    Account,
    Upload,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::News, Tab::Movies, Tab::Tv, Tab::Account, Tab::Upload];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::News => "News",
            Tab::Movies => "Movies",
            Tab::Tv => "TV",
            Tab::Account => "Account",
            Tab::Upload => "Upload",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    NewsSearch,  // Live search, debounced by the view-model
    MovieSearch, // Submitted with Enter
    Rating,      // Rating for the selected movie or show
    UploadPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieSource {
    Popular,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountList {
    Favorites,
    Watchlist,
}

pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub input: String,
    /// Local feedback that isn't a call result ("Opening browser...")
    pub notice: Option<String>,
    /// Set while TMDB waits for the user to approve a request token
    pub pending_approval: Option<String>,

    pub news: NewsScreenState,
    pub media: MediaState,

    pub news_list: ListState,
    pub movie_list: ListState,
    pub tv_list: ListState,
    pub account_list: ListState,
    pub movie_source: MovieSource,
    pub account_view: AccountList,
    pub upload_path: String,
}

impl App {
    pub fn new() -> Self {
        let mut news_list = ListState::default();
        news_list.select(Some(0));
        let mut movie_list = ListState::default();
        movie_list.select(Some(0));
        let mut tv_list = ListState::default();
        tv_list.select(Some(0));
        let mut account_list = ListState::default();
        account_list.select(Some(0));

        Self {
            should_quit: false,
            show_help: false,
            tab: Tab::News,
            input_mode: InputMode::Normal,
            input: String::new(),
            notice: None,
            pending_approval: None,
            news: NewsScreenState::default(),
            media: MediaState::default(),
            news_list,
            movie_list,
            tv_list,
            account_list,
            movie_source: MovieSource::Popular,
            account_view: AccountList::Favorites,
            upload_path: String::new(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn next_tab(&mut self) {
        self.tab = Tab::ALL[(self.tab.index() + 1) % Tab::ALL.len()];
    }

    pub fn previous_tab(&mut self) {
        self.tab = Tab::ALL[(self.tab.index() + Tab::ALL.len() - 1) % Tab::ALL.len()];
    }

    pub fn select_tab(&mut self, number: usize) {
        if let Some(tab) = number.checked_sub(1).and_then(|i| Tab::ALL.get(i)) {
            self.tab = *tab;
        }
    }

    pub fn enter_input_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input = match mode {
            InputMode::NewsSearch => self.news.search_query.clone(),
            InputMode::UploadPath => self.upload_path.clone(),
            _ => String::new(),
        };
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    pub fn is_loading(&self) -> bool {
        match self.tab {
            Tab::News => self.news.is_loading,
            _ => self.media.is_loading,
        }
    }

    /// Last call error for the current tab
    pub fn status_error(&self) -> Option<&str> {
        match self.tab {
            Tab::News => self.news.error.as_deref(),
            _ => self.media.error_message.as_deref(),
        }
    }

    /// New news state; keep the selection inside the list
    pub fn set_news(&mut self, news: NewsScreenState) {
        self.news = news;
        clamp(&mut self.news_list, self.news.articles.len());
    }

    pub fn set_media(&mut self, media: MediaState) {
        self.media = media;
        let (movies, shows, saved) = (
            self.visible_movies().len(),
            self.tv_shows().len(),
            self.account_movies().len(),
        );
        clamp(&mut self.movie_list, movies);
        clamp(&mut self.tv_list, shows);
        clamp(&mut self.account_list, saved);
    }

    pub fn visible_movies(&self) -> &[Movie] {
        let list = match self.movie_source {
            MovieSource::Popular => self.media.popular_movies.as_ref(),
            MovieSource::Search => self.media.searched_movies.as_ref(),
        };
        list.map(|l| l.results.as_slice()).unwrap_or(&[])
    }

    pub fn tv_shows(&self) -> &[TvShow] {
        self.media
            .popular_tv
            .as_ref()
            .map(|l| l.results.as_slice())
            .unwrap_or(&[])
    }

    pub fn account_movies(&self) -> &[Movie] {
        let list = match self.account_view {
            AccountList::Favorites => self.media.favorite_movies.as_ref(),
            AccountList::Watchlist => self.media.watchlist_movies.as_ref(),
        };
        list.map(|l| l.results.as_slice()).unwrap_or(&[])
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.news.articles.get(self.news_list.selected()?)
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        match self.tab {
            Tab::Account => self.account_movies().get(self.account_list.selected()?),
            _ => self.visible_movies().get(self.movie_list.selected()?),
        }
    }

    pub fn selected_tv(&self) -> Option<&TvShow> {
        self.tv_shows().get(self.tv_list.selected()?)
    }

    pub fn show_movies_from(&mut self, source: MovieSource) {
        self.movie_source = source;
        self.movie_list.select(Some(0));
    }

    pub fn show_account_list(&mut self, view: AccountList) {
        self.account_view = view;
        self.account_list.select(Some(0));
    }

    pub fn next_item(&mut self) {
        let (len, list) = self.current_list();
        step(list, len, true);
    }

    pub fn previous_item(&mut self) {
        let (len, list) = self.current_list();
        step(list, len, false);
    }

    fn current_list(&mut self) -> (usize, &mut ListState) {
        match self.tab {
            Tab::News => (self.news.articles.len(), &mut self.news_list),
            Tab::Movies => (self.visible_movies().len(), &mut self.movie_list),
            Tab::Tv => (self.tv_shows().len(), &mut self.tv_list),
            Tab::Account | Tab::Upload => (self.account_movies().len(), &mut self.account_list),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

fn step(list: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let current = list.selected().unwrap_or(0);
    let next = if forward {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1)
    };
    list.select(Some(next));
}

fn clamp(list: &mut ListState, len: usize) {
    match list.selected() {
        Some(i) if len > 0 && i >= len => list.select(Some(len - 1)),
        None => list.select(Some(0)),
        _ => {}
    }
}
