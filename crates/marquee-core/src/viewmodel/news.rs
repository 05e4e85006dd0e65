// News screen: category headlines plus a debounced search
use marquee_api::news::Article;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Reducer, Store, UiState};
use crate::usecase::{GetTopHeadlines, SearchNews};
use crate::Resource;

pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewsCategory {
    #[default]
    General,
    Business,
    Health,
    Science,
    Sports,
    Technology,
    Entertainment,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 7] = [
        NewsCategory::General,
        NewsCategory::Business,
        NewsCategory::Health,
        NewsCategory::Science,
        NewsCategory::Sports,
        NewsCategory::Technology,
        NewsCategory::Entertainment,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NewsCategory::General => "General",
            NewsCategory::Business => "Business",
            NewsCategory::Health => "Health",
            NewsCategory::Science => "Science",
            NewsCategory::Sports => "Sports",
            NewsCategory::Technology => "Technology",
            NewsCategory::Entertainment => "Entertainment",
        }
    }

    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for NewsCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown news category: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewsScreenState {
    pub is_loading: bool,
    pub articles: Vec<Article>,
    pub error: Option<String>,
    pub is_search_bar_visible: bool,
    pub selected_article: Option<Article>,
    pub category: NewsCategory,
    pub search_query: String,
}

impl UiState for NewsScreenState {}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsScreenEvent {
    NewsCardClicked(Article),
    CategoryChanged(NewsCategory),
    SearchQueryChanged(String),
    SearchIconClicked,
    CloseIconClicked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewsUpdate {
    Event(NewsScreenEvent),
    Articles(Resource<Vec<Article>>),
}

pub struct NewsReducer;

impl Reducer for NewsReducer {
    type State = NewsScreenState;
    type Update = NewsUpdate;

    fn reduce(state: NewsScreenState, update: NewsUpdate) -> NewsScreenState {
        match update {
            NewsUpdate::Event(event) => match event {
                NewsScreenEvent::NewsCardClicked(article) => NewsScreenState {
                    selected_article: Some(article),
                    ..state
                },
                NewsScreenEvent::CategoryChanged(category) => NewsScreenState { category, ..state },
                NewsScreenEvent::SearchQueryChanged(search_query) => NewsScreenState {
                    search_query,
                    ..state
                },
                NewsScreenEvent::SearchIconClicked => NewsScreenState {
                    is_search_bar_visible: true,
                    articles: Vec::new(),
                    ..state
                },
                NewsScreenEvent::CloseIconClicked => NewsScreenState {
                    is_search_bar_visible: false,
                    ..state
                },
            },
            NewsUpdate::Articles(resource) => match resource {
                Resource::Loading => NewsScreenState {
                    is_loading: true,
                    ..state
                },
                Resource::Success(articles) => NewsScreenState {
                    articles,
                    is_loading: false,
                    error: None,
                    ..state
                },
                failed => NewsScreenState {
                    error: failed.error_message(),
                    is_loading: false,
                    articles: Vec::new(),
                    ..state
                },
            },
        }
    }
}

pub struct NewsViewModel {
    store: Store<NewsReducer>,
    headlines: GetTopHeadlines,
    search: SearchNews,
    debounce: Duration,
    search_task: Mutex<Option<JoinHandle<()>>>,
}

impl NewsViewModel {
    pub fn new(headlines: GetTopHeadlines, search: SearchNews) -> Self {
        Self {
            store: Store::default(),
            headlines,
            search,
            debounce: DEFAULT_SEARCH_DEBOUNCE,
            search_task: Mutex::new(None),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn state(&self) -> NewsScreenState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<NewsScreenState> {
        self.store.subscribe()
    }

    /// Headlines for whatever category is selected
    pub fn refresh(&self) -> JoinHandle<()> {
        self.fetch_headlines(self.store.state().category)
    }

    /// Must be called from within a Tokio runtime. Returns the spawned fetch,
    /// if the event started one.
    pub fn on_event(&self, event: NewsScreenEvent) -> Option<JoinHandle<()>> {
        self.store.dispatch(NewsUpdate::Event(event.clone()));

        match event {
            NewsScreenEvent::CategoryChanged(category) => Some(self.fetch_headlines(category)),
            NewsScreenEvent::CloseIconClicked => {
                self.cancel_pending_search();
                Some(self.refresh())
            }
            NewsScreenEvent::SearchQueryChanged(query) => {
                self.schedule_search(query);
                None
            }
            NewsScreenEvent::NewsCardClicked(_) | NewsScreenEvent::SearchIconClicked => None,
        }
    }

    fn fetch_headlines(&self, category: NewsCategory) -> JoinHandle<()> {
        let store = self.store.clone();
        let stream = self.headlines.stream(category.label().to_lowercase());
        tokio::spawn(async move { store.drive(stream, NewsUpdate::Articles).await })
    }

    /// A search still waiting out its debounce must not land after the bar closed
    fn cancel_pending_search(&self) {
        let mut slot = self
            .search_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pending) = slot.take() {
            pending.abort();
        }
    }

    fn schedule_search(&self, query: String) {
        let mut slot = self
            .search_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(pending) = slot.take() {
            pending.abort();
        }

        if query.trim().is_empty() {
            return;
        }

        let store = self.store.clone();
        let search = self.search.clone();
        let debounce = self.debounce;
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!("Searching news for {:?}", query);
            store.drive(search.stream(query), NewsUpdate::Articles).await;
        }));
    }
}

impl Drop for NewsViewModel {
    fn drop(&mut self) {
        let slot = self
            .search_task
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(pending) = slot.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockNewsRepository;
    use crate::ErrorKind;
    use marquee_api::news::ArticleSource;
    use std::sync::Arc;

    fn article(title: &str) -> Article {
        Article {
            source: ArticleSource {
                id: None,
                name: "Wire".into(),
            },
            author: None,
            title: title.into(),
            description: None,
            url: format!("https://news.example/{}", title),
            url_to_image: None,
            published_at: Some("2026-10-19T08:30:00Z".into()),
            content: None,
        }
    }

    fn view_model(repo: MockNewsRepository) -> NewsViewModel {
        let repo = Arc::new(repo);
        NewsViewModel::new(GetTopHeadlines::new(repo.clone()), SearchNews::new(repo))
            .with_debounce(Duration::from_millis(30))
    }

    #[test]
    fn test_default_state() {
        let state = NewsScreenState::default();
        assert_eq!(state.category, NewsCategory::General);
        assert_eq!(state.category.to_string(), "General");
        assert!(!state.is_loading);
        assert!(state.search_query.is_empty());
    }

    #[test]
    fn test_category_cycle_and_parse() {
        assert_eq!(NewsCategory::General.previous(), NewsCategory::Entertainment);
        assert_eq!(NewsCategory::Entertainment.next(), NewsCategory::General);
        assert_eq!("sports".parse::<NewsCategory>(), Ok(NewsCategory::Sports));
        assert!("weather".parse::<NewsCategory>().is_err());
    }

    #[test]
    fn test_search_icon_clears_articles() {
        let state = NewsScreenState {
            articles: vec![article("a")],
            ..Default::default()
        };
        let state = NewsReducer::reduce(
            state,
            NewsUpdate::Event(NewsScreenEvent::SearchIconClicked),
        );
        assert!(state.is_search_bar_visible);
        assert!(state.articles.is_empty());
    }

    #[test]
    fn test_result_reduction() {
        let loading = NewsReducer::reduce(
            NewsScreenState {
                error: Some("old".into()),
                ..Default::default()
            },
            NewsUpdate::Articles(Resource::Loading),
        );
        assert!(loading.is_loading);

        let loaded = NewsReducer::reduce(
            loading,
            NewsUpdate::Articles(Resource::Success(vec![article("a")])),
        );
        assert!(!loaded.is_loading);
        assert_eq!(loaded.error, None);
        assert_eq!(loaded.articles.len(), 1);

        let failed = NewsReducer::reduce(
            loaded,
            NewsUpdate::Articles(Resource::error(ErrorKind::Network, "offline")),
        );
        assert_eq!(failed.error.as_deref(), Some("offline"));
        assert!(failed.articles.is_empty());
        assert!(!failed.is_loading);
    }

    #[tokio::test]
    async fn test_category_change_fetches_lowercase_category() {
        let mut repo = MockNewsRepository::new();
        repo.expect_top_headlines()
            .withf(|category| category == "technology")
            .times(1)
            .returning(|_| Resource::Success(vec![article("chips")]));

        let vm = view_model(repo);
        let task = vm
            .on_event(NewsScreenEvent::CategoryChanged(NewsCategory::Technology))
            .unwrap();
        task.await.unwrap();

        let state = vm.state();
        assert_eq!(state.category, NewsCategory::Technology);
        assert_eq!(state.articles, vec![article("chips")]);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_close_search_refetches_current_category() {
        let mut repo = MockNewsRepository::new();
        repo.expect_top_headlines()
            .withf(|category| category == "general")
            .times(1)
            .returning(|_| Resource::Success(Vec::new()));

        let vm = view_model(repo);
        vm.on_event(NewsScreenEvent::SearchIconClicked);
        let task = vm.on_event(NewsScreenEvent::CloseIconClicked).unwrap();
        task.await.unwrap();

        assert!(!vm.state().is_search_bar_visible);
    }

    #[tokio::test]
    async fn test_typing_only_searches_the_last_query() {
        let mut repo = MockNewsRepository::new();
        repo.expect_search_news()
            .withf(|query| query == "rust")
            .times(1)
            .returning(|_| Resource::Success(vec![article("rust")]));

        let vm = view_model(repo);
        vm.on_event(NewsScreenEvent::SearchQueryChanged("r".into()));
        vm.on_event(NewsScreenEvent::SearchQueryChanged("ru".into()));
        vm.on_event(NewsScreenEvent::SearchQueryChanged("rust".into()));

        tokio::time::sleep(Duration::from_millis(200)).await;

        let state = vm.state();
        assert_eq!(state.search_query, "rust");
        assert_eq!(state.articles, vec![article("rust")]);
    }

    #[tokio::test]
    async fn test_blank_query_cancels_pending_search() {
        let mut repo = MockNewsRepository::new();
        repo.expect_search_news().never();

        let vm = view_model(repo);
        vm.on_event(NewsScreenEvent::SearchQueryChanged("rust".into()));
        vm.on_event(NewsScreenEvent::SearchQueryChanged("   ".into()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(vm.state().search_query, "   ");
    }

    #[tokio::test]
    async fn test_close_search_cancels_pending_search() {
        let mut repo = MockNewsRepository::new();
        repo.expect_search_news().never();
        repo.expect_top_headlines()
            .withf(|category| category == "general")
            .times(1)
            .returning(|_| Resource::Success(vec![article("headline")]));

        let vm = view_model(repo);
        vm.on_event(NewsScreenEvent::SearchIconClicked);
        vm.on_event(NewsScreenEvent::SearchQueryChanged("rust".into()));
        let task = vm.on_event(NewsScreenEvent::CloseIconClicked).unwrap();
        task.await.unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let state = vm.state();
        assert!(!state.is_search_bar_visible);
        assert_eq!(state.articles, vec![article("headline")]);
    }
}
