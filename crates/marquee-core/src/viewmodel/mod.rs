//! Screen state and the reducers that move it.
//!
//! ```text
//! intent ──→ view-model ──→ use case ──→ Resource stream
//!                                              │
//!   view ←── watch::Receiver ←── Store ←── reducer
//! ```
//!
//! Reducers are pure `(State, Update) -> State` functions. A [`Store`] owns
//! the current state in a `tokio::sync::watch` channel so any number of views
//! can subscribe, and every change goes through the reducer.

use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;

use crate::resource::ResourceStream;
use crate::Resource;

pub mod media;
pub mod news;
pub mod users;

pub use media::{MediaIntent, MediaState, MediaViewModel};
pub use news::{NewsCategory, NewsScreenEvent, NewsScreenState, NewsViewModel};
pub use users::{UserIntent, UserViewModel, UserViewState};

/// Everything a view needs to draw a screen
pub trait UiState: Clone + PartialEq + Default + Send + Sync + 'static {}

pub trait Reducer {
    type State: UiState;

    /// Events and call results, whatever the screen reacts to
    type Update: Send + 'static;

    fn reduce(state: Self::State, update: Self::Update) -> Self::State;
}

/// Current state of one screen, published to subscribers
pub struct Store<R: Reducer> {
    tx: Arc<watch::Sender<R::State>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self::new(R::State::default())
    }
}

impl<R: Reducer> Store<R> {
    pub fn new(initial: R::State) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn dispatch(&self, update: R::Update) {
        self.tx.send_modify(|state| {
            let current = std::mem::take(state);
            *state = R::reduce(current, update);
        });
    }

    pub fn state(&self) -> R::State {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.tx.subscribe()
    }

    /// Feed every emission of a resource stream through the reducer
    pub async fn drive<T>(
        &self,
        mut stream: ResourceStream<'_, T>,
        wrap: impl Fn(Resource<T>) -> R::Update,
    ) {
        while let Some(resource) = stream.next().await {
            self.dispatch(wrap(resource));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::resource_stream;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Counter {
        loading: bool,
        total: u32,
    }

    impl UiState for Counter {}

    struct CounterReducer;

    impl Reducer for CounterReducer {
        type State = Counter;
        type Update = Resource<u32>;

        fn reduce(state: Counter, update: Resource<u32>) -> Counter {
            match update {
                Resource::Loading => Counter {
                    loading: true,
                    ..state
                },
                Resource::Success(n) => Counter {
                    loading: false,
                    total: state.total + n,
                },
                _ => Counter {
                    loading: false,
                    ..state
                },
            }
        }
    }

    #[tokio::test]
    async fn test_drive_reduces_each_emission() {
        let store: Store<CounterReducer> = Store::default();
        let mut rx = store.subscribe();

        store
            .drive(resource_stream(async { Resource::Success(4) }), |r| r)
            .await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(
            *rx.borrow_and_update(),
            Counter {
                loading: false,
                total: 4
            }
        );
    }
}
