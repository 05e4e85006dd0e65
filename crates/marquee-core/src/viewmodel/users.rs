// Users demo screen: every call result lands in the field matching its payload
use marquee_api::media::UploadResponse;
use marquee_api::users::{User, UserProfile};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Reducer, Store, UiState};
use crate::usecase::UserUseCases;
use crate::Resource;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserViewState {
    pub is_loading: bool,
    pub user: Option<User>,
    pub users: Option<Vec<User>>,
    pub user_profile: Option<UserProfile>,
    pub upload_response: Option<UploadResponse>,
    pub error_message: Option<String>,
}

impl UiState for UserViewState {}

#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    GetUserById(i64),
    CreateUser(User),
    RegisterUser(User),
    UpdateUser { id: i64, user: User },
    DeleteUser(i64),
    UploadImage { path: PathBuf, description: String },
    GetUsersByStatus(String),
    GetUsersByFilters(BTreeMap<String, String>),
    GetUserProfile { token: String },
    GetUserProfileWithHeaders(BTreeMap<String, String>),
    GetUsersByUrl(String),
    CreateUserWithFields { name: String, job: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    User(Resource<User>),
    Users(Resource<Vec<User>>),
    Profile(Resource<UserProfile>),
    Upload(Resource<UploadResponse>),
    /// The id that was deleted, and how it went
    Deleted(i64, Resource<()>),
}

pub struct UserReducer;

impl Reducer for UserReducer {
    type State = UserViewState;
    type Update = UserUpdate;

    fn reduce(state: UserViewState, update: UserUpdate) -> UserViewState {
        match update {
            UserUpdate::User(r) => apply(state, r, |s, user| UserViewState {
                user: Some(user),
                ..s
            }),
            UserUpdate::Users(r) => apply(state, r, |s, users| UserViewState {
                users: Some(users),
                ..s
            }),
            UserUpdate::Profile(r) => apply(state, r, |s, profile| UserViewState {
                user_profile: Some(profile),
                ..s
            }),
            UserUpdate::Upload(r) => apply(state, r, |s, upload| UserViewState {
                upload_response: Some(upload),
                ..s
            }),
            UserUpdate::Deleted(id, r) => apply(state, r, |s, ()| UserViewState {
                user: s.user.filter(|u| u.id != id),
                users: s
                    .users
                    .map(|users| users.into_iter().filter(|u| u.id != id).collect()),
                ..s
            }),
        }
    }
}

fn apply<T>(
    state: UserViewState,
    resource: Resource<T>,
    store: impl FnOnce(UserViewState, T) -> UserViewState,
) -> UserViewState {
    match resource {
        Resource::Loading => UserViewState {
            is_loading: true,
            ..state
        },
        Resource::Success(data) => store(
            UserViewState {
                is_loading: false,
                error_message: None,
                ..state
            },
            data,
        ),
        failed => UserViewState {
            is_loading: false,
            error_message: failed.error_message(),
            ..state
        },
    }
}

#[derive(Clone)]
pub struct UserViewModel {
    store: Store<UserReducer>,
    use_cases: UserUseCases,
}

impl UserViewModel {
    pub fn new(use_cases: UserUseCases) -> Self {
        Self {
            store: Store::default(),
            use_cases,
        }
    }

    pub fn state(&self) -> UserViewState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserViewState> {
        self.store.subscribe()
    }

    pub fn spawn_intent_loop(&self) -> (mpsc::UnboundedSender<UserIntent>, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<UserIntent>();
        let vm = self.clone();

        let handle = tokio::spawn(async move {
            while let Some(intent) = rx.recv().await {
                let vm = vm.clone();
                tokio::spawn(async move { vm.handle(intent).await });
            }
            debug!("User intent channel closed");
        });

        (tx, handle)
    }

    pub async fn handle(&self, intent: UserIntent) {
        let uc = &self.use_cases;
        let store = &self.store;

        match intent {
            UserIntent::GetUserById(id) => store.drive(uc.get_user(id), UserUpdate::User).await,
            UserIntent::CreateUser(user) => {
                store.drive(uc.create_user(user), UserUpdate::User).await
            }
            UserIntent::RegisterUser(user) => {
                store.drive(uc.register_user(user), UserUpdate::User).await
            }
            UserIntent::UpdateUser { id, user } => {
                store.drive(uc.update_user(id, user), UserUpdate::User).await
            }
            UserIntent::DeleteUser(id) => {
                store
                    .drive(uc.delete_user(id), |r| UserUpdate::Deleted(id, r))
                    .await
            }
            UserIntent::UploadImage { path, description } => {
                store
                    .drive(uc.upload_image(path, description), UserUpdate::Upload)
                    .await
            }
            UserIntent::GetUsersByStatus(status) => {
                store.drive(uc.users_by_status(status), UserUpdate::Users).await
            }
            UserIntent::GetUsersByFilters(filters) => {
                store.drive(uc.users_by_filters(filters), UserUpdate::Users).await
            }
            UserIntent::GetUserProfile { token } => {
                store.drive(uc.user_profile(token), UserUpdate::Profile).await
            }
            UserIntent::GetUserProfileWithHeaders(headers) => {
                store
                    .drive(uc.user_profile_with_headers(headers), UserUpdate::Profile)
                    .await
            }
            UserIntent::GetUsersByUrl(url) => {
                store.drive(uc.users_by_url(url), UserUpdate::Users).await
            }
            UserIntent::CreateUserWithFields { name, job } => {
                store
                    .drive(uc.create_user_with_fields(name, job), UserUpdate::User)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use std::sync::Arc;

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            age: None,
            city: None,
            job: None,
        }
    }

    fn view_model(repo: MockUserRepository) -> UserViewModel {
        UserViewModel::new(UserUseCases::new(Arc::new(repo)))
    }

    #[test]
    fn test_success_clears_error_and_stores_by_type() {
        let state = UserViewState {
            error_message: Some("earlier".into()),
            is_loading: true,
            ..Default::default()
        };

        let state = UserReducer::reduce(
            state,
            UserUpdate::Users(Resource::Success(vec![user(1, "Ada")])),
        );
        assert_eq!(state.users, Some(vec![user(1, "Ada")]));
        assert_eq!(state.error_message, None);
        assert!(!state.is_loading);
        assert_eq!(state.user, None);
    }

    #[test]
    fn test_delete_removes_user_everywhere() {
        let state = UserViewState {
            user: Some(user(2, "Grace")),
            users: Some(vec![user(1, "Ada"), user(2, "Grace")]),
            ..Default::default()
        };

        let state = UserReducer::reduce(state, UserUpdate::Deleted(2, Resource::Success(())));
        assert_eq!(state.user, None);
        assert_eq!(state.users, Some(vec![user(1, "Ada")]));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_user().returning(|_| Resource::ServerError {
            status_code: 404,
            status: "Not Found".into(),
            server_message: "User not found".into(),
        });

        let vm = view_model(repo);
        vm.store.dispatch(UserUpdate::User(Resource::Success(user(1, "Ada"))));
        vm.handle(UserIntent::GetUserById(9)).await;

        let state = vm.state();
        assert_eq!(state.user, Some(user(1, "Ada")));
        assert_eq!(state.error_message.as_deref(), Some("404: User not found"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_form_create_goes_through_intent_loop() {
        let mut repo = MockUserRepository::new();
        repo.expect_create_user_with_fields()
            .withf(|name, job| name == "Neo" && job == "The One")
            .times(1)
            .returning(|name, job| {
                Resource::Success(User {
                    job: Some(job.to_string()),
                    ..user(7, name)
                })
            });

        let vm = view_model(repo);
        let mut rx = vm.subscribe();
        let (tx, _loop) = vm.spawn_intent_loop();
        tx.send(UserIntent::CreateUserWithFields {
            name: "Neo".into(),
            job: "The One".into(),
        })
        .unwrap();

        let state = rx.wait_for(|s| s.user.is_some()).await.unwrap().clone();
        assert_eq!(state.user.and_then(|u| u.job).as_deref(), Some("The One"));
    }
}
