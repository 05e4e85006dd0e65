// Users demo repository - bridges UsersClient with UserRepository
use async_trait::async_trait;
use marquee_api::users::{User, UserProfile, UsersClient};
use marquee_api::UploadResponse;
use std::collections::BTreeMap;
use std::path::Path;

use super::{boxed, UserRepository};
use crate::Resource;

pub struct RestUserRepository {
    client: UsersClient,
}

impl RestUserRepository {
    pub fn new(client: UsersClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserRepository for RestUserRepository {
    async fn get_user(&self, id: i64) -> Resource<User> {
        boxed("fetch user", self.client.get_user(id).await)
    }

    async fn create_user(&self, user: User) -> Resource<User> {
        boxed("create user", self.client.create_user(&user).await)
    }

    async fn register_user(&self, user: User) -> Resource<User> {
        boxed("register user", self.client.register_user(&user).await)
    }

    async fn update_user(&self, id: i64, user: User) -> Resource<User> {
        boxed("update user", self.client.update_user(id, &user).await)
    }

    async fn delete_user(&self, id: i64) -> Resource<()> {
        boxed("delete user", self.client.delete_user(id).await)
    }

    async fn users_by_status(&self, status: &str) -> Resource<Vec<User>> {
        boxed(
            "fetch users by status",
            self.client.users_by_status(status).await,
        )
    }

    async fn users_by_filters(&self, filters: BTreeMap<String, String>) -> Resource<Vec<User>> {
        boxed(
            "fetch users by filters",
            self.client.users_by_filters(&filters).await,
        )
    }

    async fn users_by_url(&self, url: &str) -> Resource<Vec<User>> {
        boxed("fetch users by url", self.client.users_by_url(url).await)
    }

    async fn create_user_with_fields(&self, name: &str, job: &str) -> Resource<User> {
        boxed(
            "create user from form",
            self.client.create_user_with_fields(name, job).await,
        )
    }

    async fn user_profile(&self, token: &str) -> Resource<UserProfile> {
        boxed("fetch user profile", self.client.user_profile(token).await)
    }

    async fn user_profile_with_headers(
        &self,
        headers: BTreeMap<String, String>,
    ) -> Resource<UserProfile> {
        boxed(
            "fetch user profile",
            self.client.user_profile_with_headers(&headers).await,
        )
    }

    async fn upload_image(&self, path: &Path, description: &str) -> Resource<UploadResponse> {
        boxed(
            "upload image",
            self.client.upload_image(path, description).await,
        )
    }
}
