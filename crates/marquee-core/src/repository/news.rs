// NewsAPI repository - bridges NewsClient with NewsRepository
use async_trait::async_trait;
use marquee_api::news::{Article, NewsClient, NewsResponse};

use super::{boxed, NewsRepository};
use crate::Resource;

pub struct NewsApiRepository {
    client: NewsClient,
}

impl NewsApiRepository {
    pub fn new(client: NewsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NewsRepository for NewsApiRepository {
    async fn top_headlines(&self, category: &str) -> Resource<Vec<Article>> {
        boxed("fetch top headlines", self.client.top_headlines(category).await).map(articles)
    }

    async fn search_news(&self, query: &str) -> Resource<Vec<Article>> {
        boxed("search news", self.client.search(query).await).map(articles)
    }
}

/// A 2xx without an `articles` field just means nothing to show
fn articles(response: NewsResponse) -> Vec<Article> {
    response.articles.unwrap_or_default()
}
