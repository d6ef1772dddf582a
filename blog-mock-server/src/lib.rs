use std::cmp::Reverse;

use async_trait::async_trait;
use blog_api::{Article, ArticleFilter, ArticleId, ArticleUpdate, Comment, CommentId, Db, Time};
use tokio::sync::RwLock;

/// In-memory store with the same semantics as the Postgres one
#[derive(Debug, Default)]
pub struct MockServer(RwLock<Tables>);

#[derive(Debug, Default)]
struct Tables {
    // insertion order breaks ties between equal timestamps
    articles: Vec<Article>,
    comments: Vec<Comment>,
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer::default()
    }

    /// Return the current number of stored comments
    pub async fn test_num_comments(&self) -> usize {
        self.0.read().await.comments.len()
    }

    /// Return the id of stored comment number `idx`, in insertion order
    pub async fn test_comment_id(&self, idx: usize) -> Option<CommentId> {
        self.0.read().await.comments.get(idx).map(|c| c.id)
    }
}

#[async_trait]
impl Db for MockServer {
    async fn fetch_comments_for(&self, article: ArticleId) -> anyhow::Result<Vec<Comment>> {
        let mut res = self
            .0
            .read()
            .await
            .comments
            .iter()
            .filter(|c| c.article_id == article)
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by_key(|c| c.created_at);
        Ok(res)
    }

    async fn insert_comment(&self, c: &Comment) -> anyhow::Result<bool> {
        let mut tables = self.0.write().await;
        if tables.comments.iter().any(|o| o.id == c.id) {
            return Ok(false);
        }
        tables.comments.push(c.clone());
        Ok(true)
    }

    async fn delete_comment(&self, id: CommentId) -> anyhow::Result<bool> {
        let mut tables = self.0.write().await;
        let len_before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != len_before)
    }

    async fn like_comment(&self, id: CommentId) -> anyhow::Result<Option<u64>> {
        Ok(self
            .0
            .write()
            .await
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.likes += 1;
                c.likes
            }))
    }

    async fn fetch_articles(
        &self,
        filter: &ArticleFilter,
        published_only: bool,
    ) -> anyhow::Result<Vec<Article>> {
        let mut res = self
            .0
            .read()
            .await
            .articles
            .iter()
            .rev()
            .filter(|a| filter.matches(a, published_only))
            .cloned()
            .collect::<Vec<_>>();
        res.sort_by_key(|a| Reverse(a.created_at));
        Ok(res)
    }

    async fn fetch_article(&self, id: ArticleId) -> anyhow::Result<Option<Article>> {
        Ok(self
            .0
            .read()
            .await
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn insert_article(&self, a: &Article) -> anyhow::Result<bool> {
        let mut tables = self.0.write().await;
        if tables.articles.iter().any(|o| o.id == a.id) {
            return Ok(false);
        }
        tables.articles.push(a.clone());
        Ok(true)
    }

    async fn update_article(
        &self,
        id: ArticleId,
        update: &ArticleUpdate,
        now: Time,
    ) -> anyhow::Result<Option<Article>> {
        Ok(self
            .0
            .write()
            .await
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .map(|a| {
                update.apply_to(a, now);
                a.clone()
            }))
    }

    async fn delete_article(&self, id: ArticleId) -> anyhow::Result<bool> {
        let mut tables = self.0.write().await;
        let len_before = tables.articles.len();
        tables.articles.retain(|a| a.id != id);
        Ok(tables.articles.len() != len_before)
    }
}
