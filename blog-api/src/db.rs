use async_trait::async_trait;

use crate::{Article, ArticleFilter, ArticleId, ArticleUpdate, Comment, CommentId, Time};

/// Storage backing the blog API.
///
/// Missing records are reported through `false` / `None`, errors are reserved
/// for the store itself failing.
#[async_trait]
pub trait Db: Send + Sync {
    /// All comments of `article`, oldest first
    async fn fetch_comments_for(&self, article: ArticleId) -> anyhow::Result<Vec<Comment>>;

    /// Returns false if the comment id is already taken
    async fn insert_comment(&self, c: &Comment) -> anyhow::Result<bool>;

    /// Removes this comment only, replies are left in place
    async fn delete_comment(&self, id: CommentId) -> anyhow::Result<bool>;

    /// Returns the new like count
    async fn like_comment(&self, id: CommentId) -> anyhow::Result<Option<u64>>;

    /// Matching articles, newest first
    async fn fetch_articles(
        &self,
        filter: &ArticleFilter,
        published_only: bool,
    ) -> anyhow::Result<Vec<Article>>;

    async fn fetch_article(&self, id: ArticleId) -> anyhow::Result<Option<Article>>;

    /// Returns false if the article id is already taken
    async fn insert_article(&self, a: &Article) -> anyhow::Result<bool>;

    async fn update_article(
        &self,
        id: ArticleId,
        update: &ArticleUpdate,
        now: Time,
    ) -> anyhow::Result<Option<Article>>;

    async fn delete_article(&self, id: ArticleId) -> anyhow::Result<bool>;
}
