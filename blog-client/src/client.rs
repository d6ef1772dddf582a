use anyhow::Context;

use crate::{
    api::{
        self, Article, ArticleFilter, ArticleId, ArticleUpdate, Comment, CommentId, CommentNode,
        Liked, ListMessages, NewArticle, NewComment, PublishRequest, Success,
    },
    SaveRequest,
};

/// HTTP bindings to the blog server
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    host: String,
}

impl Client {
    pub fn new(host: String) -> Client {
        Client {
            http: reqwest::Client::new(),
            host: String::from(host.trim_end_matches('/')),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Errors returned by the server come back as an `api::Error` inside the `anyhow::Error`
    async fn send<R>(&self, req: reqwest::RequestBuilder, what: &str) -> anyhow::Result<R>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        let resp = req
            .send()
            .await
            .with_context(|| format!("sending {what} request to {}", self.host))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("reading {what} response"))?;
        if !status.is_success() {
            let err = api::Error::parse(&body)
                .with_context(|| format!("{what} failed with status {status}"))?;
            tracing::debug!(?err, "server refused {what}");
            return Err(anyhow::Error::new(err));
        }
        serde_json::from_slice(&body).with_context(|| format!("parsing {what} response"))
    }

    pub async fn list_messages(&self, article: ArticleId) -> anyhow::Result<Vec<CommentNode>> {
        let query = ListMessages {
            article_id: Some(article.0.to_string()),
        };
        self.send(
            self.http
                .get(format!("{}/messages", self.host))
                .query(&query),
            "list messages",
        )
        .await
    }

    pub async fn create_message(&self, comment: &NewComment) -> anyhow::Result<Comment> {
        self.send(
            self.http
                .post(format!("{}/messages", self.host))
                .json(comment),
            "create message",
        )
        .await
    }

    pub async fn delete_message(&self, id: CommentId) -> anyhow::Result<()> {
        let _: Success = self
            .send(
                self.http
                    .delete(format!("{}/messages/{}", self.host, id.0)),
                "delete message",
            )
            .await?;
        Ok(())
    }

    /// Returns the new like count
    pub async fn like_message(&self, id: CommentId) -> anyhow::Result<u64> {
        let liked: Liked = self
            .send(
                self.http
                    .post(format!("{}/messages/{}/like", self.host, id.0)),
                "like message",
            )
            .await?;
        Ok(liked.likes)
    }

    pub async fn list_articles(&self, category: Option<&str>) -> anyhow::Result<Vec<Article>> {
        self.fetch_articles("api/articles", category).await
    }

    pub async fn list_all_articles(&self, category: Option<&str>) -> anyhow::Result<Vec<Article>> {
        self.fetch_articles("api/articles/all", category).await
    }

    async fn fetch_articles(
        &self,
        path: &str,
        category: Option<&str>,
    ) -> anyhow::Result<Vec<Article>> {
        let filter = ArticleFilter {
            category: category.map(String::from),
        };
        self.send(
            self.http
                .get(format!("{}/{path}", self.host))
                .query(&filter),
            "list articles",
        )
        .await
    }

    pub async fn fetch_article(&self, id: ArticleId) -> anyhow::Result<Article> {
        self.send(
            self.http
                .get(format!("{}/api/articles/{}", self.host, id.0)),
            "fetch article",
        )
        .await
    }

    pub async fn create_article(&self, article: &NewArticle) -> anyhow::Result<Article> {
        self.send(
            self.http
                .post(format!("{}/api/articles", self.host))
                .json(article),
            "create article",
        )
        .await
    }

    pub async fn update_article(
        &self,
        id: ArticleId,
        update: &ArticleUpdate,
    ) -> anyhow::Result<Article> {
        self.send(
            self.http
                .put(format!("{}/api/articles/{}", self.host, id.0))
                .json(update),
            "update article",
        )
        .await
    }

    pub async fn publish_article(&self, id: ArticleId, published: bool) -> anyhow::Result<Article> {
        self.send(
            self.http
                .post(format!("{}/api/articles/{}/publish", self.host, id.0))
                .json(&PublishRequest { published }),
            "publish article",
        )
        .await
    }

    pub async fn delete_article(&self, id: ArticleId) -> anyhow::Result<()> {
        let _: Success = self
            .send(
                self.http
                    .delete(format!("{}/api/articles/{}", self.host, id.0)),
                "delete article",
            )
            .await?;
        Ok(())
    }

    /// Sends what an edit session produced, see `ArticleView::save_request`
    pub async fn save(&self, req: &SaveRequest) -> anyhow::Result<Article> {
        match req {
            SaveRequest::Create(a) => self.create_article(a).await,
            SaveRequest::Update(id, u) => self.update_article(*id, u).await,
        }
    }
}
