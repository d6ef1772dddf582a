use anyhow::Context;
use axum::{
    extract::State,
    Json,
};
use blog_api::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, Comment, CommentNode, Liked, ListMessages,
    NewArticle, NewComment, PublishRequest, Success,
};

use crate::{extractors::*, Error};

pub async fn list_messages(
    State(db): State<DbHandle>,
    QueryParams(q): QueryParams<ListMessages>,
) -> Result<Json<Vec<CommentNode>>, Error> {
    let article = match q.article_id.as_deref() {
        None | Some("") => return Ok(Json(Vec::new())),
        Some(id) => ArticleId::parse(id)?,
    };
    let comments = db
        .fetch_comments_for(article)
        .await
        .with_context(|| format!("fetching comments for {:?}", article))?;
    Ok(Json(blog_api::build_forest(comments)))
}

pub async fn create_message(
    State(db): State<DbHandle>,
    JsonBody(data): JsonBody<NewComment>,
) -> Result<Json<Comment>, Error> {
    data.validate()?;
    let comment = data.into_comment(blog_api::now());
    if !db.insert_comment(&comment).await? {
        return Err(Error::uuid_already_used(comment.id.0));
    }
    tracing::debug!(id = ?comment.id, article = ?comment.article_id, "created comment");
    Ok(Json(comment))
}

pub async fn delete_message(
    State(db): State<DbHandle>,
    CommentIdParam(id): CommentIdParam,
) -> Result<Json<Success>, Error> {
    match db.delete_comment(id).await? {
        true => Ok(Json(Success::new())),
        false => Err(Error::comment_not_found(id)),
    }
}

pub async fn like_message(
    State(db): State<DbHandle>,
    CommentIdParam(id): CommentIdParam,
) -> Result<Json<Liked>, Error> {
    let likes = db
        .like_comment(id)
        .await?
        .ok_or(Error::comment_not_found(id))?;
    Ok(Json(Liked {
        success: true,
        likes,
    }))
}

pub async fn list_articles(
    State(db): State<DbHandle>,
    QueryParams(filter): QueryParams<ArticleFilter>,
) -> Result<Json<Vec<Article>>, Error> {
    filter.validate()?;
    Ok(Json(
        db.fetch_articles(&filter, true)
            .await
            .context("listing published articles")?,
    ))
}

pub async fn list_all_articles(
    State(db): State<DbHandle>,
    QueryParams(filter): QueryParams<ArticleFilter>,
) -> Result<Json<Vec<Article>>, Error> {
    filter.validate()?;
    Ok(Json(
        db.fetch_articles(&filter, false)
            .await
            .context("listing all articles")?,
    ))
}

pub async fn fetch_article(
    State(db): State<DbHandle>,
    ArticleIdParam(id): ArticleIdParam,
) -> Result<Json<Article>, Error> {
    Ok(Json(
        db.fetch_article(id)
            .await?
            .ok_or(Error::article_not_found(id))?,
    ))
}

pub async fn create_article(
    State(db): State<DbHandle>,
    JsonBody(data): JsonBody<NewArticle>,
) -> Result<Json<Article>, Error> {
    data.validate()?;
    let article = data.into_article(blog_api::now());
    if !db.insert_article(&article).await? {
        return Err(Error::uuid_already_used(article.id.0));
    }
    tracing::info!(id = ?article.id, title = %article.title, "created article");
    Ok(Json(article))
}

pub async fn update_article(
    State(db): State<DbHandle>,
    ArticleIdParam(id): ArticleIdParam,
    JsonBody(data): JsonBody<ArticleUpdate>,
) -> Result<Json<Article>, Error> {
    data.validate()?;
    apply_update(&db, id, &data).await
}

pub async fn publish_article(
    State(db): State<DbHandle>,
    ArticleIdParam(id): ArticleIdParam,
    JsonBody(data): JsonBody<PublishRequest>,
) -> Result<Json<Article>, Error> {
    let update = ArticleUpdate {
        published: Some(data.published),
        ..ArticleUpdate::default()
    };
    apply_update(&db, id, &update).await
}

async fn apply_update(
    db: &DbHandle,
    id: ArticleId,
    update: &ArticleUpdate,
) -> Result<Json<Article>, Error> {
    Ok(Json(
        db.update_article(id, update, blog_api::now())
            .await
            .with_context(|| format!("updating article {:?}", id))?
            .ok_or(Error::article_not_found(id))?,
    ))
}

pub async fn delete_article(
    State(db): State<DbHandle>,
    ArticleIdParam(id): ArticleIdParam,
) -> Result<Json<Success>, Error> {
    match db.delete_article(id).await? {
        true => Ok(Json(Success::new())),
        false => Err(Error::article_not_found(id)),
    }
}
