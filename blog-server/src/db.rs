use anyhow::Context;
use async_trait::async_trait;
use blog_api::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, Comment, CommentId, Db, Time, Uuid,
};

use crate::extractors::PgPool;

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    article_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
    likes: i64,
    author: String,
    created_at: Time,
}

impl TryFrom<CommentRow> for Comment {
    type Error = anyhow::Error;

    fn try_from(r: CommentRow) -> anyhow::Result<Comment> {
        Ok(Comment {
            id: CommentId(r.id),
            article_id: ArticleId(r.article_id),
            parent_id: r.parent_id.map(CommentId),
            content: r.content,
            likes: u64::try_from(r.likes)
                .with_context(|| format!("comment {:?} has {} likes", r.id, r.likes))?,
            author: r.author,
            created_at: r.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: Uuid,
    title: String,
    content: String,
    category: String,
    published: bool,
    created_at: Time,
    updated_at: Time,
}

impl From<ArticleRow> for Article {
    fn from(r: ArticleRow) -> Article {
        Article {
            id: ArticleId(r.id),
            title: r.title,
            content: r.content,
            category: r.category,
            published: r.published,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const ARTICLE_FIELDS: &str = "id, title, content, category, published, created_at, updated_at";

pub async fn fetch_comments_for(
    conn: &mut sqlx::PgConnection,
    article: ArticleId,
) -> anyhow::Result<Vec<Comment>> {
    sqlx::query_as::<_, CommentRow>(
        "
            SELECT id, article_id, parent_id, content, likes, author, created_at
                FROM comments
            WHERE article_id = $1
            ORDER BY created_at, seq
        ",
    )
    .bind(article.0)
    .fetch_all(conn)
    .await
    .context("querying comments table")?
    .into_iter()
    .map(Comment::try_from)
    .collect()
}

pub async fn insert_comment(conn: &mut sqlx::PgConnection, c: &Comment) -> anyhow::Result<bool> {
    let likes = i64::try_from(c.likes).context("like count out of range")?;
    let res = sqlx::query(
        "
            INSERT INTO comments (id, article_id, parent_id, content, likes, author, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
        ",
    )
    .bind(c.id.0)
    .bind(c.article_id.0)
    .bind(c.parent_id.map(|p| p.0))
    .bind(&c.content)
    .bind(likes)
    .bind(&c.author)
    .bind(c.created_at)
    .execute(conn)
    .await
    .with_context(|| format!("inserting comment {:?}", c.id))?;
    Ok(res.rows_affected() == 1)
}

pub async fn delete_comment(conn: &mut sqlx::PgConnection, id: CommentId) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id.0)
        .execute(conn)
        .await
        .with_context(|| format!("deleting comment {:?}", id))?;
    Ok(res.rows_affected() == 1)
}

pub async fn like_comment(
    conn: &mut sqlx::PgConnection,
    id: CommentId,
) -> anyhow::Result<Option<u64>> {
    sqlx::query_scalar::<_, i64>("UPDATE comments SET likes = likes + 1 WHERE id = $1 RETURNING likes")
        .bind(id.0)
        .fetch_optional(conn)
        .await
        .with_context(|| format!("liking comment {:?}", id))?
        .map(|likes| u64::try_from(likes).context("like count out of range"))
        .transpose()
}

pub async fn fetch_articles(
    conn: &mut sqlx::PgConnection,
    filter: &ArticleFilter,
    published_only: bool,
) -> anyhow::Result<Vec<Article>> {
    Ok(sqlx::query_as::<_, ArticleRow>(&format!(
        "
            SELECT {ARTICLE_FIELDS}
                FROM articles
            WHERE ($1 OR published)
            AND ($2::VARCHAR IS NULL OR category = $2)
            ORDER BY created_at DESC, seq DESC
        "
    ))
    .bind(!published_only)
    .bind(filter.category.as_deref())
    .fetch_all(conn)
    .await
    .context("querying articles table")?
    .into_iter()
    .map(Article::from)
    .collect())
}

pub async fn fetch_article(
    conn: &mut sqlx::PgConnection,
    id: ArticleId,
) -> anyhow::Result<Option<Article>> {
    Ok(sqlx::query_as::<_, ArticleRow>(&format!(
        "SELECT {ARTICLE_FIELDS} FROM articles WHERE id = $1"
    ))
    .bind(id.0)
    .fetch_optional(conn)
    .await
    .with_context(|| format!("fetching article {:?}", id))?
    .map(Article::from))
}

pub async fn insert_article(conn: &mut sqlx::PgConnection, a: &Article) -> anyhow::Result<bool> {
    let res = sqlx::query(&format!(
        "
            INSERT INTO articles ({ARTICLE_FIELDS})
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
        "
    ))
    .bind(a.id.0)
    .bind(&a.title)
    .bind(&a.content)
    .bind(&a.category)
    .bind(a.published)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(conn)
    .await
    .with_context(|| format!("inserting article {:?}", a.id))?;
    Ok(res.rows_affected() == 1)
}

pub async fn update_article(
    conn: &mut sqlx::PgConnection,
    id: ArticleId,
    update: &ArticleUpdate,
    now: Time,
) -> anyhow::Result<Option<Article>> {
    Ok(sqlx::query_as::<_, ArticleRow>(&format!(
        "
            UPDATE articles SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                category = COALESCE($4, category),
                published = COALESCE($5, published),
                updated_at = $6
            WHERE id = $1
            RETURNING {ARTICLE_FIELDS}
        "
    ))
    .bind(id.0)
    .bind(update.title.as_deref())
    .bind(update.content.as_deref())
    .bind(update.category.as_deref())
    .bind(update.published)
    .bind(now)
    .fetch_optional(conn)
    .await
    .with_context(|| format!("updating article {:?}", id))?
    .map(Article::from))
}

pub async fn delete_article(conn: &mut sqlx::PgConnection, id: ArticleId) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM articles WHERE id = $1")
        .bind(id.0)
        .execute(conn)
        .await
        .with_context(|| format!("deleting article {:?}", id))?;
    Ok(res.rows_affected() == 1)
}

#[async_trait]
impl Db for PgPool {
    async fn fetch_comments_for(&self, article: ArticleId) -> anyhow::Result<Vec<Comment>> {
        fetch_comments_for(&mut *self.acquire().await?, article).await
    }

    async fn insert_comment(&self, c: &Comment) -> anyhow::Result<bool> {
        insert_comment(&mut *self.acquire().await?, c).await
    }

    async fn delete_comment(&self, id: CommentId) -> anyhow::Result<bool> {
        delete_comment(&mut *self.acquire().await?, id).await
    }

    async fn like_comment(&self, id: CommentId) -> anyhow::Result<Option<u64>> {
        like_comment(&mut *self.acquire().await?, id).await
    }

    async fn fetch_articles(
        &self,
        filter: &ArticleFilter,
        published_only: bool,
    ) -> anyhow::Result<Vec<Article>> {
        fetch_articles(&mut *self.acquire().await?, filter, published_only).await
    }

    async fn fetch_article(&self, id: ArticleId) -> anyhow::Result<Option<Article>> {
        fetch_article(&mut *self.acquire().await?, id).await
    }

    async fn insert_article(&self, a: &Article) -> anyhow::Result<bool> {
        insert_article(&mut *self.acquire().await?, a).await
    }

    async fn update_article(
        &self,
        id: ArticleId,
        update: &ArticleUpdate,
        now: Time,
    ) -> anyhow::Result<Option<Article>> {
        update_article(&mut *self.acquire().await?, id, update, now).await
    }

    async fn delete_article(&self, id: ArticleId) -> anyhow::Result<bool> {
        delete_article(&mut *self.acquire().await?, id).await
    }
}
