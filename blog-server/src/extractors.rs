use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query,
    },
    http::{self, request},
    Json,
};
use blog_api::{ArticleId, CommentId, Db};

use crate::Error;

#[derive(Clone, axum::extract::FromRef)]
pub struct AppState {
    pub db: DbHandle,
}

/// The store selected at startup, shared by every request
#[derive(Clone)]
pub struct DbHandle(Arc<dyn Db>);

impl DbHandle {
    pub fn new<D: 'static + Db>(db: D) -> DbHandle {
        DbHandle(Arc::new(db))
    }
}

impl Deref for DbHandle {
    type Target = dyn Db;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[derive(Clone)]
pub struct PgPool(sqlx::PgPool);

impl PgPool {
    pub fn new(pool: sqlx::PgPool) -> PgPool {
        PgPool(pool)
    }

    pub async fn acquire(&self) -> anyhow::Result<PgConn> {
        Ok(PgConn(
            self.0.acquire().await.context("acquiring db connection")?,
        ))
    }

    #[cfg(test)]
    pub fn num_idle(&self) -> usize {
        self.0.num_idle()
    }
}

pub struct PgConn(sqlx::pool::PoolConnection<sqlx::Postgres>);

impl Deref for PgConn {
    type Target = sqlx::PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PgConn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

macro_rules! id_param {
    ($name:ident, $id:ty) => {
        /// `:id` path segment, rejected with a 400 unless it is a uuid
        pub struct $name(pub $id);

        #[async_trait]
        impl<S: Send + Sync> FromRequestParts<S> for $name {
            type Rejection = Error;

            async fn from_request_parts(
                req: &mut request::Parts,
                state: &S,
            ) -> Result<$name, Error> {
                let Path(id) = Path::<String>::from_request_parts(req, state)
                    .await
                    .map_err(|_| Error::invalid_id(req.uri.path().to_string()))?;
                Ok($name(<$id>::parse(&id)?))
            }
        }
    };
}

id_param!(CommentIdParam, CommentId);
id_param!(ArticleIdParam, ArticleId);

/// Json body whose rejections use the API error format
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, B, T> FromRequest<S, B> for JsonBody<T>
where
    Json<T>: FromRequest<S, B, Rejection = JsonRejection>,
    S: Send + Sync,
    B: Send + 'static,
{
    type Rejection = Error;

    async fn from_request(req: http::Request<B>, state: &S) -> Result<JsonBody<T>, Error> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(data)) => Ok(JsonBody(data)),
            Err(rejection) => Err(Error::invalid_body(rejection.body_text())),
        }
    }
}

/// Query string whose rejections use the API error format
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
    T: Send,
{
    type Rejection = Error;

    async fn from_request_parts(
        req: &mut request::Parts,
        state: &S,
    ) -> Result<QueryParams<T>, Error> {
        match Query::<T>::from_request_parts(req, state).await {
            Ok(Query(data)) => Ok(QueryParams(data)),
            Err(rejection) => Err(Error::invalid_body(rejection.body_text())),
        }
    }
}
