use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use blog_mock_server::MockServer;
use std::net::SocketAddr;
use structopt::StructOpt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod db;
mod error;
mod extractors;
mod handlers;

#[cfg(test)]
mod fuzz;

use error::Error;
use extractors::*;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(Debug, structopt::StructOpt)]
#[structopt(about = "Blog and threaded comments server")]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,

    /// PostgreSQL connection string
    #[structopt(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Keep everything in memory instead of connecting to PostgreSQL
    #[structopt(long)]
    in_memory: bool,
}

pub async fn create_sqlx_pool(db_url: &str) -> anyhow::Result<PgPool> {
    Ok(PgPool::new(
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(8)
            .connect(db_url)
            .await
            .with_context(|| format!("Error opening database {:?}", db_url))?,
    ))
}

pub fn app(db: DbHandle) -> Router {
    Router::new()
        .route(
            "/messages",
            get(handlers::list_messages).post(handlers::create_message),
        )
        .route("/messages/:id", axum::routing::delete(handlers::delete_message))
        .route("/messages/:id/like", post(handlers::like_message))
        .route(
            "/api/articles",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route("/api/articles/all", get(handlers::list_all_articles))
        .route(
            "/api/articles/:id",
            get(handlers::fetch_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route("/api/articles/:id/publish", post(handlers::publish_article))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { db })
}

async fn open_store(opt: &Opt) -> anyhow::Result<DbHandle> {
    if opt.in_memory {
        tracing::warn!("using the in-memory store, nothing will survive a restart");
        return Ok(DbHandle::new(MockServer::new()));
    }
    let db_url = opt
        .database_url
        .as_deref()
        .context("either --database-url (or DATABASE_URL) or --in-memory must be set")?;
    let pool = create_sqlx_pool(db_url).await?;
    MIGRATOR
        .run(&mut *pool.acquire().await?)
        .await
        .context("running pending migrations")?;
    tracing::info!("database migrations applied");
    Ok(DbHandle::new(pool))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed listening for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let opt = Opt::from_args();

    let db = open_store(&opt).await?;
    let app = app(db);

    tracing::info!("listening on {}", opt.listen);
    axum::Server::bind(&opt.listen)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum webserver")
}
