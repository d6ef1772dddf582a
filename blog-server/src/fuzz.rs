use axum::{http, Router};
use blog_api::{Error as ApiError, Uuid};
use blog_mock_server::MockServer;
use bolero::generator::TypeGenerator;
use serde_json::{json, Value};
use std::{panic::AssertUnwindSafe, path::Path};

use crate::{
    extractors::*,
    tests::{request, run_on_app, send},
    *,
};

macro_rules! do_tokio_test {
    ( $name:ident, $typ:ty, $fn:expr ) => {
        #[test]
        fn $name() {
            let runtime = AssertUnwindSafe(
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed initializing tokio runtime"),
            );
            bolero::check!()
                .with_type::<$typ>()
                .cloned()
                .for_each(move |v| {
                    let () = runtime.block_on($fn(v));
                })
        }
    };
}

fn build_pg_cluster(data: &Path) -> postgresfixture::cluster::Cluster {
    let runtime = postgresfixture::runtime::Runtime::find_on_path()
        .into_iter()
        .filter_map(|r| r.version().ok().map(|v| (v, r)))
        .max_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, r)| r);
    postgresfixture::cluster::Cluster::new(
        data,
        runtime.expect("postgresql seems to not be installed in path"),
    )
}

macro_rules! do_sqlx_test {
    ( $name:ident, $gen:expr, $fn:expr ) => {
        #[test]
        #[ignore = "needs postgresql binaries in PATH"]
        fn $name() {
            if std::env::var("RUST_LOG").is_ok() {
                tracing_subscriber::fmt::init();
            }
            let lockfile = tempfile::tempfile().expect("creating tempfile");
            let datadir = tempfile::tempdir().expect("creating tempdir");
            let datadir_path: &Path = datadir.as_ref();
            let cluster = build_pg_cluster(datadir_path);
            let datadir_path: &str = datadir_path.to_str().expect("tempdir is not valid utf8");
            postgresfixture::coordinate::run_and_destroy(&cluster, lockfile.into(), || {
                cluster
                    .createdb("test_db")
                    .expect("creating test_db database");
                let runtime = AssertUnwindSafe(
                    tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                        .expect("failed initializing tokio runtime"),
                );
                let pool = AssertUnwindSafe(runtime.block_on(async move {
                    let pool = create_sqlx_pool(&format!(
                        "postgresql://?host={}&dbname=test_db",
                        datadir_path
                    ))
                    .await
                    .expect("creating sqlx pool");
                    MIGRATOR
                        .run(&mut *pool.acquire().await.expect("getting migrator connection"))
                        .await
                        .expect("failed applying migrations");
                    pool
                }));
                bolero::check!()
                    .with_generator($gen)
                    .cloned()
                    .for_each(move |v| {
                        let pool = pool.clone();
                        let idle_before = pool.num_idle();
                        let v_str = format!("{v:?}");
                        let idle_after_res: Result<usize, _> = {
                            let pool = pool.clone();
                            std::panic::catch_unwind(AssertUnwindSafe(|| {
                                runtime.block_on(async move {
                                    let () = $fn(pool.clone(), v).await;
                                    let mut idle_after = pool.num_idle();
                                    let wait_release_since = std::time::Instant::now();
                                    while idle_after < idle_before
                                        && wait_release_since.elapsed()
                                            <= std::time::Duration::from_secs(1)
                                    {
                                        tokio::task::yield_now().await;
                                        idle_after = pool.num_idle();
                                    }
                                    idle_after
                                })
                            }))
                        };
                        runtime.block_on(async move {
                            let mut conn =
                                pool.acquire().await.expect("getting db cleanup connection");
                            sqlx::query(include_str!("../reset-test-db.sql"))
                                .execute(&mut *conn)
                                .await
                                .expect("failed cleaning up database");
                        });
                        match idle_after_res {
                            Err(e) => std::panic::resume_unwind(e),
                            Ok(idle_after) => assert!(
                                idle_after >= idle_before,
                                "test {} held onto pool after exiting test: before there were {idle_before} connections, and after there were {idle_after} with value {v_str}",
                                stringify!($name)
                            ),
                        }
                    });
            })
            .expect("coordinating spinup and shutdown of the pg cluster");
        }
    };
}

do_tokio_test!(fuzz_id_in_path, String, |id: String| async move {
    let mut app = app(DbHandle::new(MockServer::new()));
    for uri in [
        format!("/messages/{id}"),
        format!("/messages/{id}/like"),
        format!("/api/articles/{id}"),
    ] {
        let method = match uri.ends_with("/like") {
            true => "POST",
            false => "DELETE",
        };
        // most generated strings are not valid in an uri at all
        let req = match http::Uri::try_from(&uri) {
            Ok(_) => request(method, &uri, None),
            Err(_) => continue,
        };
        let resp = send(&mut app, req).await;
        assert_ne!(
            resp.status(),
            http::StatusCode::INTERNAL_SERVER_ERROR,
            "{uri} crashed the server"
        );
    }
});

const CATEGORIES: [&str; 3] = ["diary", "notes", "travel"];

// a small id space, so that replies, conflicts and deletions actually meet
fn fuzz_uuid(n: u8) -> Uuid {
    Uuid::from_u128(u128::from(n % 16) + 1)
}

fn category(c: u8) -> &'static str {
    CATEGORIES[usize::from(c) % CATEGORIES.len()]
}

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    CreateComment {
        id: u8,
        article: u8,
        parent: Option<u8>,
        content: String,
        author: Option<String>,
    },
    DeleteComment {
        id: u8,
    },
    LikeComment {
        id: u8,
    },
    ListComments {
        article: Option<u8>,
    },
    CreateArticle {
        id: u8,
        title: String,
        category: Option<u8>,
        published: bool,
    },
    UpdateArticle {
        id: u8,
        title: Option<String>,
        content: Option<String>,
        category: Option<u8>,
        published: Option<bool>,
    },
    PublishArticle {
        id: u8,
        published: bool,
    },
    DeleteArticle {
        id: u8,
    },
    FetchArticle {
        id: u8,
    },
    ListArticles {
        all: bool,
        category: Option<u8>,
    },
}

impl FuzzOp {
    fn to_request(&self) -> (&'static str, String, Option<Value>) {
        match self {
            FuzzOp::CreateComment {
                id,
                article,
                parent,
                content,
                author,
            } => (
                "POST",
                String::from("/messages"),
                Some(json!({
                    "id": fuzz_uuid(*id),
                    "articleId": fuzz_uuid(*article),
                    "parentId": parent.map(fuzz_uuid),
                    "content": content,
                    "username": author,
                })),
            ),
            FuzzOp::DeleteComment { id } => {
                ("DELETE", format!("/messages/{}", fuzz_uuid(*id)), None)
            }
            FuzzOp::LikeComment { id } => {
                ("POST", format!("/messages/{}/like", fuzz_uuid(*id)), None)
            }
            FuzzOp::ListComments { article: None } => ("GET", String::from("/messages"), None),
            FuzzOp::ListComments { article: Some(a) } => (
                "GET",
                format!("/messages?articleId={}", fuzz_uuid(*a)),
                None,
            ),
            FuzzOp::CreateArticle {
                id,
                title,
                category: c,
                published,
            } => (
                "POST",
                String::from("/api/articles"),
                Some(json!({
                    "id": fuzz_uuid(*id),
                    "title": title,
                    "content": "# Title\n\nBody",
                    "category": c.map(category),
                    "published": published,
                })),
            ),
            FuzzOp::UpdateArticle {
                id,
                title,
                content,
                category: c,
                published,
            } => (
                "PUT",
                format!("/api/articles/{}", fuzz_uuid(*id)),
                Some(json!({
                    "title": title,
                    "content": content,
                    "category": c.map(category),
                    "published": published,
                })),
            ),
            FuzzOp::PublishArticle { id, published } => (
                "POST",
                format!("/api/articles/{}/publish", fuzz_uuid(*id)),
                Some(json!({ "published": published })),
            ),
            FuzzOp::DeleteArticle { id } => {
                ("DELETE", format!("/api/articles/{}", fuzz_uuid(*id)), None)
            }
            FuzzOp::FetchArticle { id } => {
                ("GET", format!("/api/articles/{}", fuzz_uuid(*id)), None)
            }
            FuzzOp::ListArticles { all, category: c } => {
                let base = match all {
                    true => "/api/articles/all",
                    false => "/api/articles",
                };
                let uri = match c {
                    Some(c) => format!("{base}?category={}", category(*c)),
                    None => String::from(base),
                };
                ("GET", uri, None)
            }
        }
    }
}

/// Timestamps are assigned separately by each store, so they never match
fn strip_times(mut v: Value) -> Value {
    let mut stack = vec![&mut v];
    while let Some(v) = stack.pop() {
        match v {
            Value::Object(o) => {
                o.remove("createdAt");
                o.remove("updatedAt");
                stack.extend(o.values_mut());
            }
            Value::Array(a) => stack.extend(a.iter_mut()),
            _ => (),
        }
    }
    v
}

struct ComparativeFuzzer {
    app: Router,
    mock: Router,
}

impl ComparativeFuzzer {
    fn new(pool: PgPool) -> ComparativeFuzzer {
        ComparativeFuzzer {
            app: app(DbHandle::new(pool)),
            mock: app(DbHandle::new(MockServer::new())),
        }
    }

    async fn execute_fuzz_op(&mut self, op: FuzzOp) {
        let (method, uri, body) = op.to_request();
        let app_res: Result<Value, ApiError> =
            run_on_app(&mut self.app, method, &uri, body.as_ref()).await;
        let mock_res: Result<Value, ApiError> =
            run_on_app(&mut self.mock, method, &uri, body.as_ref()).await;
        assert_eq!(
            app_res.map(strip_times),
            mock_res.map(strip_times),
            "app and mock did not return the same result for {op:?}"
        );
    }
}

do_sqlx_test!(
    compare_with_mock,
    bolero::generator::gen_with::<Vec<FuzzOp>>().len(1..100usize),
    |pool, test: Vec<FuzzOp>| async move {
        let mut fuzzer = ComparativeFuzzer::new(pool);
        for op in test {
            fuzzer.execute_fuzz_op(op).await;
        }
    }
);
