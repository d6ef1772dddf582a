use chrono::{SubsecRound, Utc};

pub use uuid::{uuid, Uuid};
pub type Time = chrono::DateTime<Utc>;

pub const STUB_UUID: Uuid = uuid!("ffffffff-ffff-ffff-ffff-ffffffffffff");

mod article;
pub use article::{
    Article, ArticleFilter, ArticleId, ArticleUpdate, NewArticle, PublishRequest, DEFAULT_CATEGORY,
};

mod comment;
pub use comment::{Comment, CommentId, CommentNode, NewComment, ANONYMOUS_AUTHOR};

mod db;
pub use db::Db;

mod error;
pub use error::Error;

mod forest;
pub use forest::{build_forest, MAX_DEPTH};

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ListMessages {
    #[serde(rename = "articleId")]
    pub article_id: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn new() -> Success {
        Success { success: true }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Liked {
    pub success: bool,
    pub likes: u64,
}

/// Current time, at the precision the database keeps
pub fn now() -> Time {
    Utc::now().trunc_subsecs(6)
}

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

pub fn parse_uuid(s: &str) -> Result<Uuid, Error> {
    Uuid::try_parse(s).map_err(|_| Error::InvalidId(String::from(s)))
}
