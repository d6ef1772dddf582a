use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{ArticleId, CommentId};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Comment not found {0:?}")]
    CommentNotFound(CommentId),

    #[error("Article not found {0:?}")]
    ArticleNotFound(ArticleId),

    #[error("Invalid ID format {0:?}")]
    InvalidId(String),

    #[error("Comment {0:?} cannot reply to itself")]
    SelfReply(CommentId),

    #[error("Uuid already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Article title cannot be empty")]
    EmptyTitle,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::CommentNotFound(_) => StatusCode::NOT_FOUND,
            Error::ArticleNotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidId(_) => StatusCode::BAD_REQUEST,
            Error::SelfReply(_) => StatusCode::BAD_REQUEST,
            Error::UuidAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::EmptyTitle => StatusCode::BAD_REQUEST,
            Error::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "error": msg,
                "type": "unknown",
            }),
            Error::CommentNotFound(id) => json!({
                "error": "Message not found",
                "type": "comment-not-found",
                "id": id.0,
            }),
            Error::ArticleNotFound(id) => json!({
                "error": "Article not found",
                "type": "article-not-found",
                "id": id.0,
            }),
            Error::InvalidId(s) => json!({
                "error": "Invalid ID format",
                "type": "invalid-id",
                "id": s,
            }),
            Error::SelfReply(id) => json!({
                "error": "a comment cannot reply to itself",
                "type": "self-reply",
                "id": id.0,
            }),
            Error::UuidAlreadyUsed(u) => json!({
                "error": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": u,
            }),
            Error::NullByteInString(s) => json!({
                "error": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::EmptyTitle => json!({
                "error": "article title cannot be empty",
                "type": "empty-title",
            }),
            Error::InvalidBody(msg) => json!({
                "error": msg,
                "type": "invalid-body",
            }),
        })
        .expect("serializing error")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let uuid_field = |field: &str| {
            data.get(field)
                .and_then(|u| u.as_str())
                .and_then(|u| Uuid::from_str(u).ok())
                .ok_or_else(|| anyhow!("error has no proper uuid in field {field:?}"))
        };
        let string_field = |field: &str| {
            data.get(field)
                .and_then(|s| s.as_str())
                .map(String::from)
                .ok_or_else(|| anyhow!("error has no string in field {field:?}"))
        };
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(string_field("error").unwrap_or_default()),
                "comment-not-found" => Error::CommentNotFound(CommentId(uuid_field("id")?)),
                "article-not-found" => Error::ArticleNotFound(ArticleId(uuid_field("id")?)),
                "invalid-id" => Error::InvalidId(string_field("id")?),
                "self-reply" => Error::SelfReply(CommentId(uuid_field("id")?)),
                "conflict-uuid" => Error::UuidAlreadyUsed(uuid_field("uuid")?),
                "null-byte" => Error::NullByteInString(string_field("string")?),
                "empty-title" => Error::EmptyTitle,
                "invalid-body" => Error::InvalidBody(string_field("error")?),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}
