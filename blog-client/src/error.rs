use crate::api::{ArticleId, CommentId};

/// A transition the client views refused to make
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum ViewError {
    #[error("an edit session is already open")]
    AlreadyEditing,

    #[error("no edit session is open")]
    NotEditing,

    #[error("no article is loaded")]
    NoArticle,

    #[error("article title cannot be empty")]
    EmptyTitle,

    #[error("comment cannot be empty")]
    EmptyComment,

    #[error("expected article {expected:?} but got {got:?}")]
    WrongArticle { expected: ArticleId, got: ArticleId },

    #[error("comment {0:?} is not part of this discussion")]
    UnknownComment(CommentId),
}
