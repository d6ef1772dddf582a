use uuid::Uuid;

use crate::{ArticleId, Error, Time, STUB_UUID};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct CommentId(pub Uuid);

impl CommentId {
    pub fn stub() -> CommentId {
        CommentId(STUB_UUID)
    }

    pub fn parse(s: &str) -> Result<CommentId, Error> {
        crate::parse_uuid(s).map(CommentId)
    }
}

/// A comment as it is stored: replies only know their parent
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub article_id: ArticleId,
    pub parent_id: Option<CommentId>,
    pub content: String,
    pub likes: u64,
    pub author: String,
    pub created_at: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    /// Proposed id, the server picks one if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CommentId>,
    pub content: String,
    pub article_id: ArticleId,
    #[serde(default)]
    pub parent_id: Option<CommentId>,
    #[serde(default, rename = "username", alias = "author")]
    pub author: Option<String>,
}

impl NewComment {
    pub fn top_level(article_id: ArticleId, content: String) -> NewComment {
        NewComment {
            id: None,
            content,
            article_id,
            parent_id: None,
            author: None,
        }
    }

    pub fn reply(article_id: ArticleId, parent_id: CommentId, content: String) -> NewComment {
        NewComment {
            parent_id: Some(parent_id),
            ..NewComment::top_level(article_id, content)
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.content)?;
        if let Some(author) = &self.author {
            crate::validate_string(author)?;
        }
        if let (Some(id), Some(parent)) = (self.id, self.parent_id) {
            if id == parent {
                return Err(Error::SelfReply(id));
            }
        }
        Ok(())
    }

    /// Builds the record to store, filling in the server-side fields
    pub fn into_comment(self, created_at: Time) -> Comment {
        Comment {
            id: self.id.unwrap_or_else(|| CommentId(Uuid::new_v4())),
            article_id: self.article_id,
            parent_id: self.parent_id,
            content: self.content,
            likes: 0,
            author: self
                .author
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| String::from(ANONYMOUS_AUTHOR)),
            created_at,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,

    /// Direct replies, in chronological order
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn leaf(comment: Comment) -> CommentNode {
        CommentNode {
            comment,
            replies: Vec::new(),
        }
    }

    /// Number of comments in this subtree, including self
    pub fn count(&self) -> usize {
        let mut res = 0;
        let mut stack = vec![self];
        while let Some(n) = stack.pop() {
            res += 1;
            stack.extend(n.replies.iter());
        }
        res
    }

    /// The flat comments of a forest, in no particular order
    pub fn into_comments(forest: Vec<CommentNode>) -> Vec<Comment> {
        let mut res = Vec::new();
        let mut stack = forest;
        while let Some(n) = stack.pop() {
            res.push(n.comment);
            stack.extend(n.replies);
        }
        res
    }

    pub fn find_in<'a>(forest: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
        for n in forest {
            if n.comment.id == *id {
                return Some(n);
            }
            if let Some(res) = CommentNode::find_in(&n.replies, id) {
                return Some(res);
            }
        }
        None
    }

    pub fn find_in_mut<'a>(
        forest: &'a mut [CommentNode],
        id: &CommentId,
    ) -> Option<&'a mut CommentNode> {
        for n in forest.iter_mut() {
            if n.comment.id == *id {
                return Some(n);
            }
            if let Some(res) = CommentNode::find_in_mut(&mut n.replies, id) {
                return Some(res);
            }
        }
        None
    }
}
