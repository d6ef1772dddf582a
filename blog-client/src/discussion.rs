use crate::{
    api::{build_forest, ArticleId, Comment, CommentId, CommentNode, NewComment},
    ViewError,
};

/// The comments of one article, as the client displays them.
///
/// Every mutation here mirrors a call the server already acknowledged. The
/// forest is rebuilt from the flat comments each time, so that it stays equal
/// to what a reload would return.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Discussion {
    article: ArticleId,
    comments: Vec<Comment>,
    forest: Vec<CommentNode>,
    reply_target: Option<CommentId>,
}

impl Discussion {
    pub fn new(article: ArticleId) -> Discussion {
        Discussion {
            article,
            comments: Vec::new(),
            forest: Vec::new(),
            reply_target: None,
        }
    }

    pub fn article(&self) -> ArticleId {
        self.article
    }

    pub fn forest(&self) -> &[CommentNode] {
        &self.forest
    }

    /// Total number of comments, replies included
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == *id)
    }

    pub fn load(&mut self, forest: Vec<CommentNode>) {
        self.comments = CommentNode::into_comments(forest);
        self.rebuild();
        if let Some(target) = self.reply_target {
            if self.find(&target).is_none() {
                self.reply_target = None;
            }
        }
    }

    fn rebuild(&mut self) {
        self.forest = build_forest(self.comments.clone());
    }

    pub fn reply_target(&self) -> Option<CommentId> {
        self.reply_target
    }

    /// Picks the comment the next submission answers, `None` for a top-level one
    pub fn reply_to(&mut self, target: Option<CommentId>) -> Result<(), ViewError> {
        if let Some(id) = target {
            if self.find(&id).is_none() {
                return Err(ViewError::UnknownComment(id));
            }
        }
        self.reply_target = target;
        Ok(())
    }

    /// Builds the creation request for the current reply target
    pub fn submission(
        &self,
        content: &str,
        author: Option<String>,
    ) -> Result<NewComment, ViewError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ViewError::EmptyComment);
        }
        Ok(NewComment {
            id: None,
            content: String::from(content),
            article_id: self.article,
            parent_id: self.reply_target,
            author: author.filter(|a| !a.trim().is_empty()),
        })
    }

    /// Records a comment the server just created
    pub fn created(&mut self, comment: Comment) -> Result<(), ViewError> {
        if comment.article_id != self.article {
            return Err(ViewError::WrongArticle {
                expected: self.article,
                got: comment.article_id,
            });
        }
        if comment.parent_id.is_some() && comment.parent_id == self.reply_target {
            self.reply_target = None;
        }
        self.comments.push(comment);
        self.rebuild();
        Ok(())
    }

    /// Records a deletion. The replies of the deleted comment stay, now at top level.
    pub fn deleted(&mut self, id: CommentId) -> Result<(), ViewError> {
        let pos = self
            .comments
            .iter()
            .position(|c| c.id == id)
            .ok_or(ViewError::UnknownComment(id))?;
        self.comments.remove(pos);
        self.rebuild();
        if self.reply_target == Some(id) {
            self.reply_target = None;
        }
        Ok(())
    }

    pub fn liked(&mut self, id: CommentId, likes: u64) -> Result<(), ViewError> {
        let comment = self
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(ViewError::UnknownComment(id))?;
        comment.likes = likes;
        let node =
            CommentNode::find_in_mut(&mut self.forest, &id).ok_or(ViewError::UnknownComment(id))?;
        node.comment.likes = likes;
        Ok(())
    }
}
