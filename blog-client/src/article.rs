use crate::{
    api::{Article, ArticleId, ArticleUpdate, NewArticle},
    ViewError,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub category: String,
    pub published: bool,
}

impl From<&Article> for Draft {
    fn from(a: &Article) -> Draft {
        Draft {
            title: a.title.clone(),
            content: a.content.clone(),
            category: a.category.clone(),
            published: a.published,
        }
    }
}

/// The editor state of one editing pass, dropped when the pass ends
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EditSession {
    /// `None` while writing a new article
    target: Option<ArticleId>,
    draft: Draft,
}

impl EditSession {
    pub fn target(&self) -> Option<ArticleId> {
        self.target
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn set_title(&mut self, title: String) {
        self.draft.title = title;
    }

    pub fn set_content(&mut self, content: String) {
        self.draft.content = content;
    }

    pub fn set_category(&mut self, category: String) {
        self.draft.category = category;
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ViewState {
    Browsing,
    Editing(EditSession),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaveRequest {
    Create(NewArticle),
    Update(ArticleId, ArticleUpdate),
}

/// Displays one article and drives its editing
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArticleView {
    article: Option<Article>,
    state: ViewState,
}

impl Default for ArticleView {
    fn default() -> ArticleView {
        ArticleView::new()
    }
}

impl ArticleView {
    pub fn new() -> ArticleView {
        ArticleView {
            article: None,
            state: ViewState::Browsing,
        }
    }

    pub fn article(&self) -> Option<&Article> {
        self.article.as_ref()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn session(&self) -> Option<&EditSession> {
        match &self.state {
            ViewState::Browsing => None,
            ViewState::Editing(s) => Some(s),
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut EditSession> {
        match &mut self.state {
            ViewState::Browsing => None,
            ViewState::Editing(s) => Some(s),
        }
    }

    /// Shows an article fetched from the server. Refused while a draft is open.
    pub fn loaded(&mut self, article: Article) -> Result<(), ViewError> {
        if let ViewState::Editing(_) = self.state {
            return Err(ViewError::AlreadyEditing);
        }
        self.article = Some(article);
        Ok(())
    }

    pub fn begin_edit(&mut self) -> Result<&mut EditSession, ViewError> {
        let article = self.article.as_ref().ok_or(ViewError::NoArticle)?;
        let session = EditSession {
            target: Some(article.id),
            draft: Draft::from(article),
        };
        self.open(session)
    }

    pub fn begin_new(&mut self, category: &str) -> Result<&mut EditSession, ViewError> {
        let session = EditSession {
            target: None,
            draft: Draft {
                title: String::new(),
                content: String::new(),
                category: String::from(category),
                published: false,
            },
        };
        self.open(session)
    }

    fn open(&mut self, session: EditSession) -> Result<&mut EditSession, ViewError> {
        if let ViewState::Editing(_) = self.state {
            return Err(ViewError::AlreadyEditing);
        }
        tracing::debug!(article = ?session.target, "opening edit session");
        self.state = ViewState::Editing(session);
        self.session_mut().ok_or(ViewError::NotEditing)
    }

    /// What to send to the server to save the open draft
    pub fn save_request(&self) -> Result<SaveRequest, ViewError> {
        let session = self.session().ok_or(ViewError::NotEditing)?;
        let draft = &session.draft;
        if draft.title.trim().is_empty() {
            return Err(ViewError::EmptyTitle);
        }
        Ok(match session.target {
            None => SaveRequest::Create(NewArticle {
                id: None,
                title: draft.title.clone(),
                content: draft.content.clone(),
                category: Some(draft.category.clone()),
                published: draft.published,
            }),
            Some(id) => SaveRequest::Update(
                id,
                ArticleUpdate {
                    title: Some(draft.title.clone()),
                    content: Some(draft.content.clone()),
                    category: Some(draft.category.clone()),
                    published: None,
                },
            ),
        })
    }

    /// The server stored the draft, show the result and close the session
    pub fn saved(&mut self, article: Article) -> Result<(), ViewError> {
        let session = self.session().ok_or(ViewError::NotEditing)?;
        if let Some(expected) = session.target {
            if expected != article.id {
                return Err(ViewError::WrongArticle {
                    expected,
                    got: article.id,
                });
            }
        }
        self.article = Some(article);
        self.state = ViewState::Browsing;
        Ok(())
    }

    /// Drops the draft, the last loaded article is shown again
    pub fn cancel(&mut self) -> Result<(), ViewError> {
        match self.state {
            ViewState::Browsing => Err(ViewError::NotEditing),
            ViewState::Editing(_) => {
                self.state = ViewState::Browsing;
                Ok(())
            }
        }
    }

    /// The server changed the publication flag of the shown article
    pub fn published(&mut self, id: ArticleId, published: bool) -> Result<(), ViewError> {
        let article = self.article.as_mut().ok_or(ViewError::NoArticle)?;
        if article.id != id {
            return Err(ViewError::WrongArticle {
                expected: article.id,
                got: id,
            });
        }
        article.published = published;
        if let ViewState::Editing(session) = &mut self.state {
            if session.target == Some(id) {
                session.draft.published = published;
            }
        }
        Ok(())
    }
}
