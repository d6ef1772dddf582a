use uuid::Uuid;

use crate::{Error, Time, STUB_UUID};

/// Category of the journal entries
pub const DEFAULT_CATEGORY: &str = "日记";

#[derive(
    Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
)]
pub struct ArticleId(pub Uuid);

impl ArticleId {
    pub fn stub() -> ArticleId {
        ArticleId(STUB_UUID)
    }

    pub fn parse(s: &str) -> Result<ArticleId, Error> {
        crate::parse_uuid(s).map(ArticleId)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub published: bool,
    pub created_at: Time,
    pub updated_at: Time,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct NewArticle {
    /// Proposed id, the server picks one if unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ArticleId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl NewArticle {
    pub fn validate(&self) -> Result<(), Error> {
        validate_title(&self.title)?;
        crate::validate_string(&self.content)?;
        if let Some(category) = &self.category {
            crate::validate_string(category)?;
        }
        Ok(())
    }

    pub fn into_article(self, now: Time) -> Article {
        Article {
            id: self.id.unwrap_or_else(|| ArticleId(Uuid::new_v4())),
            title: self.title,
            content: self.content,
            category: self
                .category
                .unwrap_or_else(|| String::from(DEFAULT_CATEGORY)),
            published: self.published,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields left unset are kept as they are
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ArticleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl ArticleUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        for s in [&self.content, &self.category].into_iter().flatten() {
            crate::validate_string(s)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, a: &mut Article, now: Time) {
        if let Some(title) = &self.title {
            a.title = title.clone();
        }
        if let Some(content) = &self.content {
            a.content = content.clone();
        }
        if let Some(category) = &self.category {
            a.category = category.clone();
        }
        if let Some(published) = self.published {
            a.published = published;
        }
        a.updated_at = now;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PublishRequest {
    pub published: bool,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ArticleFilter {
    pub category: Option<String>,
}

impl ArticleFilter {
    pub fn validate(&self) -> Result<(), Error> {
        match &self.category {
            Some(category) => crate::validate_string(category),
            None => Ok(()),
        }
    }

    pub fn matches(&self, a: &Article, published_only: bool) -> bool {
        (!published_only || a.published)
            && self.category.as_ref().map_or(true, |c| *c == a.category)
    }
}

fn validate_title(title: &str) -> Result<(), Error> {
    crate::validate_string(title)?;
    match title.trim().is_empty() {
        true => Err(Error::EmptyTitle),
        false => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_article(title: &str) -> NewArticle {
        NewArticle {
            id: None,
            title: String::from(title),
            content: String::from("# Hello"),
            category: None,
            published: false,
        }
    }

    #[test]
    fn blank_titles_are_rejected() {
        assert_eq!(new_article("   ").validate(), Err(Error::EmptyTitle));
        assert_eq!(new_article("ok").validate(), Ok(()));
        let upd = ArticleUpdate {
            title: Some(String::new()),
            ..ArticleUpdate::default()
        };
        assert_eq!(upd.validate(), Err(Error::EmptyTitle));
        assert_eq!(ArticleUpdate::default().validate(), Ok(()));
    }

    #[test]
    fn defaults_on_creation() {
        let a = new_article("t").into_article(crate::now());
        assert_eq!(a.category, DEFAULT_CATEGORY);
        assert!(!a.published);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn update_only_touches_provided_fields() {
        let created = crate::now();
        let mut a = new_article("t").into_article(created);
        let later = created + chrono::Duration::seconds(5);
        ArticleUpdate {
            content: Some(String::from("new body")),
            published: Some(true),
            ..ArticleUpdate::default()
        }
        .apply_to(&mut a, later);
        assert_eq!(a.title, "t");
        assert_eq!(a.content, "new body");
        assert!(a.published);
        assert_eq!(a.created_at, created);
        assert_eq!(a.updated_at, later);
    }

    #[test]
    fn filter_by_category_and_publication() {
        let mut a = new_article("t").into_article(crate::now());
        let diary = ArticleFilter {
            category: Some(String::from(DEFAULT_CATEGORY)),
        };
        let other = ArticleFilter {
            category: Some(String::from("notes")),
        };
        assert!(diary.matches(&a, false));
        assert!(!diary.matches(&a, true));
        assert!(!other.matches(&a, false));
        a.published = true;
        assert!(ArticleFilter::default().matches(&a, true));
    }
}
