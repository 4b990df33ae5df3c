use std::fmt;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// A blog post as seen by the handlers.
///
/// On disk, `content` lives in the markdown body file and everything else in
/// the metadata sidecar (see `post_codec`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_name: String,
    pub author_username: String,
    #[serde(rename = "meta_name")]
    pub meta_title: String,
    pub meta_description: String,
    pub slug: String,
    #[serde(rename = "created")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updated")]
    pub updated_at: DateTime<Utc>,
    pub published: bool,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "id={}, slug={}, created={}, author={}\ntitle={}",
               self.id,
               self.slug,
               self.created_at,
               self.author_name,
               self.title,
        )
    }
}

/// Fields accepted when creating a post. Empty optional strings are treated
/// the same as missing ones and replaced by the store defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    #[serde(rename = "meta_name", alias = "meta_title")]
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub published: bool,
}

impl NewPost {
    pub fn new(title: &str, content: &str) -> Self {
        NewPost {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(StoreError::validation("title", "Title is required"));
        }
        if self.content.trim().is_empty() {
            return Err(StoreError::validation("content", "Content is required"));
        }
        Ok(())
    }
}

/// Sparse change set for an update. Only the fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(rename = "meta_name", alias = "meta_title")]
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub slug: Option<String>,
    pub published: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.meta_title.is_none()
            && self.meta_description.is_none()
            && self.slug.is_none()
            && self.published.is_none()
    }

    /// Applies every supplied field over `post`. Timestamps are left to the caller.
    pub fn apply_to(&self, post: &mut Post) {
        if let Some(ref title) = self.title {
            post.title = title.clone();
        }
        if let Some(ref content) = self.content {
            post.content = content.clone();
        }
        if let Some(ref meta_title) = self.meta_title {
            post.meta_title = meta_title.clone();
        }
        if let Some(ref meta_description) = self.meta_description {
            post.meta_description = meta_description.clone();
        }
        if let Some(ref slug) = self.slug {
            post.slug = slug.clone();
        }
        if let Some(published) = self.published {
            post.published = published;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn sample_post() -> Post {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Post {
            id: Uuid::parse_str("a63bd715-a3fe-4788-b0e1-2a3153778544").unwrap(),
            title: "Hello".to_string(),
            content: "# Hello\n".to_string(),
            author_name: "John Doe".to_string(),
            author_username: "johndoe".to_string(),
            meta_title: "Hello".to_string(),
            meta_description: "Read about Hello".to_string(),
            slug: "hello".to_string(),
            created_at: created,
            updated_at: created,
            published: false,
        }
    }

    #[test]
    fn test_validate() {
        assert!(NewPost::new("Title", "Body").validate().is_ok());

        let err = NewPost::new("", "Body").validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title", .. }));

        let err = NewPost::new("Title", "  \n").validate().unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "content", .. }));
    }

    #[test]
    fn test_changes_from_json() {
        let changes: PostChanges = serde_json::from_str(r#"{"title": "New", "meta_name": "Meta", "published": true}"#).unwrap();
        assert_eq!(changes.title.as_deref(), Some("New"));
        assert_eq!(changes.meta_title.as_deref(), Some("Meta"));
        assert_eq!(changes.published, Some(true));
        assert!(changes.content.is_none());
        assert!(!changes.is_empty());

        let changes: PostChanges = serde_json::from_str("{}").unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_apply_to() {
        let mut post = sample_post();
        let changes = PostChanges {
            content: Some("changed".to_string()),
            slug: Some("hello-again".to_string()),
            published: Some(true),
            ..Default::default()
        };
        changes.apply_to(&mut post);

        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "changed");
        assert_eq!(post.slug, "hello-again");
        assert!(post.published);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(sample_post()).unwrap();
        assert_eq!(json["id"], "a63bd715-a3fe-4788-b0e1-2a3153778544");
        assert_eq!(json["meta_name"], "Hello");
        assert_eq!(json["created"], "2024-01-02T03:04:05Z");
        assert_eq!(json["published"], false);
    }
}
