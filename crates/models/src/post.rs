use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const TITLE_MAX_LEN: usize = 200;
pub const SUMMARY_MAX_LEN: usize = 500;
pub const TAGS_MAX: usize = 10;

/// One blog entry as stored in the gist blob.
///
/// `id` is the string form of a monotonically increasing integer; `date` is
/// the creation timestamp, refreshed whenever the post is updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub media: Vec<String>,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn from_draft(id: String, draft: PostDraft, date: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            summary: draft.summary,
            tags: draft.tags.unwrap_or_default(),
            media: draft.media.unwrap_or_default(),
            date,
        }
    }
}

/// Input for creating a post. Id and timestamp are assigned by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub media: Option<Vec<String>>,
}

impl PostDraft {
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_title(&self.title)?;
        validate_content(&self.content)?;
        if let Some(summary) = &self.summary {
            validate_summary(summary)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }
}

/// Partial update: only present fields are merged onto the stored post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub media: Option<Vec<String>>,
}

impl PostPatch {
    pub fn validate(&self) -> Result<(), ModelError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(content) = &self.content {
            validate_content(content)?;
        }
        if let Some(summary) = &self.summary {
            validate_summary(summary)?;
        }
        if let Some(tags) = &self.tags {
            validate_tags(tags)?;
        }
        Ok(())
    }

    /// Shallow-merge the present fields onto `post`. The caller refreshes
    /// the modification timestamp.
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(summary) = self.summary {
            post.summary = Some(summary);
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
        if let Some(media) = self.media {
            post.media = media;
        }
    }
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title must not be empty".into()));
    }
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "title longer than {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(())
}

pub fn validate_content(content: &str) -> Result<(), ModelError> {
    if content.is_empty() {
        return Err(ModelError::Validation("content must not be empty".into()));
    }
    Ok(())
}

pub fn validate_summary(summary: &str) -> Result<(), ModelError> {
    if summary.chars().count() > SUMMARY_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "summary longer than {} characters",
            SUMMARY_MAX_LEN
        )));
    }
    Ok(())
}

pub fn validate_tags(tags: &[String]) -> Result<(), ModelError> {
    if tags.len() > TAGS_MAX {
        return Err(ModelError::Validation(format!(
            "maximum {} tags allowed",
            TAGS_MAX
        )));
    }
    Ok(())
}
