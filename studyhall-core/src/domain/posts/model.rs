use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pagination::{CursorKeyed, CursorValue};
use crate::traits::Owned;
use crate::types::{PostId, UserId};

pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MAX_CHARS: usize = 10_000;
pub const SEARCH_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: PostId,
    pub author_id: UserId,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub hidden: bool,
}

impl Owned for PostRecord {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

impl CursorKeyed for PostRecord {
    fn cursor_key(&self) -> CursorValue {
        self.id.into()
    }
}

/// Validated input for a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: UserId,
    pub title: String,
    pub content: String,
}

/// Which posts a listing covers. Hidden posts are never listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<UserId>,
    /// Case-insensitive substring matched against title and content.
    pub search: Option<String>,
}

impl PostFilter {
    pub fn feed() -> Self {
        Self::default()
    }

    pub fn by_author(author_id: UserId) -> Self {
        Self {
            author_id: Some(author_id),
            search: None,
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            author_id: None,
            search: Some(term.into()),
        }
    }

    pub fn matches(&self, post: &PostRecord) -> bool {
        if post.hidden {
            return false;
        }
        if let Some(author) = self.author_id
            && post.author_id != author
        {
            return false;
        }
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}
