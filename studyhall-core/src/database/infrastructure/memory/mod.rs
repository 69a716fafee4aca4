//! Process-local store implementing every port.
//!
//! Orders, cursor resolution and the atomic parent re-check mirror the
//! Postgres adapter so services behave the same against either.

mod comments;
mod posts;
mod saved_posts;

use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::domain::comments::CommentRecord;
use crate::domain::posts::PostRecord;
use crate::domain::saved::SavedKind;
use crate::pagination::SortDirection;
use crate::types::{CommentId, PostId, UserId};

pub use comments::InMemoryCommentsRepository;
pub use posts::InMemoryPostsRepository;
pub use saved_posts::InMemorySavedPostsRepository;

#[derive(Debug, Clone)]
struct SavedRow {
    kind: SavedKind,
    user_id: UserId,
    post_id: PostId,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    saved: Vec<SavedRow>,
    last_comment_id: i64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Strictly increasing write timestamps.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(next);
        next
    }

    fn post(&self, id: PostId) -> Option<&PostRecord> {
        self.posts.iter().find(|post| post.id == id)
    }

    fn comment(&self, id: CommentId) -> Option<&CommentRecord> {
        self.comments.iter().find(|comment| comment.id == id)
    }
}

type SharedState = Arc<RwLock<MemoryState>>;

/// Shared state behind the three in-memory repositories.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: SharedState,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> InMemoryPostsRepository {
        InMemoryPostsRepository::new(self.state.clone())
    }

    pub fn comments(&self) -> InMemoryCommentsRepository {
        InMemoryCommentsRepository::new(self.state.clone())
    }

    pub fn saved_posts(&self) -> InMemorySavedPostsRepository {
        InMemorySavedPostsRepository::new(self.state.clone())
    }

    /// Flip the moderation flag on a post. Returns `false` if it is unknown.
    pub async fn set_post_hidden(&self, id: PostId, hidden: bool) -> bool {
        let mut state = self.state.write().await;
        match state.posts.iter_mut().find(|post| post.id == id) {
            Some(post) => {
                post.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Flip the moderation flag on a comment. Returns `false` if it is unknown.
    pub async fn set_comment_hidden(&self, id: CommentId, hidden: bool) -> bool {
        let mut state = self.state.write().await;
        match state.comments.iter_mut().find(|comment| comment.id == id) {
            Some(comment) => {
                comment.hidden = hidden;
                true
            }
            None => false,
        }
    }
}

/// Rows strictly after `bound` in `direction`, ordered, at most `take`.
fn keyset_window<T, K>(
    rows: impl Iterator<Item = T>,
    key: impl Fn(&T) -> K,
    bound: Option<&K>,
    direction: SortDirection,
    take: usize,
) -> Vec<T>
where
    K: Ord,
{
    let ordering = |a: &K, b: &K| match direction {
        SortDirection::Asc => a.cmp(b),
        SortDirection::Desc => b.cmp(a),
    };

    let mut keyed: Vec<(K, T)> = rows
        .map(|row| (key(&row), row))
        .filter(|(k, _)| bound.is_none_or(|b| ordering(k, b) == Ordering::Greater))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| ordering(a, b));
    keyed.into_iter().take(take).map(|(_, row)| row).collect()
}
