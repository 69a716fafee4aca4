//! Likes and bookmarks: per-user saved-post relations.

mod model;
mod service;

pub use model::{SAVED_POST_KEY, SavedFilter, SavedKind, SavedPostRecord, saved_post_cursor};
pub(crate) use model::cursor_fields;
pub use service::{SavedPostError, SavedPostService};
