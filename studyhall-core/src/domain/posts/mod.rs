//! Posts, the main feed and post search.

mod model;
mod service;

pub use model::{NewPost, PostFilter, PostRecord, SEARCH_MAX_CHARS};
pub use service::{PostError, PostService};
