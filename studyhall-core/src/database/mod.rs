//! Store ports and the adapters implementing them.

pub mod infrastructure;
pub mod ports;

pub use infrastructure::memory::{
    InMemoryCommentsRepository, InMemoryPostsRepository, InMemorySavedPostsRepository,
    InMemoryStore,
};
#[cfg(feature = "database")]
pub use infrastructure::postgres::{PoolStats, PostgresDatabase};
pub use ports::{
    comments::{CommentsRepository, CreateCommentOutcome},
    posts::PostsRepository,
    saved_posts::SavedPostsRepository,
};
