//! Identifier newtypes shared by every layer.

pub mod ids;

pub use ids::{CommentId, PostId, UserId};
