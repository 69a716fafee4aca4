//! Two-level comment threads.
//!
//! A comment is either top-level (attached to a post) or a reply to a
//! top-level comment. Replies aimed at other replies are reparented onto the
//! thread's top-level comment and mention the bypassed reply's author.

mod model;
mod service;
mod thread;
mod tree;

pub use model::{COMMENT_MAX_CHARS, CommentFilter, CommentRecord, CommentScope, NewComment};
pub use service::{CommentError, CommentService};
pub use thread::ThreadPaginationAdapter;
pub use tree::{CommentTree, DeclaredParent, Placement, ReplyMentionResolver, ResolvedParent};
