use serde::{Deserialize, Serialize};

use crate::types::CommentId;

// ===== Posts =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

// ===== Comments =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: String,
    /// Comment being replied to. Replies to replies are reparented.
    #[serde(default)]
    pub parent_id: Option<CommentId>,
}

// ===== Listing =====

/// Query-string parameters shared by every list endpoint.
///
/// `limit` stays a raw string so the endpoint's [`LimitPolicy`] can report
/// a precise validation error instead of a generic extractor rejection.
///
/// [`LimitPolicy`]: crate::pagination::LimitPolicy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListParams {
    pub cursor: Option<String>,
    pub limit: Option<String>,
    /// Search term, only honoured by the post feed.
    pub q: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }
}

// ===== Saved posts =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStateResponse {
    pub saved: bool,
    /// False when the relation already existed (or was already absent).
    pub changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_request_parent_is_optional_and_camel_case() {
        let top: CreateCommentRequest =
            serde_json::from_str(r#"{"content":"hi"}"#).expect("top-level request");
        assert_eq!(top.parent_id, None);

        let reply: CreateCommentRequest =
            serde_json::from_str(r#"{"content":"hi","parentId":7}"#).expect("reply request");
        assert_eq!(reply.parent_id, Some(CommentId(7)));
    }
}
