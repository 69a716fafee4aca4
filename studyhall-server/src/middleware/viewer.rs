use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use studyhall_core::{domain::Actor, types::UserId};

use crate::infra::errors::AppError;

/// Header carrying the caller's user id, set by the auth gateway.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's role; `moderator` grants moderation rights.
pub const USER_ROLE_HEADER: &str = "x-user-role";

const MODERATOR_ROLE: &str = "moderator";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: UserId,
    pub is_moderator: bool,
}

impl Viewer {
    pub fn actor(&self) -> Actor {
        if self.is_moderator {
            Actor::moderator(self.user_id)
        } else {
            Actor::member(self.user_id)
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let raw = headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("Missing x-user-id header"))?;

        let user_id = raw
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(UserId)
            .ok_or_else(|| AppError::unauthorized("Invalid x-user-id header"))?;

        let is_moderator = headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(|role| role.trim().eq_ignore_ascii_case(MODERATOR_ROLE))
            .unwrap_or(false);

        Ok(Self {
            user_id,
            is_moderator,
        })
    }
}

/// Resolves the gateway identity headers into an `Extension<Viewer>`.
pub async fn viewer_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let viewer = Viewer::from_headers(request.headers())?;
    request.extensions_mut().insert(viewer);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::StatusCode;

    #[test]
    fn moderator_role_is_case_insensitive() {
        let user = Uuid::now_v7();
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_ID_HEADER,
            HeaderValue::from_str(&user.to_string()).expect("header"),
        );
        headers.insert(USER_ROLE_HEADER, HeaderValue::from_static("Moderator"));

        let viewer = Viewer::from_headers(&headers).expect("viewer");
        assert_eq!(viewer.user_id, UserId(user));
        assert!(viewer.actor().is_moderator);
    }

    #[test]
    fn missing_or_malformed_identity_is_unauthorized() {
        let err = Viewer::from_headers(&HeaderMap::new()).expect_err("missing");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        let err = Viewer::from_headers(&headers).expect_err("malformed");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
