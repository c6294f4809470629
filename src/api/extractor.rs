use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::error::ApiError;
use super::state::AppState;
use crate::directory::Directory;
use crate::store::UserStore;
use crate::types::User;

/// User authenticated by an `Authorization: Bearer <access token>` header.
///
/// Use as an Axum extractor in route handlers. Returns `401 Unauthorized`
/// if the header is missing, malformed, or names an unknown token.
#[derive(Debug, Clone)]
pub struct BearerUser(pub User);

impl<D: Directory, S: UserStore> FromRequestParts<AppState<D, S>> for BearerUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<D, S>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthenticated)?;

        state
            .store
            .user_by_access_token(token)
            .map(Self)
            .ok_or(ApiError::Unauthenticated)
    }
}

/// Token part of a `Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc-_="), Some("abc-_="));
        assert_eq!(bearer_token("Bearer a b"), Some("a b"));
    }

    #[test]
    fn test_bearer_token_rejects_malformed() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("abc"), None);
    }
}
