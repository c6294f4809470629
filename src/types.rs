use std::borrow::Borrow;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::token::generate_token;

/// Opaque bearer credential presented in the `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct AccessToken(pub String);

/// Opaque credential exchanged at `/api/login` for the access token.
///
/// Never rotated: the same value is handed out for the lifetime of the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct RefreshToken(pub String);

impl AccessToken {
    /// Generate a fresh random access token.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_token())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    /// Generate a fresh random refresh token.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_token())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Token maps are keyed by the newtypes but queried with `&str`.
impl Borrow<str> for AccessToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RefreshToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A mock user and its bearer credentials.
///
/// `name` is the primary key inside a [`UserStore`](crate::store::UserStore).
/// `class_name` is whatever the client sent as its password on the last login.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct User {
    pub name: String,
    pub class_name: String,
    pub refresh_token: RefreshToken,
    pub access_token: AccessToken,
}

impl User {
    /// Create a user with newly generated tokens.
    #[must_use]
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_name: class_name.into(),
            refresh_token: RefreshToken::generate(),
            access_token: AccessToken::generate(),
        }
    }
}

/// The `(api, app)` version pair reported by Bakaláři instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    pub api: String,
    pub app: String,
}

impl Versions {
    #[must_use]
    pub fn new(api: impl Into<String>, app: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            app: app.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_gets_distinct_tokens() {
        let user = User::new("novak", "4.A");
        assert_eq!(user.name, "novak");
        assert_eq!(user.class_name, "4.A");
        assert_ne!(user.refresh_token.as_str(), user.access_token.as_str());
    }

    #[test]
    fn tokens_serialize_transparently() {
        let token = AccessToken::from("abc".to_string());
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
        assert_eq!(token.to_string(), "abc");
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_access(_: &AccessToken) {}
        fn takes_refresh(_: &RefreshToken) {}

        let access = AccessToken::from("t".to_string());
        let refresh = RefreshToken::from("t".to_string());

        takes_access(&access);
        takes_refresh(&refresh);
        // takes_access(&refresh);  // Compile error!
    }
}
