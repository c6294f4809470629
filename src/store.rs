use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Error;
use crate::types::{AccessToken, RefreshToken, User};

/// User and token persistence used by the login and profile handlers.
///
/// Names are unique. Implementations must make [`add_user`](Self::add_user)
/// atomic: two concurrent inserts of the same name leave exactly one record.
pub trait UserStore: Send + Sync + 'static {
    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UserExists`] if a user with the same name is already stored.
    fn add_user(&self, user: User) -> Result<(), Error>;

    /// Look up a user by name.
    fn user_by_name(&self, name: &str) -> Option<User>;

    /// Look up the user owning a refresh token.
    fn user_by_refresh_token(&self, token: &str) -> Option<User>;

    /// Look up the user owning an access token.
    fn user_by_access_token(&self, token: &str) -> Option<User>;

    /// Overwrite the class name of an existing user, keeping its tokens.
    ///
    /// Returns the updated record, or `None` if no user has that name.
    fn set_class_name(&self, name: &str, class_name: &str) -> Option<User>;
}

#[derive(Default)]
struct Users {
    by_name: HashMap<String, User>,
    by_refresh_token: HashMap<RefreshToken, String>,
    by_access_token: HashMap<AccessToken, String>,
}

/// Thread-safe in-memory [`UserStore`]. Everything is lost on restart.
///
/// Token lookups go through secondary maps kept under the same lock as the
/// primary one.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Users>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.read().by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserStore for MemoryStore {
    fn add_user(&self, user: User) -> Result<(), Error> {
        let mut users = self.users.write();
        if users.by_name.contains_key(&user.name) {
            return Err(Error::UserExists(user.name));
        }
        users
            .by_refresh_token
            .insert(user.refresh_token.clone(), user.name.clone());
        users
            .by_access_token
            .insert(user.access_token.clone(), user.name.clone());
        users.by_name.insert(user.name.clone(), user);
        Ok(())
    }

    fn user_by_name(&self, name: &str) -> Option<User> {
        self.users.read().by_name.get(name).cloned()
    }

    fn user_by_refresh_token(&self, token: &str) -> Option<User> {
        let users = self.users.read();
        let name = users.by_refresh_token.get(token)?;
        users.by_name.get(name).cloned()
    }

    fn user_by_access_token(&self, token: &str) -> Option<User> {
        let users = self.users.read();
        let name = users.by_access_token.get(token)?;
        users.by_name.get(name).cloned()
    }

    fn set_class_name(&self, name: &str, class_name: &str) -> Option<User> {
        let mut users = self.users.write();
        let user = users.by_name.get_mut(name)?;
        user.class_name = class_name.to_string();
        Some(user.clone())
    }
}
