//! Signed-in identity and the bearer token that proves it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier carried in the token payload.
///
/// Backends put either a numeric `user_id` or a string `sub` in the token,
/// so both shapes are kept verbatim and compared by their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl UserId {
    /// Whether this id names the same account as a backend numeric id.
    #[must_use]
    pub fn matches(&self, other: i64) -> bool {
        match self {
            Self::Numeric(id) => *id == other,
            Self::Text(text) => text.trim() == other.to_string(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

/// Persisted as the `user` storage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// A user together with the token issued for them.
///
/// Holding both in one value keeps "user without token" and "token without
/// user" unrepresentable.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    user: User,
    token: String,
}

impl AuthSession {
    #[must_use]
    pub fn new(user: User, token: String) -> Self {
        Self { user, token }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}
