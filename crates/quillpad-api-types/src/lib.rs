//! Wire types for the quillpad blog REST API.
//!
//! Response types decode tolerantly: optional fields the backend may omit
//! (`image_url`, `author`, `hasNextPage`, ...) default instead of failing.

#![deny(clippy::all, clippy::pedantic)]

use serde::{Deserialize, Serialize};

/// Form body for `POST /token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// User record echoed back by `POST /register`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisteredUser {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostAuthor {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<PostAuthor>,
}

impl Post {
    /// Owner id, from `author_id` or the embedded author record.
    #[must_use]
    pub fn owner_id(&self) -> Option<i64> {
        self.author_id
            .or_else(|| self.author.as_ref().and_then(|author| author.id))
    }

    #[must_use]
    pub fn owner_username(&self) -> Option<&str> {
        self.author
            .as_ref()
            .and_then(|author| author.username.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// Response of `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostList {
    #[serde(default)]
    pub items: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    #[serde(
        rename = "hasNextPage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub has_next_page: Option<bool>,
    #[serde(
        rename = "hasPreviousPage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub has_previous_page: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreateRequest {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Partial update for `PUT /posts/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PostUpdateRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.image_url.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub url: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(Vec<ValidationIssue>),
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationIssue {
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    /// Human-readable `detail`, if the body carried a usable one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            ErrorDetail::Message(message) => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            ErrorDetail::Validation(issues) => {
                let joined = issues
                    .iter()
                    .filter_map(|issue| issue.msg.as_deref())
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            ErrorDetail::Other(_) => None,
        }
    }
}
