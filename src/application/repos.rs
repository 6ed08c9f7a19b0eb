//! Traits describing the backend API and durable session storage adapters.

use std::fmt;

use async_trait::async_trait;
use quillpad_api_types::{
    Post, PostCreateRequest, PostList, PostUpdateRequest, RegisterRequest, RegisteredUser,
    TokenResponse,
};
use thiserror::Error;

/// Backend capability an [`ApiError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    Login,
    Register,
    ListPosts,
    GetPost,
    CreatePost,
    UpdatePost,
    DeletePost,
    UploadImage,
}

impl ApiOperation {
    /// Message used when a failed response carries no usable `detail`.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Registration failed",
            Self::ListPosts => "Failed to fetch posts",
            Self::GetPost => "Failed to fetch post",
            Self::CreatePost => "Failed to create post",
            Self::UpdatePost => "Failed to update post",
            Self::DeletePost => "Failed to delete post",
            Self::UploadImage => "Failed to upload image",
        }
    }
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::ListPosts => "list_posts",
            Self::GetPost => "get_post",
            Self::CreatePost => "create_post",
            Self::UpdatePost => "update_post",
            Self::DeletePost => "delete_post",
            Self::UploadImage => "upload_image",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("{} (network error: {reason})", .operation.default_message())]
    Network {
        operation: ApiOperation,
        reason: String,
    },
    /// Non-2xx status; `message` is the body's `detail` or the default.
    #[error("{message}")]
    Status {
        operation: ApiOperation,
        status: u16,
        message: String,
    },
    /// 2xx status with a body that could not be decoded.
    #[error("{} (unexpected response: {reason})", .operation.default_message())]
    Decode {
        operation: ApiOperation,
        reason: String,
    },
    #[error("invalid URL: {0}")]
    Url(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query for `GET /posts`, expressed in pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPostsQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl ListPostsQuery {
    #[must_use]
    pub fn new(page: u32, limit: u32, search: Option<String>) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            search: search.filter(|s| !s.is_empty()),
        }
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }

    /// Query pairs in wire order; `search` only when non-empty.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("skip", self.skip().to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        pairs
    }
}

/// Image bytes staged for `POST /images/upload`.
#[derive(Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError>;

    async fn list_posts(&self, query: &ListPostsQuery) -> Result<PostList, ApiError>;

    async fn get_post(&self, id: i64) -> Result<Post, ApiError>;

    async fn create_post(&self, token: &str, request: &PostCreateRequest)
    -> Result<Post, ApiError>;

    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostUpdateRequest,
    ) -> Result<Post, ApiError>;

    /// `true` once the backend acknowledged the delete; it sends no body.
    async fn delete_post(&self, token: &str, id: i64) -> Result<bool, ApiError>;

    /// Returns the absolute URL of the stored image.
    async fn upload_image(&self, token: &str, image: ImageFile) -> Result<String, ApiError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("storage file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// String key/value store that survives process restarts.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_converts_pages_to_skip() {
        let query = ListPostsQuery::new(3, 10, Some("rust".into()));
        assert_eq!(query.skip(), 20);
        assert_eq!(
            query.to_pairs(),
            vec![
                ("skip", "20".to_string()),
                ("limit", "10".to_string()),
                ("search", "rust".to_string()),
            ]
        );
    }

    #[test]
    fn list_query_omits_empty_search_and_clamps_page() {
        let query = ListPostsQuery::new(0, 10, Some(String::new()));
        assert_eq!(query.page, 1);
        assert_eq!(query.skip(), 0);
        assert_eq!(query.to_pairs().len(), 2);
    }

    #[test]
    fn status_error_displays_detail_only() {
        let err = ApiError::Status {
            operation: ApiOperation::GetPost,
            status: 404,
            message: "Post not found".into(),
        };
        assert_eq!(err.to_string(), "Post not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn network_error_leads_with_default_message() {
        let err = ApiError::Network {
            operation: ApiOperation::Login,
            reason: "connection refused".into(),
        };
        assert!(err.to_string().starts_with("Login failed"));
    }
}
