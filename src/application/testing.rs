//! In-memory `BlogApi` used by the application-layer tests.

use std::sync::Mutex;

use async_trait::async_trait;
use quillpad_api_types::{
    Post, PostAuthor, PostCreateRequest, PostList, PostUpdateRequest, RegisterRequest,
    RegisteredUser, TokenResponse,
};
use serde_json::json;

use crate::application::repos::{ApiError, ApiOperation, BlogApi, ImageFile, ListPostsQuery};
use crate::application::token::encode_for_tests;

pub(crate) fn status_error(operation: ApiOperation, status: u16, message: &str) -> ApiError {
    ApiError::Status {
        operation,
        status,
        message: message.to_string(),
    }
}

pub(crate) fn token_for(user_id: i64, email: &str) -> String {
    encode_for_tests(&json!({"sub": "ignored", "user_id": user_id, "email": email}))
}

pub(crate) fn post(id: i64, author_id: i64, username: &str) -> Post {
    Post {
        id,
        title: format!("Post {id}"),
        content: format!("Body of post {id}"),
        image_url: None,
        created_at: Some("2024-01-02T03:04:05".into()),
        updated_at: None,
        author_id: Some(author_id),
        author: Some(PostAuthor {
            id: Some(author_id),
            username: Some(username.into()),
            email: None,
        }),
    }
}

pub(crate) struct FakeApi {
    pub token: Mutex<Result<String, ApiError>>,
    pub register: Mutex<Result<(), ApiError>>,
    pub posts: Mutex<Result<PostList, ApiError>>,
    pub post: Mutex<Result<Post, ApiError>>,
    pub delete: Mutex<Result<bool, ApiError>>,
    pub upload: Mutex<Result<String, ApiError>>,
    pub calls: Mutex<Vec<String>>,
    pub list_queries: Mutex<Vec<ListPostsQuery>>,
    pub created: Mutex<Vec<PostCreateRequest>>,
    pub updated: Mutex<Vec<(i64, PostUpdateRequest)>>,
    pub uploaded: Mutex<Vec<String>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            token: Mutex::new(Ok(token_for(1, "ann@example.com"))),
            register: Mutex::new(Ok(())),
            posts: Mutex::new(Ok(PostList::default())),
            post: Mutex::new(Ok(post(1, 1, "ann"))),
            delete: Mutex::new(Ok(true)),
            upload: Mutex::new(Ok("http://localhost:8000/uploads/images/x.png".into())),
            calls: Mutex::new(Vec::new()),
            list_queries: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            updated: Mutex::new(Vec::new()),
            uploaded: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    fn record(&self, call: &str) {
        self.calls.lock().expect("calls").push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn set<T>(slot: &Mutex<T>, value: T) {
        *slot.lock().expect("slot") = value;
    }
}

#[async_trait]
impl BlogApi for FakeApi {
    async fn login(&self, _username: &str, _password: &str) -> Result<TokenResponse, ApiError> {
        self.record("login");
        self.token
            .lock()
            .expect("token")
            .clone()
            .map(|access_token| TokenResponse {
                access_token,
                token_type: Some("bearer".into()),
            })
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        self.record("register");
        self.register
            .lock()
            .expect("register")
            .clone()
            .map(|()| RegisteredUser {
                username: Some(request.username.clone()),
                email: Some(request.email.clone()),
                ..Default::default()
            })
    }

    async fn list_posts(&self, query: &ListPostsQuery) -> Result<PostList, ApiError> {
        self.record("list_posts");
        self.list_queries.lock().expect("queries").push(query.clone());
        self.posts.lock().expect("posts").clone()
    }

    async fn get_post(&self, _id: i64) -> Result<Post, ApiError> {
        self.record("get_post");
        self.post.lock().expect("post").clone()
    }

    async fn create_post(
        &self,
        _token: &str,
        request: &PostCreateRequest,
    ) -> Result<Post, ApiError> {
        self.record("create_post");
        self.created.lock().expect("created").push(request.clone());
        self.post.lock().expect("post").clone()
    }

    async fn update_post(
        &self,
        _token: &str,
        id: i64,
        request: &PostUpdateRequest,
    ) -> Result<Post, ApiError> {
        self.record("update_post");
        self.updated
            .lock()
            .expect("updated")
            .push((id, request.clone()));
        self.post.lock().expect("post").clone()
    }

    async fn delete_post(&self, _token: &str, _id: i64) -> Result<bool, ApiError> {
        self.record("delete_post");
        self.delete.lock().expect("delete").clone()
    }

    async fn upload_image(&self, _token: &str, image: ImageFile) -> Result<String, ApiError> {
        self.record("upload_image");
        self.uploaded.lock().expect("uploaded").push(image.file_name);
        self.upload.lock().expect("upload").clone()
    }
}
