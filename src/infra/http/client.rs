//! reqwest adapter for the blog backend.

use std::time::Duration;

use async_trait::async_trait;
use quillpad_api_types::{
    ErrorBody, ImageUploadResponse, Post, PostCreateRequest, PostList, PostUpdateRequest,
    RegisterRequest, RegisteredUser, TokenResponse,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::repos::{ApiError, ApiOperation, BlogApi, ImageFile, ListPostsQuery};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url).map_err(|e| ApiError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Url(e.to_string()))?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("quillpad-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Url(e.to_string()))
    }

    /// Resolve a server-relative path (e.g. an upload URL) under the base URL.
    ///
    /// Rooted paths stay below the base path prefix.
    pub fn absolute_url(&self, reference: &str) -> Result<String, ApiError> {
        if let Ok(url) = Url::parse(reference) {
            return Ok(url.into());
        }
        self.url(reference).map(String::from)
    }

    fn auth_header(operation: ApiOperation, token: &str) -> Result<HeaderValue, ApiError> {
        HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| ApiError::Network {
            operation,
            reason: format!("token is not a valid header value: {e}"),
        })
    }

    fn authed(
        &self,
        operation: ApiOperation,
        method: Method,
        url: Url,
        token: &str,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .client
            .request(method, url)
            .header(AUTHORIZATION, Self::auth_header(operation, token)?))
    }

    /// Send and turn any non-2xx status into [`ApiError::Status`].
    async fn send(
        &self,
        operation: ApiOperation,
        request: RequestBuilder,
    ) -> Result<Response, ApiError> {
        let resp = request.send().await.map_err(|e| ApiError::Network {
            operation,
            reason: e.to_string(),
        })?;

        let status = resp.status();
        debug!(%operation, status = status.as_u16(), url = %resp.url(), "backend responded");
        if status.is_success() {
            return Ok(resp);
        }

        let bytes = resp.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| operation.default_message().to_string());
        Err(ApiError::Status {
            operation,
            status: status.as_u16(),
            message,
        })
    }

    async fn handle<T: DeserializeOwned>(
        operation: ApiOperation,
        resp: Response,
    ) -> Result<T, ApiError> {
        let bytes = resp.bytes().await.map_err(|e| ApiError::Network {
            operation,
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            operation,
            reason: e.to_string(),
        })
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = self.send(operation, request).await?;
        Self::handle(operation, resp).await
    }
}

#[async_trait]
impl BlogApi for ApiClient {
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let op = ApiOperation::Login;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("username", username)
            .append_pair("password", password)
            .finish();
        let request = self
            .client
            .post(self.url("token")?)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        self.request_json(op, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        let op = ApiOperation::Register;
        let builder = self.client.post(self.url("register")?).json(request);
        self.request_json(op, builder).await
    }

    async fn list_posts(&self, query: &ListPostsQuery) -> Result<PostList, ApiError> {
        let op = ApiOperation::ListPosts;
        let mut url = self.url("posts")?;
        {
            let mut qp = url.query_pairs_mut();
            for (k, v) in query.to_pairs() {
                qp.append_pair(k, &v);
            }
        }
        self.request_json(op, self.client.get(url)).await
    }

    async fn get_post(&self, id: i64) -> Result<Post, ApiError> {
        let op = ApiOperation::GetPost;
        let url = self.url(&format!("posts/{id}"))?;
        self.request_json(op, self.client.get(url)).await
    }

    async fn create_post(
        &self,
        token: &str,
        request: &PostCreateRequest,
    ) -> Result<Post, ApiError> {
        let op = ApiOperation::CreatePost;
        let builder = self
            .authed(op, Method::POST, self.url("posts")?, token)?
            .json(request);
        self.request_json(op, builder).await
    }

    async fn update_post(
        &self,
        token: &str,
        id: i64,
        request: &PostUpdateRequest,
    ) -> Result<Post, ApiError> {
        let op = ApiOperation::UpdatePost;
        let url = self.url(&format!("posts/{id}"))?;
        let builder = self.authed(op, Method::PUT, url, token)?.json(request);
        self.request_json(op, builder).await
    }

    async fn delete_post(&self, token: &str, id: i64) -> Result<bool, ApiError> {
        let op = ApiOperation::DeletePost;
        let url = self.url(&format!("posts/{id}"))?;
        let builder = self.authed(op, Method::DELETE, url, token)?;
        self.send(op, builder).await?;
        Ok(true)
    }

    async fn upload_image(&self, token: &str, image: ImageFile) -> Result<String, ApiError> {
        let op = ApiOperation::UploadImage;
        let part = reqwest::multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(image.mime)
            .map_err(|e| ApiError::Decode {
                operation: op,
                reason: e.to_string(),
            })?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let builder = self
            .authed(op, Method::POST, self.url("images/upload")?, token)?
            .multipart(form);
        let uploaded: ImageUploadResponse = self.request_json(op, builder).await?;
        self.absolute_url(&uploaded.url)
    }
}
