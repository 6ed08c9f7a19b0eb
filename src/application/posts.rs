//! View state for the post listing, detail page and post form.

use std::path::Path;
use std::sync::Arc;

use quillpad_api_types::{Post, PostCreateRequest, PostUpdateRequest};
use thiserror::Error;
use tracing::{debug, info};

use crate::application::location::{Location, QueryState};
use crate::application::pagination::{Pagination, total_pages};
use crate::application::repos::{ApiError, BlogApi, ImageFile, ListPostsQuery};
use crate::domain::error::DomainError;
use crate::domain::posts::is_author;
use crate::domain::session::AuthSession;
use crate::domain::uploads::{ALLOWED_IMAGE_EXTENSIONS, image_extension, image_mime};

pub const DELETE_REQUIRES_LOGIN: &str = "Please log in to delete this post.";
pub const WRITE_REQUIRES_LOGIN: &str = "You must be logged in to create or edit posts";
pub const EDIT_REQUIRES_LOGIN: &str = "You need to be logged in to edit a post.";
pub const EDIT_NOT_AUTHOR: &str = "You are not authorized to edit this post";

#[derive(Debug, Error)]
pub enum PostViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("{0}")]
    NotSignedIn(&'static str),
    #[error("Invalid post ID")]
    InvalidId,
    #[error("failed to read image {path}: {source}")]
    Image {
        path: String,
        source: std::io::Error,
    },
}

pub fn parse_post_id(raw: &str) -> Result<i64, PostViewError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PostViewError::InvalidId)
}

/// Listing state: one page of posts for the current location.
pub struct PostListView {
    api: Arc<dyn BlogApi>,
    page_size: u32,
    base_path: String,
    query: QueryState,
    posts: Vec<Post>,
    total_pages: u32,
    is_loading: bool,
    error: Option<String>,
}

impl PostListView {
    pub fn new(api: Arc<dyn BlogApi>, page_size: u32, base_path: impl Into<String>) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            base_path: base_path.into(),
            query: QueryState::default(),
            posts: Vec::new(),
            total_pages: 1,
            is_loading: false,
            error: None,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Fetch the page described by `location`.
    ///
    /// On failure the list is emptied and the message kept for display.
    pub async fn load(&mut self, location: &Location) -> Result<(), PostViewError> {
        self.query = QueryState::from_location(location);
        self.is_loading = true;
        self.error = None;

        let query = ListPostsQuery::new(
            self.query.page,
            self.page_size,
            Some(self.query.search.clone()),
        );
        let result = self.api.list_posts(&query).await;
        self.is_loading = false;

        match result {
            Ok(list) => {
                debug!(
                    page = self.query.page,
                    items = list.items.len(),
                    total = list.total,
                    "posts loaded"
                );
                self.total_pages = total_pages(list.total, self.page_size);
                self.posts = list.items;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                self.posts.clear();
                Err(err.into())
            }
        }
    }

    /// Pagination control for the loaded page, if more than one page exists.
    pub fn pagination(&self) -> Option<Pagination> {
        Pagination::build(
            self.query.page,
            self.total_pages,
            &self.base_path,
            &self.query.carried_params(),
        )
    }

    /// Message for an empty, error-free listing.
    pub fn empty_message(&self) -> Option<String> {
        if !self.posts.is_empty() || self.error.is_some() || self.is_loading {
            return None;
        }
        if self.query.search.is_empty() {
            Some("No posts found".to_string())
        } else {
            Some(format!("No posts found matching \"{}\"", self.query.search))
        }
    }

    /// Drop `id` from the local page. Not re-validated against the server.
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.posts.len();
        self.posts.retain(|post| post.id != id);
        self.posts.len() != before
    }

    /// Delete on the backend, then remove the post locally.
    pub async fn delete(
        &mut self,
        session: Option<&AuthSession>,
        id: i64,
    ) -> Result<(), PostViewError> {
        if delete_post(self.api.as_ref(), session, id).await? {
            self.remove(id);
        }
        Ok(())
    }
}

/// Delete `id` on the backend; a session token is required.
pub async fn delete_post(
    api: &dyn BlogApi,
    session: Option<&AuthSession>,
    id: i64,
) -> Result<bool, PostViewError> {
    let session = session.ok_or(PostViewError::NotSignedIn(DELETE_REQUIRES_LOGIN))?;
    let deleted = api.delete_post(session.token(), id).await?;
    if deleted {
        info!(post_id = id, "post deleted");
    }
    Ok(deleted)
}

/// Whether the viewer gets edit/delete actions on `post`.
pub fn can_modify(session: Option<&AuthSession>, post: &Post) -> bool {
    is_author(session.map(AuthSession::user), post)
}

/// Fetch a post for the edit form; only its author may proceed.
///
/// The edit gate compares account ids only, unlike [`can_modify`].
/// A [`DomainError::NotAuthor`] tells the caller to fall back to the
/// read-only detail view.
pub async fn load_for_edit(
    api: &dyn BlogApi,
    session: Option<&AuthSession>,
    id: i64,
) -> Result<Post, PostViewError> {
    let session = session.ok_or(PostViewError::NotSignedIn(EDIT_REQUIRES_LOGIN))?;
    let post = api.get_post(id).await?;
    let same_id = post
        .owner_id()
        .is_some_and(|owner| session.user().id.matches(owner));
    if !same_id {
        return Err(DomainError::not_author(EDIT_NOT_AUTHOR).into());
    }
    Ok(post)
}

/// Read an image attachment, refusing types the backend will not accept.
pub async fn load_image(path: &Path) -> Result<ImageFile, PostViewError> {
    let extension = image_extension(path).ok_or_else(|| {
        DomainError::validation(format!(
            "Unsupported image type; allowed: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        ))
    })?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| PostViewError::Image {
            path: path.display().to_string(),
            source,
        })?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| format!("upload.{extension}"), str::to_string);

    Ok(ImageFile {
        file_name,
        mime: image_mime(&extension),
        bytes,
    })
}

/// A new post as entered in the form.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub image: Option<ImageFile>,
}

/// Changes to an existing post; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub image: Option<ImageFile>,
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        Err(DomainError::validation(format!("{field} is required")))
    } else {
        Ok(())
    }
}

/// Upload the attached image, if any, and return the URL to store.
async fn resolve_image(
    api: &dyn BlogApi,
    token: &str,
    image: Option<ImageFile>,
    image_url: Option<String>,
) -> Result<Option<String>, PostViewError> {
    match image {
        Some(image) => {
            debug!(file = %image.file_name, "uploading image");
            Ok(Some(api.upload_image(token, image).await?))
        }
        None => Ok(image_url.filter(|url| !url.trim().is_empty())),
    }
}

pub async fn create_post(
    api: &dyn BlogApi,
    session: Option<&AuthSession>,
    draft: PostDraft,
) -> Result<Post, PostViewError> {
    let session = session.ok_or(PostViewError::NotSignedIn(WRITE_REQUIRES_LOGIN))?;
    require_text("Title", &draft.title)?;
    require_text("Content", &draft.content)?;

    let image_url = resolve_image(api, session.token(), draft.image, draft.image_url).await?;
    let request = PostCreateRequest {
        title: draft.title,
        content: draft.content,
        image_url,
    };
    let post = api.create_post(session.token(), &request).await?;
    info!(post_id = post.id, "post created");
    Ok(post)
}

pub async fn update_post(
    api: &dyn BlogApi,
    session: Option<&AuthSession>,
    id: i64,
    changes: PostChanges,
) -> Result<Post, PostViewError> {
    let session = session.ok_or(PostViewError::NotSignedIn(WRITE_REQUIRES_LOGIN))?;
    if let Some(title) = changes.title.as_deref() {
        require_text("Title", title)?;
    }
    if let Some(content) = changes.content.as_deref() {
        require_text("Content", content)?;
    }

    let image_url = resolve_image(api, session.token(), changes.image, changes.image_url).await?;
    let request = PostUpdateRequest {
        title: changes.title,
        content: changes.content,
        image_url,
    };
    if request.is_empty() {
        return Err(DomainError::validation("Nothing to update").into());
    }

    let post = api.update_post(session.token(), id, &request).await?;
    info!(post_id = post.id, "post updated");
    Ok(post)
}
