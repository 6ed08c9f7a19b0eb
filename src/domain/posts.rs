//! Post helpers shared by the list, detail and form views.

use time::{
    OffsetDateTime, PrimitiveDateTime, format_description::FormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

pub use quillpad_api_types::{Post, PostAuthor};

use crate::domain::session::User;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const NAIVE_TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

pub const PREVIEW_CHARS: usize = 150;

/// Whether `viewer` may see edit/delete actions for `post`.
///
/// UI gating only: the backend decides whether a write is allowed. Missing
/// identity on either side means "not the author".
#[must_use]
pub fn is_author(viewer: Option<&User>, post: &Post) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };

    let same_id = post.owner_id().is_some_and(|id| viewer.id.matches(id));
    let same_name = !viewer.username.is_empty()
        && post
            .owner_username()
            .is_some_and(|name| name == viewer.username);

    same_id || same_name
}

/// Card preview: the first 150 characters, with `...` when cut.
#[must_use]
pub fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_string(),
    }
}

/// Render `created_at` as a calendar date.
///
/// Accepts RFC 3339 and the offset-less ISO timestamps the backend emits;
/// anything else is shown as received.
#[must_use]
pub fn display_date(raw: &str) -> String {
    let date = OffsetDateTime::parse(raw, &Rfc3339)
        .map(OffsetDateTime::date)
        .or_else(|_| {
            let whole_seconds = raw.split_once('.').map_or(raw, |(head, _)| head);
            PrimitiveDateTime::parse(whole_seconds, NAIVE_TIMESTAMP_FORMAT).map(|dt| dt.date())
        });

    match date {
        Ok(date) => date
            .format(HUMAN_DATE_FORMAT)
            .unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

/// `By <author> • <date>` line shown under a title.
#[must_use]
pub fn byline(post: &Post) -> String {
    let author = post.owner_username().unwrap_or("Unknown");
    match post.created_at.as_deref() {
        Some(created) => format!("By {author} • {}", display_date(created)),
        None => format!("By {author}"),
    }
}
