//! Plain-text renderings of the listing, detail and session views.

use std::fmt::Write as _;

use crate::application::pagination::{PageItem, Pagination};
use crate::application::posts::{PostListView, can_modify};
use crate::domain::posts::{Post, byline, display_date, preview};
use crate::domain::session::{AuthSession, User};

const RULE: &str = "----------------------------------------";

pub fn render_user(user: &User) -> String {
    if user.email.is_empty() {
        format!("{} (id {})", user.username, user.id)
    } else {
        format!("{} <{}> (id {})", user.username, user.email, user.id)
    }
}

/// One listing card: title, byline, preview and, for the author, actions.
pub fn render_card(post: &Post, session: Option<&AuthSession>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", post.id, post.title);
    let _ = writeln!(out, "   {}", byline(post));
    if let Some(image) = post.image_url.as_deref() {
        let _ = writeln!(out, "   [image] {image}");
    }
    let _ = writeln!(out, "   {}", preview(&post.content));
    if can_modify(session, post) {
        let _ = writeln!(out, "   actions: edit | delete");
    }
    out
}

/// Page strip, e.g. `« prev  1 … 4 [5] 6 … 10  next »`.
pub fn render_pagination(pagination: &Pagination) -> String {
    let mut parts = Vec::with_capacity(pagination.links.len() + 2);
    if pagination.previous.is_some() {
        parts.push("« prev".to_string());
    }
    for link in &pagination.links {
        parts.push(match link.item {
            PageItem::Page(page) if link.is_current => format!("[{page}]"),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis(_) => "…".to_string(),
        });
    }
    if pagination.next.is_some() {
        parts.push("next »".to_string());
    }

    let mut out = parts.join(" ");
    out.push('\n');
    if let Some(previous) = pagination.previous.as_deref() {
        let _ = writeln!(out, "  prev: {previous}");
    }
    if let Some(next) = pagination.next.as_deref() {
        let _ = writeln!(out, "  next: {next}");
    }
    out
}

pub fn render_list(view: &PostListView, session: Option<&AuthSession>) -> String {
    if view.is_loading() {
        return "Loading...\n".to_string();
    }
    if let Some(error) = view.error() {
        return format!("Error: {error}\n");
    }
    if let Some(message) = view.empty_message() {
        return format!("{message}\n");
    }

    let mut out = String::new();
    if !view.query().search.is_empty() {
        let _ = writeln!(out, "Results for \"{}\"", view.query().search);
    }
    for post in view.posts() {
        out.push_str(&render_card(post, session));
        out.push('\n');
    }
    if let Some(pagination) = view.pagination() {
        out.push_str(&render_pagination(&pagination));
    }
    out
}

/// Full post page.
pub fn render_detail(post: &Post, session: Option<&AuthSession>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", post.title);
    let _ = writeln!(out, "{RULE}");
    let author = post.owner_username().unwrap_or("Unknown");
    let _ = writeln!(out, "Author: {author}");
    if let Some(created) = post.created_at.as_deref() {
        let _ = writeln!(out, "Date: {}", display_date(created));
    }
    if let Some(image) = post.image_url.as_deref() {
        let _ = writeln!(out, "Image: {image}");
    }
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", post.content);
    if can_modify(session, post) {
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "You wrote this post: edit | delete");
    }
    out
}
