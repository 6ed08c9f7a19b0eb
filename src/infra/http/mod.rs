//! HTTP adapters for the blog backend.

mod client;

pub use client::ApiClient;
