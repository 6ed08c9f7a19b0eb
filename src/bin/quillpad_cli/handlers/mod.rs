#![deny(clippy::all, clippy::pedantic)]

pub mod auth;
pub mod browse;
pub mod images;
pub mod posts;
