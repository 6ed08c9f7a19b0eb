//! Client state: session, listing, search and pagination.

pub mod location;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod search;
pub mod session;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;
