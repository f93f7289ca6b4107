//! Meme marketplace backend: catalog storage plus the ranked views served
//! over it (keyword search, trending, tag popularity).
//!
//! The ranking modules ([`search`], [`trending`], [`tags`]) are pure
//! scan-then-rank transforms over records returned by a [`domain::CatalogStore`],
//! so they can be exercised against [`memory_store::InMemoryCatalogStore`].

use std::sync::Arc;

pub mod aws_clients;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod listing;
pub mod memory_store;
pub mod models;
pub mod pagination;
pub mod repositories;
pub mod routes;
pub mod search;
pub mod startup;
pub mod tags;
pub mod trending;

/// AppState holds shared resources for the web server.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn domain::CatalogStore>,
}
