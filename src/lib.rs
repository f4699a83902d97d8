// Library exports for travel-blog
// The binary and the integration tests both build on these modules

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod feed;
pub mod forms;
pub mod media;
pub mod pagination;
pub mod relations;
pub mod routes;
pub mod state;
pub mod timefmt;

use axum::Router;

use crate::state::AppState;

/// The full HTTP application.
pub fn app(state: AppState) -> Router {
    routes::router(state)
}
