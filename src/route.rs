//! Route definitions for the link shortener API

use axum::routing::{get, post};
use axum::Router;

use crate::handler::{get_stats, list_links, redirect_url, shorten_url};
use crate::service::Shortener;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub shortener: Shortener,
}

/// Creates the axum router with all routes configured
///
/// # Route Definitions
///
/// - `POST /api/shorten` - Creates a new short URL
/// - `GET /api/stats/{code}` - Returns the stored record for a code
/// - `GET /api/links` - Lists every stored link
/// - `GET /{code}` - Redirects to the original URL
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/shorten", post(shorten_url))
        .route("/stats/{code}", get(get_stats))
        .route("/links", get(list_links));

    Router::new()
        .route("/{code}", get(redirect_url))
        .nest("/api", api_routes)
        .with_state(state)
}
