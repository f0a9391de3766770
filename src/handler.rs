//! HTTP request handlers
//!
//! Thin glue between axum and [`Shortener`](crate::service::Shortener):
//! extract, call, serialize. Business rules live in the service and store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::error::{ShortenError, StoreError};
use crate::model::{Link, ShortenRequest, ShortenResponse};
use crate::route::AppState;

/// Error body returned by every endpoint: `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "Short URL not found"),
            StoreError::AlreadyExists(code) => Self::new(
                StatusCode::CONFLICT,
                format!("Short code already exists: {code}"),
            ),
            StoreError::Persistence(e) => {
                error!(error = %e, "persistence failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save link")
            }
        }
    }
}

impl From<ShortenError> for ApiError {
    fn from(err: ShortenError) -> Self {
        match err {
            ShortenError::EmptyUrl => Self::new(StatusCode::BAD_REQUEST, "URL is required"),
            ShortenError::Exhausted { attempts } => {
                error!(attempts, "no free short code found");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Could not allocate a short code, try again",
                )
            }
            ShortenError::Store(e) => e.into(),
        }
    }
}

/// Runs a store call that may write to disk on tokio's blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!(error = %e, "store task failed");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    })
}

/// `POST /api/shorten`
///
/// - **201 Created** - body is a [`ShortenResponse`]
/// - **400 Bad Request** - malformed body or empty `url`
/// - **500 Internal Server Error** - the link could not be persisted
/// - **503 Service Unavailable** - every generated code collided
pub async fn shorten_url(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), ApiError> {
    let Json(request) =
        payload.map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Invalid request body"))?;

    let shortener = state.shortener;
    let created = blocking(move || shortener.shorten(&request.url)).await??;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /{code}`
///
/// Counts a click and answers **302 Found** pointing at the original URL,
/// or **404 Not Found** for unknown codes. A click that cannot be persisted
/// is logged and the redirect is still served.
pub async fn redirect_url(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let shortener = state.shortener;
    let link = blocking(move || shortener.resolve(&code)).await??;
    Ok((StatusCode::FOUND, [(header::LOCATION, link.original_url)]).into_response())
}

/// `GET /api/stats/{code}` - the full link record.
pub async fn get_stats(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Link>, ApiError> {
    Ok(Json(state.shortener.stats(&code)?))
}

/// `GET /api/links` - every stored link, newest first.
pub async fn list_links(State(state): State<AppState>) -> Json<Vec<Link>> {
    let mut links = state.shortener.list();
    links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(links)
}
