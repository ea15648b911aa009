//! Page Routes
//!
//! - GET /*path - Full page for a storefront location
//!
//! The location is rendered through the router, so a later action diffs
//! against exactly what the browser received.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};

use crate::api::state::ShellState;
use crate::events::prefetch;

/// GET /*path
///
/// Unknown locations still render the not-found view, with status 404, and
/// are not added to the history. Reloads replace the current entry.
pub async fn render_page(State(state): State<ShellState>, uri: Uri) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let mut router = state.router.lock().await;
    prefetch(&router, &path).await;
    let navigation = router.open(&path);
    let page = router.document().to_html();

    tracing::info!(path = %navigation.path, view = ?navigation.view, "Page served");

    let status = if navigation.found {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    };
    (status, Html(page)).into_response()
}
