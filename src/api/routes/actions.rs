//! Action Routes
//!
//! - POST /_action - Apply a delegated page event
//!
//! Answers with the changed regions, the title and how the browser history
//! should follow.

use axum::{extract::State, Json};

use crate::api::error::ShellResult;
use crate::api::state::ShellState;
use crate::events::{self, DelegatedEvent, Outcome};

/// POST /_action
pub async fn dispatch_action(
    State(state): State<ShellState>,
    Json(event): Json<DelegatedEvent>,
) -> ShellResult<Json<Outcome>> {
    let mut router = state.router.lock().await;
    let outcome = events::handle(&mut router, &event).await?;

    tracing::debug!(
        action = %event.action,
        path = %outcome.navigation.path,
        regions = outcome.navigation.patch.regions.len(),
        "Action applied"
    );

    Ok(Json(outcome))
}
