use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;

use crate::api::{require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::BulkOutcome;
use crate::services::{AssignmentRequest, TryoutBoard, TryoutService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/board", get(board))
        .route("/assignments", post(apply_assignments))
}

#[derive(Debug, Deserialize)]
struct BoardQuery {
    /// Restrict the unassigned pool to tryout-status players.
    #[serde(default)]
    tryout_only: bool,
}

async fn board(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<TryoutBoard>, ApiError> {
    require_staff(&session)?;
    let board = TryoutService::new(state.db.clone())
        .board(query.tryout_only)
        .await?;
    Ok(Json(board))
}

async fn apply_assignments(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<AssignmentRequest>,
) -> Result<Json<BulkOutcome>, ApiError> {
    require_staff(&session)?;
    if request.moves.is_empty() {
        return Err(ApiError::Validation("no moves given".to_string()));
    }
    let outcome = TryoutService::new(state.db.clone())
        .apply_assignments(request)
        .await?;
    Ok(Json(outcome))
}
