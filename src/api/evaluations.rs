use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::{require_player_access, require_staff, ApiError, AppState};
use crate::auth::{UserRole, UserSession};
use crate::models::{
    rating_in_range, CreateEvaluationRequest, Evaluation, EvaluationSummary,
    UpdateEvaluationRequest, RATING_MAX, RATING_MIN,
};
use crate::services::{EvaluationService, PlayerService};

/// Item-level routes, nested at `/evaluations`.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/:id",
        get(get_evaluation)
            .put(update_evaluation)
            .delete(delete_evaluation),
    )
}

/// Player-scoped routes, merged into the `/players` router.
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/evaluations",
            get(list_for_player).post(create_evaluation),
        )
        .route("/:id/evaluations/summary", get(summary_for_player))
}

fn check_ratings(ratings: &[Option<i16>]) -> Result<(), ApiError> {
    for rating in ratings.iter().flatten() {
        if !rating_in_range(*rating) {
            return Err(ApiError::Validation(format!(
                "ratings must be between {RATING_MIN} and {RATING_MAX}, got {rating}"
            )));
        }
    }
    Ok(())
}

async fn create_evaluation(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<CreateEvaluationRequest>,
) -> Result<(StatusCode, Json<Evaluation>), ApiError> {
    require_staff(&session)?;
    check_ratings(&[
        Some(request.mental),
        Some(request.technical),
        Some(request.defending),
        Some(request.attacking),
    ])?;
    if PlayerService::new(state.db.clone())
        .get_player(player_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("player"));
    }

    let evaluation = EvaluationService::new(state.db.clone())
        .create_evaluation(player_id, session.user_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(evaluation)))
}

async fn list_for_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Vec<Evaluation>>, ApiError> {
    require_player_access(&session, player_id)?;
    let evaluations = EvaluationService::new(state.db.clone())
        .list_for_player(player_id)
        .await?;
    Ok(Json(evaluations))
}

async fn summary_for_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<EvaluationSummary>, ApiError> {
    require_player_access(&session, player_id)?;
    let summary = EvaluationService::new(state.db.clone())
        .summary_for_player(player_id)
        .await?;
    Ok(Json(summary))
}

async fn get_evaluation(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(evaluation_id): Path<Uuid>,
) -> Result<Json<Evaluation>, ApiError> {
    let evaluation = EvaluationService::new(state.db.clone())
        .get_evaluation(evaluation_id)
        .await?
        .ok_or(ApiError::NotFound("evaluation"))?;
    require_player_access(&session, evaluation.player_id)?;
    Ok(Json(evaluation))
}

/// Only the evaluating coach or an admin may change an evaluation.
fn check_author(session: &UserSession, evaluation: &Evaluation) -> Result<(), ApiError> {
    if session.role == UserRole::Admin || session.user_id == evaluation.coach_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

async fn update_evaluation(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(evaluation_id): Path<Uuid>,
    Json(request): Json<UpdateEvaluationRequest>,
) -> Result<Json<Evaluation>, ApiError> {
    require_staff(&session)?;
    check_ratings(&[
        request.mental,
        request.technical,
        request.defending,
        request.attacking,
    ])?;

    let service = EvaluationService::new(state.db.clone());
    let existing = service
        .get_evaluation(evaluation_id)
        .await?
        .ok_or(ApiError::NotFound("evaluation"))?;
    check_author(&session, &existing)?;

    let evaluation = service
        .update_evaluation(evaluation_id, request)
        .await?
        .ok_or(ApiError::NotFound("evaluation"))?;
    Ok(Json(evaluation))
}

async fn delete_evaluation(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(evaluation_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&session)?;
    let service = EvaluationService::new(state.db.clone());
    let existing = service
        .get_evaluation(evaluation_id)
        .await?
        .ok_or(ApiError::NotFound("evaluation"))?;
    check_author(&session, &existing)?;

    service.delete_evaluation(evaluation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
