use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::{require_player_access, require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::{CreateAssessmentRequest, PhysicalAssessment, UpdateAssessmentRequest};
use crate::services::{AssessmentService, PlayerService};

/// Item-level routes, nested at `/assessments`.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/:id",
        get(get_assessment)
            .put(update_assessment)
            .delete(delete_assessment),
    )
}

/// Player-scoped routes, merged into the `/players` router.
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:id/assessments",
            get(list_for_player).post(create_assessment),
        )
        .route("/:id/assessments/latest", get(latest_for_player))
}

async fn create_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<CreateAssessmentRequest>,
) -> Result<(StatusCode, Json<PhysicalAssessment>), ApiError> {
    require_staff(&session)?;
    if PlayerService::new(state.db.clone())
        .get_player(player_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("player"));
    }

    let assessment = AssessmentService::new(state.db.clone())
        .create_assessment(player_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

async fn list_for_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Vec<PhysicalAssessment>>, ApiError> {
    require_player_access(&session, player_id)?;
    let assessments = AssessmentService::new(state.db.clone())
        .list_for_player(player_id)
        .await?;
    Ok(Json(assessments))
}

async fn latest_for_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<PhysicalAssessment>, ApiError> {
    require_player_access(&session, player_id)?;
    let assessment = AssessmentService::new(state.db.clone())
        .latest_for_player(player_id)
        .await?
        .ok_or(ApiError::NotFound("assessment"))?;
    Ok(Json(assessment))
}

async fn get_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(assessment_id): Path<Uuid>,
) -> Result<Json<PhysicalAssessment>, ApiError> {
    let assessment = AssessmentService::new(state.db.clone())
        .get_assessment(assessment_id)
        .await?
        .ok_or(ApiError::NotFound("assessment"))?;
    require_player_access(&session, assessment.player_id)?;
    Ok(Json(assessment))
}

async fn update_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(assessment_id): Path<Uuid>,
    Json(request): Json<UpdateAssessmentRequest>,
) -> Result<Json<PhysicalAssessment>, ApiError> {
    require_staff(&session)?;
    let assessment = AssessmentService::new(state.db.clone())
        .update_assessment(assessment_id, request)
        .await?
        .ok_or(ApiError::NotFound("assessment"))?;
    Ok(Json(assessment))
}

async fn delete_assessment(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(assessment_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&session)?;
    let deleted = AssessmentService::new(state.db.clone())
        .delete_assessment(assessment_id)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("assessment"))
    }
}
