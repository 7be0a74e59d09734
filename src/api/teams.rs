use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::api::{require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::{
    CreateTeamRequest, PlayerResponse, Team, TeamSummary, UpdateTeamRequest,
};
use crate::services::TeamService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/:id", get(get_team).put(update_team).delete(delete_team))
        .route("/:id/roster", get(roster))
}

async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<TeamSummary>>, ApiError> {
    let teams = TeamService::new(state.db.clone()).list_teams().await?;
    Ok(Json(teams))
}

async fn create_team(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateTeamRequest>, ApiError>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    require_staff(&session)?;
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("team name is required".to_string()));
    }
    let team = TeamService::new(state.db.clone()).create_team(request).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Team>, ApiError> {
    let team = TeamService::new(state.db.clone())
        .get_team(team_id)
        .await?
        .ok_or(ApiError::NotFound("team"))?;
    Ok(Json(team))
}

async fn update_team(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(team_id): Path<Uuid>,
    Json(request): Json<UpdateTeamRequest>,
) -> Result<Json<Team>, ApiError> {
    require_staff(&session)?;
    let team = TeamService::new(state.db.clone())
        .update_team(team_id, request)
        .await?
        .ok_or(ApiError::NotFound("team"))?;
    Ok(Json(team))
}

async fn delete_team(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(team_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&session)?;
    let deleted = TeamService::new(state.db.clone()).delete_team(team_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("team"))
    }
}

async fn roster(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> Result<Json<Vec<PlayerResponse>>, ApiError> {
    let service = TeamService::new(state.db.clone());
    if service.get_team(team_id).await?.is_none() {
        return Err(ApiError::NotFound("team"));
    }
    let players = service.roster(team_id).await?;
    Ok(Json(players.into_iter().map(PlayerResponse::from).collect()))
}
