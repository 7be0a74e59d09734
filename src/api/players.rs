use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::api::{require_player_access, require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::{
    AddGoalRequest, CreatePlayerRequest, PlayerQuery, PlayerResponse, UpdateGoalRequest,
    UpdatePlayerRequest,
};
use crate::services::PlayerService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_players).post(create_player))
        .route(
            "/:id",
            get(get_player).put(update_player).delete(delete_player),
        )
        .route("/:id/goals", post(add_goal))
        .route("/:id/goals/:goal_id", put(update_goal).delete(remove_goal))
}

async fn list_players(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<Vec<PlayerResponse>>, ApiError> {
    let players = PlayerService::new(state.db.clone())
        .list_players(&query)
        .await?;

    // Guardians only see the players linked to their account.
    let players = players
        .into_iter()
        .filter(|p| session.can_view_player(p.id))
        .map(PlayerResponse::from)
        .collect();

    Ok(Json(players))
}

async fn create_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreatePlayerRequest>, ApiError>,
) -> Result<(StatusCode, Json<PlayerResponse>), ApiError> {
    require_staff(&session)?;
    let player = PlayerService::new(state.db.clone())
        .create_player(request)
        .await?;
    Ok((StatusCode::CREATED, Json(player.into())))
}

async fn get_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<PlayerResponse>, ApiError> {
    require_player_access(&session, player_id)?;
    let player = PlayerService::new(state.db.clone())
        .get_player(player_id)
        .await?
        .ok_or(ApiError::NotFound("player"))?;
    Ok(Json(player.into()))
}

async fn update_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    require_staff(&session)?;
    let player = PlayerService::new(state.db.clone())
        .update_player(player_id, request)
        .await?
        .ok_or(ApiError::NotFound("player"))?;
    Ok(Json(player.into()))
}

async fn delete_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&session)?;
    let deleted = PlayerService::new(state.db.clone())
        .delete_player(player_id)
        .await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("player"))
    }
}

async fn add_goal(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<AddGoalRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    require_staff(&session)?;
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("goal title is required".to_string()));
    }
    let player = PlayerService::new(state.db.clone())
        .add_goal(player_id, request)
        .await?
        .ok_or(ApiError::NotFound("player"))?;
    Ok(Json(player.into()))
}

async fn update_goal(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, goal_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGoalRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    require_staff(&session)?;
    let player = PlayerService::new(state.db.clone())
        .update_goal(player_id, goal_id, request)
        .await?
        .ok_or(ApiError::NotFound("goal"))?;
    Ok(Json(player.into()))
}

async fn remove_goal(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, goal_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlayerResponse>, ApiError> {
    require_staff(&session)?;
    let player = PlayerService::new(state.db.clone())
        .remove_goal(player_id, goal_id)
        .await?
        .ok_or(ApiError::NotFound("goal"))?;
    Ok(Json(player.into()))
}
