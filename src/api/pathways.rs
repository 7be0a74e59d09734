use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::{require_player_access, require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::{
    AddEventRequest, AddModuleRequest, DevelopmentPathway, UpdateModuleRequest,
    UpsertSkillRequest, SKILL_LEVEL_MAX, SKILL_LEVEL_MIN,
};
use crate::services::{PathwayService, PlayerService};

/// Pathway routes, merged into the `/players` router.
pub fn player_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/pathway", get(get_pathway))
        .route("/:id/pathway/modules", post(add_module))
        .route(
            "/:id/pathway/modules/:module_id",
            put(update_module).delete(remove_module),
        )
        .route("/:id/pathway/skills", put(upsert_skill))
        .route("/:id/pathway/skills/:skill", delete(remove_skill))
        .route("/:id/pathway/events", post(add_event))
        .route("/:id/pathway/events/:event_id", delete(remove_event))
}

async fn known_player(state: &AppState, player_id: Uuid) -> Result<(), ApiError> {
    if PlayerService::new(state.db.clone())
        .get_player(player_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("player"));
    }
    Ok(())
}

async fn get_pathway(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_player_access(&session, player_id)?;
    known_player(&state, player_id).await?;
    let pathway = PathwayService::new(state.db.clone())
        .get_or_create(player_id)
        .await?;
    Ok(Json(pathway))
}

async fn add_module(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<AddModuleRequest>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("module title is required".to_string()));
    }
    let pathway = PathwayService::new(state.db.clone())
        .add_module(player_id, request)
        .await?;
    Ok(Json(pathway))
}

async fn update_module(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, module_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateModuleRequest>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    let pathway = PathwayService::new(state.db.clone())
        .update_module(player_id, module_id, request)
        .await?
        .ok_or(ApiError::NotFound("training module"))?;
    Ok(Json(pathway))
}

async fn remove_module(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, module_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    let pathway = PathwayService::new(state.db.clone())
        .remove_module(player_id, module_id)
        .await?
        .ok_or(ApiError::NotFound("training module"))?;
    Ok(Json(pathway))
}

async fn upsert_skill(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<UpsertSkillRequest>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    if request.skill.trim().is_empty() {
        return Err(ApiError::Validation("skill name is required".to_string()));
    }
    if !(SKILL_LEVEL_MIN..=SKILL_LEVEL_MAX).contains(&request.level) {
        return Err(ApiError::Validation(format!(
            "skill level must be between {SKILL_LEVEL_MIN} and {SKILL_LEVEL_MAX}"
        )));
    }
    let pathway = PathwayService::new(state.db.clone())
        .upsert_skill(player_id, request)
        .await?;
    Ok(Json(pathway))
}

async fn remove_skill(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, skill)): Path<(Uuid, String)>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    let pathway = PathwayService::new(state.db.clone())
        .remove_skill(player_id, &skill)
        .await?
        .ok_or(ApiError::NotFound("skill entry"))?;
    Ok(Json(pathway))
}

async fn add_event(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
    Json(request): Json<AddEventRequest>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("event name is required".to_string()));
    }
    if let Some(ends_on) = request.ends_on {
        if ends_on < request.starts_on {
            return Err(ApiError::Validation(
                "event cannot end before it starts".to_string(),
            ));
        }
    }
    let pathway = PathwayService::new(state.db.clone())
        .add_event(player_id, request)
        .await?;
    Ok(Json(pathway))
}

async fn remove_event(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path((player_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DevelopmentPathway>, ApiError> {
    require_staff(&session)?;
    known_player(&state, player_id).await?;
    let pathway = PathwayService::new(state.db.clone())
        .remove_event(player_id, event_id)
        .await?
        .ok_or(ApiError::NotFound("event"))?;
    Ok(Json(pathway))
}
