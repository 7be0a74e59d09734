use axum::{extract::State, response::Json, routing::post, Extension, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::{GoalStatus, Player, SkillArea};
use crate::services::{
    EvaluationService, PathwayService, PlayerPromptContext, PlayerService, SuggestionKind,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/goals", post(suggest_goals))
        .route("/training-modules", post(suggest_training_modules))
}

#[derive(Debug, Deserialize)]
struct SuggestGoalsRequest {
    player_id: Uuid,
    focus: Option<String>,
    /// When true the suggestions are appended to the player's goals.
    #[serde(default)]
    apply: bool,
}

#[derive(Debug, Deserialize)]
struct SuggestModulesRequest {
    player_id: Uuid,
    focus: Option<String>,
    focus_area: Option<SkillArea>,
    #[serde(default)]
    apply: bool,
}

#[derive(Debug, Serialize)]
struct SuggestionResponse {
    player_id: Uuid,
    suggestions: Vec<String>,
    applied: bool,
}

async fn prompt_context(
    state: &AppState,
    player: &Player,
    focus: Option<String>,
) -> Result<PlayerPromptContext, ApiError> {
    let latest = EvaluationService::new(state.db.clone())
        .list_for_player(player.id)
        .await?
        .into_iter()
        .next();

    let open_goals = player
        .goals
        .0
        .iter()
        .filter(|g| g.status == GoalStatus::Open)
        .map(|g| g.title.clone())
        .collect();

    let age_years = Utc::now()
        .date_naive()
        .years_since(player.date_of_birth)
        .unwrap_or(0) as i32;

    Ok(PlayerPromptContext {
        player_name: format!("{} {}", player.first_name, player.last_name),
        age_years,
        position: player.position.clone(),
        latest_ratings: latest.map(|e| [e.mental, e.technical, e.defending, e.attacking]),
        open_goals,
        focus,
    })
}

async fn suggest_goals(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<SuggestGoalsRequest>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    require_staff(&session)?;

    let players = PlayerService::new(state.db.clone());
    let player = players
        .get_player(request.player_id)
        .await?
        .ok_or(ApiError::NotFound("player"))?;

    let context = prompt_context(&state, &player, request.focus).await?;
    let suggestions = state
        .suggestions
        .suggest(SuggestionKind::Goals, &context)
        .await?;

    let applied = if request.apply {
        players
            .add_goal_titles(request.player_id, &suggestions)
            .await?;
        true
    } else {
        false
    };

    Ok(Json(SuggestionResponse {
        player_id: request.player_id,
        suggestions,
        applied,
    }))
}

async fn suggest_training_modules(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<SuggestModulesRequest>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    require_staff(&session)?;

    let players = PlayerService::new(state.db.clone());
    let player = players
        .get_player(request.player_id)
        .await?
        .ok_or(ApiError::NotFound("player"))?;

    let context = prompt_context(&state, &player, request.focus).await?;
    let suggestions = state
        .suggestions
        .suggest(SuggestionKind::TrainingModules, &context)
        .await?;

    let applied = if request.apply {
        let focus = request.focus_area.unwrap_or(SkillArea::Technical);
        PathwayService::new(state.db.clone())
            .add_module_titles(request.player_id, &suggestions, focus)
            .await?;
        true
    } else {
        false
    };

    Ok(Json(SuggestionResponse {
        player_id: request.player_id,
        suggestions,
        applied,
    }))
}
