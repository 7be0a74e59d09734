use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::{ApiError, AppState};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, LoginRequest, RefreshTokenRequest,
    RegisterRequest, TokenResponse, UserInfo, UserSession,
};
use crate::models::{
    BulkOutcome, BulkRoleEditRequest, InviteUserRequest, LinkPlayersRequest, SetRoleRequest,
    UserQuery, UserResponse,
};
use crate::services::UserService;

/// Public authentication routes, nested at `/api/auth`.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Self-service account routes; the JWT layer is applied in
/// `routes::create_routes`.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/change-password", post(change_password))
}

/// Admin-only user administration, nested at `/api/admin`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/invite", post(invite_user))
        .route("/users/bulk-roles", post(bulk_set_roles))
        .route("/users/:id/role", put(set_role))
        .route("/users/:id/players", put(link_players))
        .route("/users/:id/deactivate", post(deactivate_user))
        .route("/users/:id/activate", post(activate_user))
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = state.auth.login(request).await?;
    Ok(Json(response))
}

async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let response = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(response))
}

async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<UserInfo>, AuthError> {
    let info = state.auth.get_user_info(session.user_id).await?;
    Ok(Json(info))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AuthError> {
    state.auth.change_password(session.user_id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn user_service(state: &AppState) -> UserService {
    UserService::new(state.db.clone(), state.email.clone())
}

async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = user_service(&state).list_users(&query).await?;
    Ok(Json(users))
}

async fn set_role(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user_service(&state)
        .set_role(user_id, request.role)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

async fn bulk_set_roles(
    State(state): State<AppState>,
    Json(request): Json<BulkRoleEditRequest>,
) -> Result<Json<BulkOutcome>, ApiError> {
    if request.changes.is_empty() {
        return Err(ApiError::Validation("no role changes given".to_string()));
    }
    let outcome = user_service(&state).bulk_set_roles(request).await?;
    Ok(Json(outcome))
}

async fn link_players(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<LinkPlayersRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user_service(&state)
        .link_players(user_id, request.player_ids)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

async fn deactivate_user(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    if user_id == session.user_id {
        return Err(ApiError::Validation(
            "you cannot deactivate your own account".to_string(),
        ));
    }
    let user = user_service(&state)
        .set_active(user_id, false)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

async fn activate_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user_service(&state)
        .set_active(user_id, true)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(user))
}

async fn invite_user(
    State(state): State<AppState>,
    Json(request): Json<InviteUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = user_service(&state)
        .invite(request, &state.config.public_url)
        .await?
        .ok_or_else(|| ApiError::Conflict("email already exists".to_string()))?;
    Ok((StatusCode::CREATED, Json(user)))
}
