use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};

use crate::api::{require_staff, ApiError, AppState};
use crate::auth::UserSession;
use crate::models::BulkOutcome;
use crate::services::{ImportService, PLAYERS_CSV_TEMPLATE};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players", post(import_players))
        .route("/players/template", get(players_template))
}

async fn import_players(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    mut multipart: Multipart,
) -> Result<Json<BulkOutcome>, ApiError> {
    require_staff(&session)?;

    let mut data: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("could not read upload: {e}")))?
    {
        if field.name() == Some("file") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("could not read file: {e}")))?
                    .to_vec(),
            );
        }
    }

    let data = data.ok_or_else(|| {
        ApiError::Validation("multipart field 'file' with the CSV is required".to_string())
    })?;
    if data.is_empty() {
        return Err(ApiError::Validation("uploaded file is empty".to_string()));
    }

    let outcome = ImportService::new(state.db.clone())
        .import_players(&data)
        .await?;
    Ok(Json(outcome))
}

async fn players_template(
    Extension(session): Extension<UserSession>,
) -> Result<Response, ApiError> {
    require_staff(&session)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"players_import_template.csv\"",
            ),
        ],
        PLAYERS_CSV_TEMPLATE,
    )
        .into_response())
}
