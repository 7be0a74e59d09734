use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use bytes::Bytes;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::api::{require_player_access, require_staff, ApiError, AppState};
use crate::auth::{UserRole, UserSession};
use crate::models::DocumentResponse;
use crate::services::NewDocument;

/// Item-level routes, nested at `/documents`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload_document))
        .route("/:id", get(get_document).delete(delete_document))
        .route("/:id/download", get(download_document))
}

/// Player-scoped listing, merged into the `/players` router.
pub fn player_routes() -> Router<AppState> {
    Router::new().route("/:id/documents", get(list_for_player))
}

async fn upload_document(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    require_staff(&session)?;

    let mut file_name = None;
    let mut content_type = None;
    let mut data: Option<Bytes> = None;
    let mut player_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("could not read upload: {e}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                data = Some(field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("could not read file: {e}"))
                })?);
            }
            Some("player_id") => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("could not read player_id: {e}"))
                })?;
                let parsed = Uuid::parse_str(raw.trim()).map_err(|_| {
                    ApiError::Validation(format!("invalid player_id '{raw}'"))
                })?;
                player_id = Some(parsed);
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| {
        ApiError::Validation("multipart field 'file' is required".to_string())
    })?;

    let document = state
        .documents
        .store(NewDocument {
            player_id,
            uploaded_by: session.user_id,
            file_name: file_name.unwrap_or_else(|| "attachment".to_string()),
            content_type: content_type
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            data,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(document.into())))
}

async fn list_for_player(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(player_id): Path<Uuid>,
) -> Result<Json<Vec<DocumentResponse>>, ApiError> {
    require_player_access(&session, player_id)?;
    let documents = state.documents.list_for_player(player_id).await?;
    Ok(Json(
        documents.into_iter().map(DocumentResponse::from).collect(),
    ))
}

async fn get_document(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state
        .documents
        .get(document_id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;
    if let Some(player_id) = document.player_id {
        require_player_access(&session, player_id)?;
    }
    Ok(Json(document.into()))
}

async fn download_document(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(document_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let document = state
        .documents
        .get(document_id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;
    if let Some(player_id) = document.player_id {
        require_player_access(&session, player_id)?;
    }

    // Stream the file instead of buffering it in memory.
    let file = state.documents.open_content(&document).await?;
    let body = Body::from_stream(ReaderStream::new(file));

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        document.file_name.replace('"', "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

async fn delete_document(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(document_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let document = state
        .documents
        .get(document_id)
        .await?
        .ok_or(ApiError::NotFound("document"))?;

    // Admins and the original uploader may delete.
    if session.role != UserRole::Admin && document.uploaded_by != session.user_id {
        return Err(ApiError::Forbidden);
    }

    state.documents.delete(document_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
