use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::{require_staff, ApiError, AppState};
use crate::auth::{UserRole, UserSession};
use crate::models::{
    Booking, BookingQuery, CancelBookingRequest, CreateBookingRequest, UpdateBookingRequest,
};
use crate::services::{bookings_to_csv, bookings_to_ics, BookingService, ExportService};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/export.csv", get(export_csv))
        .route("/calendar.ics", get(export_ics))
        .route(
            "/:id",
            get(get_booking).put(update_booking).delete(delete_booking),
        )
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/complete", post(complete_booking))
}

fn booking_service(state: &AppState) -> BookingService {
    BookingService::new(state.db.clone(), state.email.clone())
}

fn can_view_booking(session: &UserSession, booking: &Booking) -> bool {
    session.role.is_staff()
        || booking.coach_id == session.user_id
        || session.player_ids.contains(&booking.player_id)
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<BookingQuery>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let bookings = booking_service(&state).list_bookings(&query).await?;
    let bookings = bookings
        .into_iter()
        .filter(|b| can_view_booking(&session, b))
        .collect();
    Ok(Json(bookings))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    require_staff(&session)?;

    let coach_id = request.coach_id.unwrap_or(session.user_id);
    if coach_id != session.user_id && session.role != UserRole::Admin {
        return Err(ApiError::Forbidden);
    }

    let booking = booking_service(&state)
        .create_booking(coach_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    let booking = booking_service(&state)
        .get_booking(booking_id)
        .await?
        .ok_or(ApiError::NotFound("booking"))?;
    if !can_view_booking(&session, &booking) {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(booking))
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    require_staff(&session)?;
    let booking = booking_service(&state)
        .update_booking(booking_id, request)
        .await?;
    Ok(Json(booking))
}

async fn delete_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_staff(&session)?;
    let deleted = booking_service(&state).delete_booking(booking_id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("booking"))
    }
}

async fn confirm_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    require_staff(&session)?;
    let booking = booking_service(&state).confirm(booking_id).await?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
    Json(request): Json<CancelBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    let service = booking_service(&state);
    let booking = service
        .get_booking(booking_id)
        .await?
        .ok_or(ApiError::NotFound("booking"))?;
    // Guardians may cancel sessions for their own players.
    if !can_view_booking(&session, &booking) {
        return Err(ApiError::Forbidden);
    }

    let booking = service.cancel(booking_id, request).await?;
    Ok(Json(booking))
}

async fn complete_booking(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Booking>, ApiError> {
    require_staff(&session)?;
    let booking = booking_service(&state).complete(booking_id).await?;
    Ok(Json(booking))
}

async fn export_csv(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(query): Query<BookingQuery>,
) -> Result<Response, ApiError> {
    require_staff(&session)?;
    let rows = ExportService::new(state.db.clone())
        .booking_export_rows(&query)
        .await?;
    let csv = bookings_to_csv(&rows)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

async fn export_ics(
    State(state): State<AppState>,
    Extension(session): Extension<UserSession>,
    Query(mut query): Query<BookingQuery>,
) -> Result<Response, ApiError> {
    // Guardians get their coach-facing view scoped to themselves.
    if !session.role.is_staff() {
        return Err(ApiError::Forbidden);
    }
    if session.role == UserRole::Coach && query.coach_id.is_none() {
        query.coach_id = Some(session.user_id);
    }

    let rows = ExportService::new(state.db.clone())
        .booking_export_rows(&query)
        .await?;
    let ics = bookings_to_ics(&rows, Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"bookings.ics\"",
            ),
        ],
        ics,
    )
        .into_response())
}
