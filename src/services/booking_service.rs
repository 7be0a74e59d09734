use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::{
    slots_overlap, Booking, BookingQuery, BookingStatus, CancelBookingRequest,
    CreateBookingRequest, UpdateBookingRequest,
};
use crate::services::{EmailContext, EmailKind, EmailService};

const BOOKING_COLUMNS: &str = "id, coach_id, player_id, starts_at, ends_at, location, status, \
                               notes, cancellation_reason, reminder_sent_at, created_at, updated_at";

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Booking not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Slot conflict: {0}")]
    Conflict(String),
    #[error("Cannot move booking from {from} to {to}")]
    IllegalTransition { from: String, to: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct BookingService {
    db: PgPool,
    email: Arc<EmailService>,
}

impl BookingService {
    pub fn new(db: PgPool, email: Arc<EmailService>) -> Self {
        Self { db, email }
    }

    pub async fn create_booking(
        &self,
        coach_id: Uuid,
        request: CreateBookingRequest,
    ) -> Result<Booking, BookingError> {
        if request.ends_at <= request.starts_at {
            return Err(BookingError::Validation(
                "booking must end after it starts".to_string(),
            ));
        }

        self.check_overlap(coach_id, request.starts_at, request.ends_at, None)
            .await?;

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings (coach_id, player_id, starts_at, ends_at, location, notes, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(coach_id)
        .bind(request.player_id)
        .bind(request.starts_at)
        .bind(request.ends_at)
        .bind(request.location.unwrap_or_default())
        .bind(request.notes.unwrap_or_default())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid) -> Result<Option<Booking>, BookingError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(booking)
    }

    pub async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<Booking>, BookingError> {
        let limit = query.limit.unwrap_or(100).min(500);
        let offset = query.offset.unwrap_or(0);

        let mut sql = format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE 1=1");
        let mut param_count = 1;

        if query.coach_id.is_some() {
            sql.push_str(&format!(" AND coach_id = ${param_count}"));
            param_count += 1;
        }
        if query.player_id.is_some() {
            sql.push_str(&format!(" AND player_id = ${param_count}"));
            param_count += 1;
        }
        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${param_count}"));
            param_count += 1;
        }
        if query.from.is_some() {
            sql.push_str(&format!(" AND starts_at >= ${param_count}"));
            param_count += 1;
        }
        if query.to.is_some() {
            sql.push_str(&format!(" AND starts_at < ${param_count}"));
        }

        sql.push_str(" ORDER BY starts_at");
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));

        let mut query_builder = sqlx::query_as::<_, Booking>(&sql);
        if let Some(coach_id) = query.coach_id {
            query_builder = query_builder.bind(coach_id);
        }
        if let Some(player_id) = query.player_id {
            query_builder = query_builder.bind(player_id);
        }
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status.as_str());
        }
        if let Some(from) = query.from {
            query_builder = query_builder.bind(from);
        }
        if let Some(to) = query.to {
            query_builder = query_builder.bind(to);
        }

        let bookings = query_builder.fetch_all(&self.db).await?;
        Ok(bookings)
    }

    pub async fn update_booking(
        &self,
        booking_id: Uuid,
        request: UpdateBookingRequest,
    ) -> Result<Booking, BookingError> {
        let current = self
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let starts_at = request.starts_at.unwrap_or(current.starts_at);
        let ends_at = request.ends_at.unwrap_or(current.ends_at);
        if ends_at <= starts_at {
            return Err(BookingError::Validation(
                "booking must end after it starts".to_string(),
            ));
        }
        if starts_at != current.starts_at || ends_at != current.ends_at {
            self.check_overlap(current.coach_id, starts_at, ends_at, Some(booking_id))
                .await?;
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET starts_at = $2, ends_at = $3, \
                location = COALESCE($4, location), notes = COALESCE($5, notes), updated_at = $6 \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(request.location)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(booking)
    }

    pub async fn confirm(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        let booking = self
            .transition(booking_id, BookingStatus::Confirmed, None)
            .await?;
        self.notify(EmailKind::BookingConfirmed, &booking, "").await;
        Ok(booking)
    }

    pub async fn cancel(
        &self,
        booking_id: Uuid,
        request: CancelBookingRequest,
    ) -> Result<Booking, BookingError> {
        let reason = request.reason.unwrap_or_else(|| "not given".to_string());
        let booking = self
            .transition(booking_id, BookingStatus::Cancelled, Some(&reason))
            .await?;
        self.notify(EmailKind::BookingCancelled, &booking, &reason)
            .await;
        Ok(booking)
    }

    pub async fn complete(&self, booking_id: Uuid) -> Result<Booking, BookingError> {
        self.transition(booking_id, BookingStatus::Completed, None)
            .await
    }

    pub async fn delete_booking(&self, booking_id: Uuid) -> Result<bool, BookingError> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1")
            .bind(booking_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Confirmed bookings starting within the next 24 hours that have
    /// not been reminded yet.
    pub async fn due_reminders(&self, now: DateTime<Utc>) -> Result<Vec<Booking>, BookingError> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE status = 'confirmed' AND reminder_sent_at IS NULL \
               AND starts_at >= $1 AND starts_at < $2 \
             ORDER BY starts_at"
        ))
        .bind(now)
        .bind(now + Duration::hours(24))
        .fetch_all(&self.db)
        .await?;
        Ok(bookings)
    }

    pub async fn send_reminder(&self, booking: &Booking) -> Result<(), BookingError> {
        self.notify(EmailKind::BookingReminder, booking, "").await;
        sqlx::query("UPDATE bookings SET reminder_sent_at = $2, updated_at = $2 WHERE id = $1")
            .bind(booking.id)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;
        Ok(())
    }

    async fn transition(
        &self,
        booking_id: Uuid,
        next: BookingStatus,
        cancellation_reason: Option<&str>,
    ) -> Result<Booking, BookingError> {
        let current = self
            .get_booking(booking_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let from = BookingStatus::from_str(&current.status).ok_or_else(|| {
            BookingError::Validation(format!("booking has unknown status {}", current.status))
        })?;
        if !from.can_transition_to(next) {
            return Err(BookingError::IllegalTransition {
                from: from.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        let booking = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $2, \
                cancellation_reason = COALESCE($3, cancellation_reason), updated_at = $4 \
             WHERE id = $1 RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .bind(next.as_str())
        .bind(cancellation_reason)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(booking)
    }

    async fn check_overlap(
        &self,
        coach_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<(), BookingError> {
        let existing = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings \
             WHERE coach_id = $1 AND status <> 'cancelled' \
               AND starts_at < $3 AND ends_at > $2"
        ))
        .bind(coach_id)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_all(&self.db)
        .await?;

        for other in existing {
            if Some(other.id) == exclude {
                continue;
            }
            if slots_overlap(starts_at, ends_at, other.starts_at, other.ends_at) {
                return Err(BookingError::Conflict(format!(
                    "coach already has a booking from {} to {}",
                    other.starts_at, other.ends_at
                )));
            }
        }
        Ok(())
    }

    /// Send a booking email to the coach and every guardian linked to
    /// the player. Email failures are logged, never bubbled: a broken
    /// SMTP relay must not block the booking itself.
    async fn notify(&self, kind: EmailKind, booking: &Booking, reason: &str) {
        let recipients = match self.recipients(booking).await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!("could not resolve booking recipients: {e}");
                return;
            }
        };

        let player_name = recipients.player_name.clone();
        let coach_name = recipients.coach_name.clone();
        for (email, name) in recipients.addresses {
            let context = EmailContext {
                recipient_name: name,
                player_name: player_name.clone(),
                coach_name: coach_name.clone(),
                session_time: booking.starts_at.format("%Y-%m-%d %H:%M UTC").to_string(),
                location: booking.location.clone(),
                reason: reason.to_string(),
                club_name: "Pitchside".to_string(),
                ..Default::default()
            };
            if let Err(e) = self.email.send(kind, &email, &context).await {
                warn!("failed to send {kind:?} email to {email}: {e}");
            }
        }
    }

    async fn recipients(&self, booking: &Booking) -> Result<BookingRecipients, sqlx::Error> {
        let player = sqlx::query_as::<_, NameRow>(
            "SELECT first_name, last_name FROM players WHERE id = $1",
        )
        .bind(booking.player_id)
        .fetch_optional(&self.db)
        .await?;

        let coach = sqlx::query_as::<_, ContactRow>(
            "SELECT email, first_name, last_name FROM users WHERE id = $1",
        )
        .bind(booking.coach_id)
        .fetch_optional(&self.db)
        .await?;

        let guardians = sqlx::query_as::<_, ContactRow>(
            "SELECT email, first_name, last_name FROM users \
             WHERE active AND player_ids @> ARRAY[$1]::uuid[]",
        )
        .bind(booking.player_id)
        .fetch_all(&self.db)
        .await?;

        let mut addresses = Vec::new();
        let coach_name = match &coach {
            Some(c) => {
                addresses.push((c.email.clone(), c.first_name.clone()));
                format!("{} {}", c.first_name, c.last_name)
            }
            None => "the coach".to_string(),
        };
        for guardian in &guardians {
            addresses.push((guardian.email.clone(), guardian.first_name.clone()));
        }

        Ok(BookingRecipients {
            player_name: player
                .map(|p| format!("{} {}", p.first_name, p.last_name))
                .unwrap_or_else(|| "the player".to_string()),
            coach_name,
            addresses,
        })
    }
}

struct BookingRecipients {
    player_name: String,
    coach_name: String,
    addresses: Vec<(String, String)>,
}

#[derive(sqlx::FromRow)]
struct NameRow {
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    email: String,
    first_name: String,
    last_name: String,
}
