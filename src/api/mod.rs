// HTTP surface: one router module per resource

pub mod assessments;
pub mod bookings;
pub mod documents;
pub mod errors;
pub mod evaluations;
pub mod health;
pub mod imports;
pub mod pathways;
pub mod players;
pub mod routes;
pub mod suggestions;
pub mod teams;
pub mod tryouts;
pub mod users;

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthService, UserSession};
use crate::config::AppConfig;
use crate::services::{DocumentService, EmailService, SuggestionService};

pub use errors::ApiError;

/// Shared handler state. Everything here is cheap to clone; the heavier
/// services hang off `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth: AuthService,
    pub email: Arc<EmailService>,
    pub suggestions: Arc<SuggestionService>,
    pub documents: DocumentService,
    pub config: AppConfig,
}

/// Writes to club data are staff-only; guardians get read access to
/// their own players.
pub fn require_staff(session: &UserSession) -> Result<(), ApiError> {
    if session.role.is_staff() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub fn require_player_access(session: &UserSession, player_id: uuid::Uuid) -> Result<(), ApiError> {
    if session.can_view_player(player_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
