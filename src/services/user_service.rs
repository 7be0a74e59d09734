use anyhow::Result;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::UserRole;
use crate::models::{
    BulkOutcome, BulkRoleEditRequest, InviteUserRequest, RowFailure, User, UserQuery, UserResponse,
};
use crate::services::{EmailContext, EmailKind, EmailService};

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, player_ids, \
                            active, invite_token, created_at, updated_at";

/// Administrative user management: directory, roles, guardian links and
/// invitations. Self-service account flows live in the auth service.
#[derive(Clone)]
pub struct UserService {
    db: PgPool,
    email: Arc<EmailService>,
}

impl UserService {
    pub fn new(db: PgPool, email: Arc<EmailService>) -> Self {
        Self { db, email }
    }

    pub async fn list_users(&self, query: &UserQuery) -> Result<Vec<UserResponse>> {
        let limit = query.limit.unwrap_or(100).min(500);
        let offset = query.offset.unwrap_or(0);

        let mut sql = format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1");
        let mut param_count = 1;

        if query.role.is_some() {
            sql.push_str(&format!(" AND role = ${param_count}"));
            param_count += 1;
        }
        if query.active.is_some() {
            sql.push_str(&format!(" AND active = ${param_count}"));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (email ILIKE ${param_count} OR first_name ILIKE ${param_count} \
                 OR last_name ILIKE ${param_count})"
            ));
        }

        sql.push_str(" ORDER BY last_name, first_name");
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));

        let mut query_builder = sqlx::query_as::<_, User>(&sql);
        if let Some(role) = query.role {
            query_builder = query_builder.bind(role.as_str());
        }
        if let Some(active) = query.active {
            query_builder = query_builder.bind(active);
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(format!("%{search}%"));
        }

        let users = query_builder.fetch_all(&self.db).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<Option<UserResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;
        Ok(user.map(UserResponse::from))
    }

    /// Apply role changes one by one, collecting per-row failures. Rows
    /// already applied stay applied.
    pub async fn bulk_set_roles(&self, request: BulkRoleEditRequest) -> Result<BulkOutcome> {
        let mut applied = 0;
        let mut failed = Vec::new();

        for (row, change) in request.changes.iter().enumerate() {
            match self.set_role(change.user_id, change.role).await {
                Ok(Some(_)) => applied += 1,
                Ok(None) => failed.push(RowFailure {
                    row,
                    error: format!("unknown user {}", change.user_id),
                }),
                Err(e) => failed.push(RowFailure {
                    row,
                    error: e.to_string(),
                }),
            }
        }

        Ok(BulkOutcome { applied, failed })
    }

    pub async fn link_players(
        &self,
        user_id: Uuid,
        player_ids: Vec<Uuid>,
    ) -> Result<Option<UserResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET player_ids = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(&player_ids)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;
        Ok(user.map(UserResponse::from))
    }

    pub async fn set_active(&self, user_id: Uuid, active: bool) -> Result<Option<UserResponse>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET active = $2, updated_at = $3 WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(active)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;
        Ok(user.map(UserResponse::from))
    }

    /// Create an inactive account with a random invite token and email
    /// the signup link. Returns None when the email is already taken.
    pub async fn invite(
        &self,
        request: InviteUserRequest,
        public_url: &str,
    ) -> Result<Option<UserResponse>> {
        let email = request.email.to_lowercase();
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(40)
            .map(char::from)
            .collect();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users \
             (email, password_hash, first_name, last_name, role, active, invite_token, updated_at) \
             VALUES ($1, '', $2, $3, $4, FALSE, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.role.as_str())
        .bind(&token)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        let context = EmailContext {
            recipient_name: user.first_name.clone(),
            invite_url: format!("{public_url}/invite/{token}"),
            club_name: "Pitchside".to_string(),
            ..Default::default()
        };
        if let Err(e) = self.email.send(EmailKind::Invitation, &user.email, &context).await {
            tracing::warn!("failed to send invitation to {}: {e}", user.email);
        }

        Ok(Some(user.into()))
    }
}
