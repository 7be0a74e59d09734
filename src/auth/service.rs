use anyhow::anyhow;
use chrono::Utc;
use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, JwtService, LoginRequest, RegisterRequest,
    TokenResponse, UserInfo, UserRole, UserSession,
};
use crate::models::User;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, player_ids, \
                            active, invite_token, created_at, updated_at";

#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str) -> Self {
        Self {
            db,
            jwt: JwtService::new(jwt_secret),
        }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        validate_email(&request.email)?;
        validate_password_strength(&request.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        let email = request.email.to_lowercase();
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let role = request.role.unwrap_or(UserRole::Guardian);
        let password_hash = hash_password(&request.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, role, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        self.auth_response(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = self
            .find_by_email(&request.email.to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        self.auth_response(user)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let claims = self.jwt.validate_token(refresh_token)?;
        let user_id = parse_user_id(&claims.sub)?;
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        let role = parse_role(&user.role)?;
        let access_token = self.jwt.create_access_token(user.id, &user.email, role)?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_ttl_secs(),
        })
    }

    pub async fn get_user_info(&self, user_id: Uuid) -> Result<UserInfo, AuthError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        user_info(user)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !verify_password(&request.current_password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        validate_password_strength(&request.new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        let password_hash = hash_password(&request.new_password)?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(user_id)
            .bind(&password_hash)
            .bind(Utc::now())
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Validate a bearer token and load the live account behind it.
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.jwt.validate_token(token)?;
        let user_id = parse_user_id(&claims.sub)?;
        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.active {
            return Err(AuthError::AccountInactive);
        }

        Ok(UserSession {
            user_id: user.id,
            email: user.email,
            role: parse_role(&user.role)?,
            player_ids: user.player_ids,
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.db)
                .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(user)
    }

    fn auth_response(&self, user: User) -> Result<AuthResponse, AuthError> {
        let role = parse_role(&user.role)?;
        let access_token = self.jwt.create_access_token(user.id, &user.email, role)?;
        let refresh_token = self.jwt.create_refresh_token(user.id, &user.email, role)?;
        let expires_in = self.jwt.access_token_ttl_secs();

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user_info(user)?,
        })
    }
}

fn user_info(user: User) -> Result<UserInfo, AuthError> {
    let role = parse_role(&user.role)?;
    Ok(UserInfo {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role,
        player_ids: user.player_ids,
        created_at: user.created_at,
        updated_at: user.updated_at,
    })
}

fn parse_role(role: &str) -> Result<UserRole, AuthError> {
    UserRole::from_str(role).ok_or_else(|| AuthError::Internal(anyhow!("unknown role: {role}")))
}

fn parse_user_id(sub: &str) -> Result<Uuid, AuthError> {
    Uuid::parse_str(sub).map_err(|_| AuthError::InvalidToken)
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| AuthError::Internal(anyhow!(e)))?;
    if pattern.is_match(email) {
        Ok(())
    } else {
        Err(AuthError::EmailValidation(format!(
            "not a valid email address: {email}"
        )))
    }
}
