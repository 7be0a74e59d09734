use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles for role-based access control
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Coach,
    Guardian,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Coach => "coach",
            UserRole::Guardian => "guardian",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "coach" => Some(UserRole::Coach),
            "guardian" => Some(UserRole::Guardian),
            _ => None,
        }
    }

    /// Check if this role may act on another role's resources
    pub fn can_access(&self, target_role: &UserRole) -> bool {
        match self {
            UserRole::Admin => true,
            UserRole::Coach => matches!(target_role, UserRole::Coach | UserRole::Guardian),
            UserRole::Guardian => matches!(target_role, UserRole::Guardian),
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Coach)
    }
}

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // Subject (user ID)
    pub email: String,  // User email
    pub role: UserRole, // User role
    pub exp: usize,     // Expiration time
    pub iat: usize,     // Issued at
    pub jti: String,    // JWT ID
}

/// The request's authenticated identity, attached by the auth middleware
/// and handed to every handler. Pages never re-derive "who am I" on
/// their own.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Players this account is linked to (guardians).
    pub player_ids: Vec<Uuid>,
}

impl UserSession {
    pub fn can_view_player(&self, player_id: Uuid) -> bool {
        self.role.is_staff() || self.player_ids.contains(&player_id)
    }
}

/// Authentication request models
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<UserRole>, // Optional, defaults to Guardian
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Authentication response models
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub player_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_accesses_everything() {
        assert!(UserRole::Admin.can_access(&UserRole::Admin));
        assert!(UserRole::Admin.can_access(&UserRole::Coach));
        assert!(UserRole::Admin.can_access(&UserRole::Guardian));
    }

    #[test]
    fn guardian_is_scoped_to_guardians() {
        assert!(!UserRole::Guardian.can_access(&UserRole::Coach));
        assert!(!UserRole::Guardian.can_access(&UserRole::Admin));
        assert!(UserRole::Guardian.can_access(&UserRole::Guardian));
    }

    #[test]
    fn session_player_visibility() {
        let player = Uuid::new_v4();
        let other = Uuid::new_v4();
        let guardian = UserSession {
            user_id: Uuid::new_v4(),
            email: "g@example.com".to_string(),
            role: UserRole::Guardian,
            player_ids: vec![player],
        };
        assert!(guardian.can_view_player(player));
        assert!(!guardian.can_view_player(other));

        let coach = UserSession {
            user_id: Uuid::new_v4(),
            email: "c@example.com".to_string(),
            role: UserRole::Coach,
            player_ids: vec![],
        };
        assert!(coach.can_view_player(other));
    }
}
