use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Field positions used on rosters and the tryout board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Defender => "defender",
            Position::Midfielder => "midfielder",
            Position::Forward => "forward",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "goalkeeper" => Some(Position::Goalkeeper),
            "defender" => Some(Position::Defender),
            "midfielder" => Some(Position::Midfielder),
            "forward" => Some(Position::Forward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Tryout,
    Inactive,
    Alumni,
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Tryout => "tryout",
            PlayerStatus::Inactive => "inactive",
            PlayerStatus::Alumni => "alumni",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(PlayerStatus::Active),
            "tryout" => Some(PlayerStatus::Tryout),
            "inactive" => Some(PlayerStatus::Inactive),
            "alumni" => Some(PlayerStatus::Alumni),
            _ => None,
        }
    }
}

/// Role a player is being considered for on the tryout board.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TryoutRole {
    Starter,
    Rotation,
    Development,
    Undecided,
}

impl TryoutRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TryoutRole::Starter => "starter",
            TryoutRole::Rotation => "rotation",
            TryoutRole::Development => "development",
            TryoutRole::Undecided => "undecided",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "starter" => Some(TryoutRole::Starter),
            "rotation" => Some(TryoutRole::Rotation),
            "development" => Some(TryoutRole::Development),
            "undecided" => Some(TryoutRole::Undecided),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Open,
    Achieved,
    Dropped,
}

/// A development goal embedded on the player record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerGoal {
    pub id: Uuid,
    pub title: String,
    pub status: GoalStatus,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Player {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub position: String,
    pub jersey_number: Option<i16>,
    pub team_id: Option<Uuid>,
    pub tryout_role: Option<String>,
    pub status: String,
    pub goals: Json<Vec<PlayerGoal>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// School-year cutoff month. Birth-year registration puts players born in
/// this month or later a cohort below their school classmates.
const TRAPPED_CUTOFF_MONTH: u32 = 8;

pub fn is_trapped(date_of_birth: NaiveDate) -> bool {
    date_of_birth.month() >= TRAPPED_CUTOFF_MONTH
}

#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    #[serde(flatten)]
    pub player: Player,
    pub trapped: bool,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        let trapped = is_trapped(player.date_of_birth);
        PlayerResponse { player, trapped }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePlayerRequest {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub position: Position,
    pub jersey_number: Option<i16>,
    pub team_id: Option<Uuid>,
    pub status: Option<PlayerStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlayerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub position: Option<Position>,
    pub jersey_number: Option<i16>,
    pub team_id: Option<Uuid>,
    pub status: Option<PlayerStatus>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    pub team_id: Option<Uuid>,
    pub position: Option<Position>,
    pub status: Option<PlayerStatus>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddGoalRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub status: Option<GoalStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapped_follows_school_year_cutoff() {
        assert!(is_trapped(NaiveDate::from_ymd_opt(2012, 8, 1).unwrap()));
        assert!(is_trapped(NaiveDate::from_ymd_opt(2012, 12, 31).unwrap()));
        assert!(!is_trapped(NaiveDate::from_ymd_opt(2012, 7, 31).unwrap()));
        assert!(!is_trapped(NaiveDate::from_ymd_opt(2012, 1, 1).unwrap()));
    }

    #[test]
    fn position_round_trips_through_strings() {
        for position in [
            Position::Goalkeeper,
            Position::Defender,
            Position::Midfielder,
            Position::Forward,
        ] {
            assert_eq!(Position::from_str(position.as_str()), Some(position));
        }
        assert_eq!(Position::from_str("Striker"), None);
    }
}
