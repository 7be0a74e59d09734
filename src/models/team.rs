use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Boys,
    Girls,
    Coed,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Boys => "boys",
            Gender::Girls => "girls",
            Gender::Coed => "coed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boys" => Some(Gender::Boys),
            "girls" => Some(Gender::Girls),
            "coed" => Some(Gender::Coed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub age_group: String,
    pub league: String,
    pub gender: String,
    pub season: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Team plus its roster size, for list views.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub age_group: String,
    pub league: String,
    pub gender: String,
    pub season: String,
    pub player_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    pub age_group: String,
    pub league: Option<String>,
    pub gender: Gender,
    pub season: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub age_group: Option<String>,
    pub league: Option<String>,
    pub gender: Option<Gender>,
    pub season: Option<String>,
}
