use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A dated set of field-test measurements with their derived scores.
/// Scores are always computed server-side from the raw values.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PhysicalAssessment {
    pub id: Uuid,
    pub player_id: Uuid,
    pub assessed_on: NaiveDate,
    pub sprint_seconds: Option<f64>,
    pub vertical_jump_inches: Option<f64>,
    pub yirt_level: Option<f64>,
    pub shuttle_seconds: Option<f64>,
    pub speed_score: i16,
    pub power_score: i16,
    pub endurance_score: i16,
    pub agility_score: i16,
    pub overall_score: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAssessmentRequest {
    pub assessed_on: NaiveDate,
    pub sprint_seconds: Option<f64>,
    pub vertical_jump_inches: Option<f64>,
    pub yirt_level: Option<f64>,
    pub shuttle_seconds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssessmentRequest {
    pub assessed_on: Option<NaiveDate>,
    pub sprint_seconds: Option<f64>,
    pub vertical_jump_inches: Option<f64>,
    pub yirt_level: Option<f64>,
    pub shuttle_seconds: Option<f64>,
}
