use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Coach-entered 1-10 ratings with free-text notes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Evaluation {
    pub id: Uuid,
    pub player_id: Uuid,
    pub coach_id: Uuid,
    pub evaluated_on: NaiveDate,
    pub mental: i16,
    pub technical: i16,
    pub defending: i16,
    pub attacking: i16,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEvaluationRequest {
    pub evaluated_on: NaiveDate,
    pub mental: i16,
    pub technical: i16,
    pub defending: i16,
    pub attacking: i16,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEvaluationRequest {
    pub evaluated_on: Option<NaiveDate>,
    pub mental: Option<i16>,
    pub technical: Option<i16>,
    pub defending: Option<i16>,
    pub attacking: Option<i16>,
    pub notes: Option<String>,
}

/// Per-category averages across a player's evaluations.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub player_id: Uuid,
    pub evaluation_count: i64,
    pub mental_avg: Option<f64>,
    pub technical_avg: Option<f64>,
    pub defending_avg: Option<f64>,
    pub attacking_avg: Option<f64>,
    pub overall_avg: Option<f64>,
}

pub const RATING_MIN: i16 = 1;
pub const RATING_MAX: i16 = 10;

pub fn rating_in_range(value: i16) -> bool {
    (RATING_MIN..=RATING_MAX).contains(&value)
}
