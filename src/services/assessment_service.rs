use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateAssessmentRequest, PhysicalAssessment, UpdateAssessmentRequest};
use crate::scoring::{score_assessment, RawMeasurements};

const ASSESSMENT_COLUMNS: &str =
    "id, player_id, assessed_on, sprint_seconds, vertical_jump_inches, yirt_level, \
     shuttle_seconds, speed_score, power_score, endurance_score, agility_score, overall_score, \
     created_at, updated_at";

#[derive(Clone)]
pub struct AssessmentService {
    db: PgPool,
}

impl AssessmentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Persist a new assessment. Scores are derived here from the raw
    /// measurements; callers cannot write them.
    pub async fn create_assessment(
        &self,
        player_id: Uuid,
        request: CreateAssessmentRequest,
    ) -> Result<PhysicalAssessment> {
        let raw = RawMeasurements {
            sprint_seconds: request.sprint_seconds,
            vertical_jump_inches: request.vertical_jump_inches,
            yirt_level: request.yirt_level,
            shuttle_seconds: request.shuttle_seconds,
        };
        let scores = score_assessment(&raw);

        let assessment = sqlx::query_as::<_, PhysicalAssessment>(&format!(
            "INSERT INTO physical_assessments \
             (player_id, assessed_on, sprint_seconds, vertical_jump_inches, yirt_level, \
              shuttle_seconds, speed_score, power_score, endurance_score, agility_score, \
              overall_score, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ASSESSMENT_COLUMNS}"
        ))
        .bind(player_id)
        .bind(request.assessed_on)
        .bind(request.sprint_seconds)
        .bind(request.vertical_jump_inches)
        .bind(request.yirt_level)
        .bind(request.shuttle_seconds)
        .bind(scores.speed)
        .bind(scores.power)
        .bind(scores.endurance)
        .bind(scores.agility)
        .bind(scores.overall)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(assessment)
    }

    pub async fn get_assessment(&self, assessment_id: Uuid) -> Result<Option<PhysicalAssessment>> {
        let assessment = sqlx::query_as::<_, PhysicalAssessment>(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM physical_assessments WHERE id = $1"
        ))
        .bind(assessment_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(assessment)
    }

    pub async fn list_for_player(&self, player_id: Uuid) -> Result<Vec<PhysicalAssessment>> {
        let assessments = sqlx::query_as::<_, PhysicalAssessment>(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM physical_assessments \
             WHERE player_id = $1 ORDER BY assessed_on DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.db)
        .await?;
        Ok(assessments)
    }

    pub async fn latest_for_player(&self, player_id: Uuid) -> Result<Option<PhysicalAssessment>> {
        let assessment = sqlx::query_as::<_, PhysicalAssessment>(&format!(
            "SELECT {ASSESSMENT_COLUMNS} FROM physical_assessments \
             WHERE player_id = $1 ORDER BY assessed_on DESC LIMIT 1"
        ))
        .bind(player_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(assessment)
    }

    /// Update raw measurements and re-derive every score.
    pub async fn update_assessment(
        &self,
        assessment_id: Uuid,
        request: UpdateAssessmentRequest,
    ) -> Result<Option<PhysicalAssessment>> {
        let Some(current) = self.get_assessment(assessment_id).await? else {
            return Ok(None);
        };

        let assessed_on = request.assessed_on.unwrap_or(current.assessed_on);
        let raw = RawMeasurements {
            sprint_seconds: request.sprint_seconds.or(current.sprint_seconds),
            vertical_jump_inches: request
                .vertical_jump_inches
                .or(current.vertical_jump_inches),
            yirt_level: request.yirt_level.or(current.yirt_level),
            shuttle_seconds: request.shuttle_seconds.or(current.shuttle_seconds),
        };
        let scores = score_assessment(&raw);

        let assessment = sqlx::query_as::<_, PhysicalAssessment>(&format!(
            "UPDATE physical_assessments SET \
                assessed_on = $2, sprint_seconds = $3, vertical_jump_inches = $4, \
                yirt_level = $5, shuttle_seconds = $6, speed_score = $7, power_score = $8, \
                endurance_score = $9, agility_score = $10, overall_score = $11, updated_at = $12 \
             WHERE id = $1 RETURNING {ASSESSMENT_COLUMNS}"
        ))
        .bind(assessment_id)
        .bind(assessed_on)
        .bind(raw.sprint_seconds)
        .bind(raw.vertical_jump_inches)
        .bind(raw.yirt_level)
        .bind(raw.shuttle_seconds)
        .bind(scores.speed)
        .bind(scores.power)
        .bind(scores.endurance)
        .bind(scores.agility)
        .bind(scores.overall)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(assessment)
    }

    pub async fn delete_assessment(&self, assessment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM physical_assessments WHERE id = $1")
            .bind(assessment_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
