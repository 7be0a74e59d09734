use anyhow::{bail, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    rating_in_range, CreateEvaluationRequest, Evaluation, EvaluationSummary,
    UpdateEvaluationRequest, RATING_MAX, RATING_MIN,
};

const EVALUATION_COLUMNS: &str = "id, player_id, coach_id, evaluated_on, mental, technical, \
                                  defending, attacking, notes, created_at, updated_at";

#[derive(Clone)]
pub struct EvaluationService {
    db: PgPool,
}

impl EvaluationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_evaluation(
        &self,
        player_id: Uuid,
        coach_id: Uuid,
        request: CreateEvaluationRequest,
    ) -> Result<Evaluation> {
        for rating in [
            request.mental,
            request.technical,
            request.defending,
            request.attacking,
        ] {
            if !rating_in_range(rating) {
                bail!("ratings must be between {RATING_MIN} and {RATING_MAX}, got {rating}");
            }
        }

        let evaluation = sqlx::query_as::<_, Evaluation>(&format!(
            "INSERT INTO evaluations \
             (player_id, coach_id, evaluated_on, mental, technical, defending, attacking, notes, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EVALUATION_COLUMNS}"
        ))
        .bind(player_id)
        .bind(coach_id)
        .bind(request.evaluated_on)
        .bind(request.mental)
        .bind(request.technical)
        .bind(request.defending)
        .bind(request.attacking)
        .bind(request.notes.unwrap_or_default())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(evaluation)
    }

    pub async fn get_evaluation(&self, evaluation_id: Uuid) -> Result<Option<Evaluation>> {
        let evaluation = sqlx::query_as::<_, Evaluation>(&format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations WHERE id = $1"
        ))
        .bind(evaluation_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(evaluation)
    }

    pub async fn list_for_player(&self, player_id: Uuid) -> Result<Vec<Evaluation>> {
        let evaluations = sqlx::query_as::<_, Evaluation>(&format!(
            "SELECT {EVALUATION_COLUMNS} FROM evaluations \
             WHERE player_id = $1 ORDER BY evaluated_on DESC"
        ))
        .bind(player_id)
        .fetch_all(&self.db)
        .await?;
        Ok(evaluations)
    }

    pub async fn update_evaluation(
        &self,
        evaluation_id: Uuid,
        request: UpdateEvaluationRequest,
    ) -> Result<Option<Evaluation>> {
        for rating in [
            request.mental,
            request.technical,
            request.defending,
            request.attacking,
        ]
        .into_iter()
        .flatten()
        {
            if !rating_in_range(rating) {
                bail!("ratings must be between {RATING_MIN} and {RATING_MAX}, got {rating}");
            }
        }

        let evaluation = sqlx::query_as::<_, Evaluation>(&format!(
            "UPDATE evaluations SET \
                evaluated_on = COALESCE($2, evaluated_on), \
                mental = COALESCE($3, mental), \
                technical = COALESCE($4, technical), \
                defending = COALESCE($5, defending), \
                attacking = COALESCE($6, attacking), \
                notes = COALESCE($7, notes), \
                updated_at = $8 \
             WHERE id = $1 RETURNING {EVALUATION_COLUMNS}"
        ))
        .bind(evaluation_id)
        .bind(request.evaluated_on)
        .bind(request.mental)
        .bind(request.technical)
        .bind(request.defending)
        .bind(request.attacking)
        .bind(request.notes)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(evaluation)
    }

    pub async fn delete_evaluation(&self, evaluation_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM evaluations WHERE id = $1")
            .bind(evaluation_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn summary_for_player(&self, player_id: Uuid) -> Result<EvaluationSummary> {
        let row = sqlx::query_as::<_, SummaryRow>(
            "SELECT COUNT(*) AS evaluation_count, \
                    AVG(mental)::float8 AS mental_avg, \
                    AVG(technical)::float8 AS technical_avg, \
                    AVG(defending)::float8 AS defending_avg, \
                    AVG(attacking)::float8 AS attacking_avg \
             FROM evaluations WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_one(&self.db)
        .await?;

        let overall_avg = match (
            row.mental_avg,
            row.technical_avg,
            row.defending_avg,
            row.attacking_avg,
        ) {
            (Some(m), Some(t), Some(d), Some(a)) => Some((m + t + d + a) / 4.0),
            _ => None,
        };

        Ok(EvaluationSummary {
            player_id,
            evaluation_count: row.evaluation_count,
            mental_avg: row.mental_avg,
            technical_avg: row.technical_avg,
            defending_avg: row.defending_avg,
            attacking_avg: row.attacking_avg,
            overall_avg,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    evaluation_count: i64,
    mental_avg: Option<f64>,
    technical_avg: Option<f64>,
    defending_avg: Option<f64>,
    attacking_avg: Option<f64>,
}
