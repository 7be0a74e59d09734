use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CreateTeamRequest, Player, Team, TeamSummary, UpdateTeamRequest};

const TEAM_COLUMNS: &str = "id, name, age_group, league, gender, season, created_at, updated_at";

#[derive(Clone)]
pub struct TeamService {
    db: PgPool,
}

impl TeamService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_team(&self, request: CreateTeamRequest) -> Result<Team> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "INSERT INTO teams (name, age_group, league, gender, season, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {TEAM_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.age_group)
        .bind(request.league.unwrap_or_default())
        .bind(request.gender.as_str())
        .bind(request.season.unwrap_or_default())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(team)
    }

    pub async fn get_team(&self, team_id: Uuid) -> Result<Option<Team>> {
        let team =
            sqlx::query_as::<_, Team>(&format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = $1"))
                .bind(team_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(team)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "SELECT {TEAM_COLUMNS} FROM teams WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.db)
        .await?;
        Ok(team)
    }

    pub async fn list_teams(&self) -> Result<Vec<TeamSummary>> {
        let teams = sqlx::query_as::<_, TeamSummary>(
            "SELECT t.id, t.name, t.age_group, t.league, t.gender, t.season, \
                    COUNT(p.id) AS player_count \
             FROM teams t \
             LEFT JOIN players p ON p.team_id = t.id \
             GROUP BY t.id \
             ORDER BY t.age_group, t.name",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(teams)
    }

    pub async fn update_team(
        &self,
        team_id: Uuid,
        request: UpdateTeamRequest,
    ) -> Result<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(&format!(
            "UPDATE teams SET \
                name = COALESCE($2, name), \
                age_group = COALESCE($3, age_group), \
                league = COALESCE($4, league), \
                gender = COALESCE($5, gender), \
                season = COALESCE($6, season), \
                updated_at = $7 \
             WHERE id = $1 RETURNING {TEAM_COLUMNS}"
        ))
        .bind(team_id)
        .bind(request.name)
        .bind(request.age_group)
        .bind(request.league)
        .bind(request.gender.map(|g| g.as_str()))
        .bind(request.season)
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(team)
    }

    pub async fn delete_team(&self, team_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn roster(&self, team_id: Uuid) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            "SELECT id, first_name, last_name, date_of_birth, position, jersey_number, \
                    team_id, tryout_role, status, goals, created_at, updated_at \
             FROM players WHERE team_id = $1 \
             ORDER BY position, last_name",
        )
        .bind(team_id)
        .fetch_all(&self.db)
        .await?;
        Ok(players)
    }
}
