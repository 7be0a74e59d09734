use anyhow::Result;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AddGoalRequest, CreatePlayerRequest, GoalStatus, Player, PlayerGoal, PlayerQuery,
    PlayerStatus, TryoutRole, UpdateGoalRequest, UpdatePlayerRequest,
};

const PLAYER_COLUMNS: &str = "id, first_name, last_name, date_of_birth, position, jersey_number, \
                              team_id, tryout_role, status, goals, created_at, updated_at";

#[derive(Clone)]
pub struct PlayerService {
    db: PgPool,
}

impl PlayerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_player(&self, request: CreatePlayerRequest) -> Result<Player> {
        let status = request.status.unwrap_or(PlayerStatus::Active);
        let player = sqlx::query_as::<_, Player>(&format!(
            "INSERT INTO players \
             (first_name, last_name, date_of_birth, position, jersey_number, team_id, status, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.date_of_birth)
        .bind(request.position.as_str())
        .bind(request.jersey_number)
        .bind(request.team_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(player)
    }

    pub async fn get_player(&self, player_id: Uuid) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players WHERE id = $1"
        ))
        .bind(player_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(player)
    }

    pub async fn list_players(&self, query: &PlayerQuery) -> Result<Vec<Player>> {
        let limit = query.limit.unwrap_or(50).min(200);
        let offset = query.offset.unwrap_or(0);

        let mut sql = format!("SELECT {PLAYER_COLUMNS} FROM players WHERE 1=1");
        let mut param_count = 1;

        if query.team_id.is_some() {
            sql.push_str(&format!(" AND team_id = ${param_count}"));
            param_count += 1;
        }
        if query.position.is_some() {
            sql.push_str(&format!(" AND position = ${param_count}"));
            param_count += 1;
        }
        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${param_count}"));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (first_name ILIKE ${param_count} OR last_name ILIKE ${param_count})"
            ));
        }

        sql.push_str(" ORDER BY last_name, first_name");
        sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));

        let mut query_builder = sqlx::query_as::<_, Player>(&sql);
        if let Some(team_id) = query.team_id {
            query_builder = query_builder.bind(team_id);
        }
        if let Some(position) = query.position {
            query_builder = query_builder.bind(position.as_str());
        }
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status.as_str());
        }
        if let Some(search) = &query.search {
            query_builder = query_builder.bind(format!("%{search}%"));
        }

        let players = query_builder.fetch_all(&self.db).await?;
        Ok(players)
    }

    pub async fn update_player(
        &self,
        player_id: Uuid,
        request: UpdatePlayerRequest,
    ) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "UPDATE players SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                date_of_birth = COALESCE($4, date_of_birth), \
                position = COALESCE($5, position), \
                jersey_number = COALESCE($6, jersey_number), \
                team_id = COALESCE($7, team_id), \
                status = COALESCE($8, status), \
                updated_at = $9 \
             WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(player_id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.date_of_birth)
        .bind(request.position.map(|p| p.as_str()))
        .bind(request.jersey_number)
        .bind(request.team_id)
        .bind(request.status.map(|s| s.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(player)
    }

    pub async fn delete_player(&self, player_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(player_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a player onto (or off) a team with an optional tryout role.
    /// Used by the roster board; an explicit `None` team clears the
    /// assignment, unlike the COALESCE update above.
    pub async fn assign(
        &self,
        player_id: Uuid,
        team_id: Option<Uuid>,
        tryout_role: Option<TryoutRole>,
    ) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "UPDATE players SET team_id = $2, tryout_role = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(player_id)
        .bind(team_id)
        .bind(tryout_role.map(|r| r.as_str()))
        .bind(Utc::now())
        .fetch_optional(&self.db)
        .await?;

        Ok(player)
    }

    pub async fn add_goal(
        &self,
        player_id: Uuid,
        request: AddGoalRequest,
    ) -> Result<Option<Player>> {
        let Some(player) = self.get_player(player_id).await? else {
            return Ok(None);
        };

        let mut goals = player.goals.0;
        goals.push(PlayerGoal {
            id: Uuid::new_v4(),
            title: request.title,
            status: GoalStatus::Open,
            created_on: Utc::now().date_naive(),
        });

        self.store_goals(player_id, goals).await.map(Some)
    }

    pub async fn update_goal(
        &self,
        player_id: Uuid,
        goal_id: Uuid,
        request: UpdateGoalRequest,
    ) -> Result<Option<Player>> {
        let Some(player) = self.get_player(player_id).await? else {
            return Ok(None);
        };

        let mut goals = player.goals.0;
        let Some(goal) = goals.iter_mut().find(|g| g.id == goal_id) else {
            return Ok(None);
        };
        if let Some(title) = request.title {
            goal.title = title;
        }
        if let Some(status) = request.status {
            goal.status = status;
        }

        self.store_goals(player_id, goals).await.map(Some)
    }

    pub async fn remove_goal(&self, player_id: Uuid, goal_id: Uuid) -> Result<Option<Player>> {
        let Some(player) = self.get_player(player_id).await? else {
            return Ok(None);
        };

        let mut goals = player.goals.0;
        let before = goals.len();
        goals.retain(|g| g.id != goal_id);
        if goals.len() == before {
            return Ok(None);
        }

        self.store_goals(player_id, goals).await.map(Some)
    }

    /// Append free-text goals, e.g. accepted coaching suggestions.
    pub async fn add_goal_titles(
        &self,
        player_id: Uuid,
        titles: &[String],
    ) -> Result<Option<Player>> {
        let Some(player) = self.get_player(player_id).await? else {
            return Ok(None);
        };

        let mut goals = player.goals.0;
        let today = Utc::now().date_naive();
        for title in titles {
            goals.push(PlayerGoal {
                id: Uuid::new_v4(),
                title: title.clone(),
                status: GoalStatus::Open,
                created_on: today,
            });
        }

        self.store_goals(player_id, goals).await.map(Some)
    }

    async fn store_goals(&self, player_id: Uuid, goals: Vec<PlayerGoal>) -> Result<Player> {
        let player = sqlx::query_as::<_, Player>(&format!(
            "UPDATE players SET goals = $2, updated_at = $3 WHERE id = $1 RETURNING {PLAYER_COLUMNS}"
        ))
        .bind(player_id)
        .bind(Json(goals))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(player)
    }
}
