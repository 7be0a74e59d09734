use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{BulkOutcome, Player, RowFailure, Team, TryoutRole};
use crate::services::{PlayerService, TeamService};

/// One drag-and-drop move from the roster board: a player landing on a
/// team column (or back in the unassigned pool) with an optional role.
#[derive(Debug, Deserialize)]
pub struct AssignmentMove {
    pub player_id: Uuid,
    pub team_id: Option<Uuid>,
    pub tryout_role: Option<TryoutRole>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    pub moves: Vec<AssignmentMove>,
}

#[derive(Debug, Serialize)]
pub struct BoardColumn {
    pub team: Team,
    pub players: Vec<Player>,
}

#[derive(Debug, Serialize)]
pub struct TryoutBoard {
    pub unassigned: Vec<Player>,
    pub columns: Vec<BoardColumn>,
}

#[derive(Clone)]
pub struct TryoutService {
    db: PgPool,
}

impl TryoutService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply board moves one by one. A failed move never rolls back the
    /// ones already applied; failures are reported per row.
    pub async fn apply_assignments(&self, request: AssignmentRequest) -> Result<BulkOutcome> {
        let players = PlayerService::new(self.db.clone());
        let teams = TeamService::new(self.db.clone());

        let mut applied = 0;
        let mut failed = Vec::new();

        for (row, mv) in request.moves.iter().enumerate() {
            if let Some(team_id) = mv.team_id {
                match teams.get_team(team_id).await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        failed.push(RowFailure {
                            row,
                            error: format!("unknown team {team_id}"),
                        });
                        continue;
                    }
                    Err(e) => {
                        failed.push(RowFailure {
                            row,
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            }

            match players.assign(mv.player_id, mv.team_id, mv.tryout_role).await {
                Ok(Some(_)) => applied += 1,
                Ok(None) => failed.push(RowFailure {
                    row,
                    error: format!("unknown player {}", mv.player_id),
                }),
                Err(e) => failed.push(RowFailure {
                    row,
                    error: e.to_string(),
                }),
            }
        }

        Ok(BulkOutcome { applied, failed })
    }

    /// The board state: tryout-pool players without a team, plus one
    /// column per team.
    pub async fn board(&self, tryout_only: bool) -> Result<TryoutBoard> {
        let status_filter = if tryout_only { " AND status = 'tryout'" } else { "" };

        let unassigned = sqlx::query_as::<_, Player>(&format!(
            "SELECT id, first_name, last_name, date_of_birth, position, jersey_number, \
                    team_id, tryout_role, status, goals, created_at, updated_at \
             FROM players WHERE team_id IS NULL{status_filter} \
             ORDER BY last_name, first_name"
        ))
        .fetch_all(&self.db)
        .await?;

        let teams = sqlx::query_as::<_, Team>(
            "SELECT id, name, age_group, league, gender, season, created_at, updated_at \
             FROM teams ORDER BY age_group, name",
        )
        .fetch_all(&self.db)
        .await?;

        let team_service = TeamService::new(self.db.clone());
        let mut columns = Vec::with_capacity(teams.len());
        for team in teams {
            let players = team_service.roster(team.id).await?;
            columns.push(BoardColumn { team, players });
        }

        Ok(TryoutBoard {
            unassigned,
            columns,
        })
    }
}
