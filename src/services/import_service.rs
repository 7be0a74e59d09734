use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{BulkOutcome, CreatePlayerRequest, PlayerStatus, Position, RowFailure};
use crate::services::{PlayerService, TeamService};

/// Header plus a sample row, served as the downloadable import template.
pub const PLAYERS_CSV_TEMPLATE: &str = "\
first_name,last_name,date_of_birth,position,team,jersey_number
Alex,Morgan,2012-07-02,forward,U14 Blue,9
";

/// One raw CSV record as uploaded. Team and jersey number are optional.
#[derive(Debug, Deserialize)]
struct CsvPlayerRow {
    first_name: String,
    last_name: String,
    date_of_birth: String,
    position: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    jersey_number: Option<String>,
}

/// A record that passed validation, still unresolved against the
/// database (team is by name here).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPlayerRow {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub position: Position,
    pub team_name: Option<String>,
    pub jersey_number: Option<i16>,
}

#[derive(Debug)]
pub struct ParsedImport {
    /// Valid rows with their 1-based CSV line numbers (header is line 1).
    pub rows: Vec<(usize, ValidatedPlayerRow)>,
    pub errors: Vec<RowFailure>,
}

/// Parse and validate an uploaded players CSV. Never fails as a whole:
/// bad rows land in `errors`, good rows in `rows`.
pub fn parse_players_csv(data: &[u8]) -> ParsedImport {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut rows = Vec::new();
    let mut errors = Vec::new();

    for (index, record) in reader.deserialize::<CsvPlayerRow>().enumerate() {
        let line = index + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                errors.push(RowFailure {
                    row: line,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match validate_row(record) {
            Ok(valid) => rows.push((line, valid)),
            Err(message) => errors.push(RowFailure {
                row: line,
                error: message,
            }),
        }
    }

    ParsedImport { rows, errors }
}

fn validate_row(record: CsvPlayerRow) -> Result<ValidatedPlayerRow, String> {
    if record.first_name.is_empty() || record.last_name.is_empty() {
        return Err("first_name and last_name are required".to_string());
    }

    let date_of_birth = NaiveDate::parse_from_str(&record.date_of_birth, "%Y-%m-%d")
        .map_err(|_| format!("invalid date_of_birth '{}', expected YYYY-MM-DD", record.date_of_birth))?;

    let position = Position::from_str(&record.position)
        .ok_or_else(|| format!("unknown position '{}'", record.position))?;

    let jersey_number = match record.jersey_number.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i16>()
                .map_err(|_| format!("invalid jersey_number '{raw}'"))?,
        ),
    };

    let team_name = record.team.filter(|name| !name.is_empty());

    Ok(ValidatedPlayerRow {
        first_name: record.first_name,
        last_name: record.last_name,
        date_of_birth,
        position,
        team_name,
        jersey_number,
    })
}

#[derive(Clone)]
pub struct ImportService {
    db: PgPool,
}

impl ImportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Import players from an uploaded CSV. Rows are applied one by one;
    /// rows inserted before a failure stay inserted and every failure is
    /// reported with its line number.
    pub async fn import_players(&self, data: &[u8]) -> Result<BulkOutcome> {
        let parsed = parse_players_csv(data);
        let players = PlayerService::new(self.db.clone());
        let teams = TeamService::new(self.db.clone());

        let mut applied = 0;
        let mut failed = parsed.errors;
        let mut team_cache: HashMap<String, Option<Uuid>> = HashMap::new();

        for (line, row) in parsed.rows {
            let team_id = match &row.team_name {
                Some(name) => {
                    let key = name.to_lowercase();
                    let cached = match team_cache.get(&key) {
                        Some(cached) => *cached,
                        None => {
                            let resolved = teams.find_by_name(name).await?.map(|t| t.id);
                            team_cache.insert(key, resolved);
                            resolved
                        }
                    };
                    match cached {
                        Some(id) => Some(id),
                        None => {
                            failed.push(RowFailure {
                                row: line,
                                error: format!("unknown team '{name}'"),
                            });
                            continue;
                        }
                    }
                }
                None => None,
            };

            let request = CreatePlayerRequest {
                first_name: row.first_name,
                last_name: row.last_name,
                date_of_birth: row.date_of_birth,
                position: row.position,
                jersey_number: row.jersey_number,
                team_id,
                status: Some(PlayerStatus::Active),
            };

            match players.create_player(request).await {
                Ok(_) => applied += 1,
                Err(e) => failed.push(RowFailure {
                    row: line,
                    error: e.to_string(),
                }),
            }
        }

        failed.sort_by_key(|f| f.row);
        Ok(BulkOutcome { applied, failed })
    }
}
