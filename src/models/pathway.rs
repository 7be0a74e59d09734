use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillArea {
    Technical,
    Tactical,
    Physical,
    Mental,
    Goalkeeping,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Camp,
    Showcase,
    Tournament,
    Clinic,
}

/// An assigned block of training work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingModule {
    pub id: Uuid,
    pub title: String,
    pub focus: SkillArea,
    pub status: ModuleStatus,
    pub assigned_on: NaiveDate,
    pub completed_on: Option<NaiveDate>,
}

/// A single skill rating on the player's skill matrix, upserted by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillMatrixEntry {
    pub skill: String,
    pub area: SkillArea,
    /// 1-5 proficiency level.
    pub level: i16,
    pub assessed_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathwayEvent {
    pub id: Uuid,
    pub name: String,
    pub kind: EventKind,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub location: Option<String>,
}

/// Per-player container of training modules, skill matrix entries and
/// events. One row per player, created lazily on first read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DevelopmentPathway {
    pub id: Uuid,
    pub player_id: Uuid,
    pub training_modules: Json<Vec<TrainingModule>>,
    pub skill_matrix: Json<Vec<SkillMatrixEntry>>,
    pub events: Json<Vec<PathwayEvent>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddModuleRequest {
    pub title: String,
    pub focus: SkillArea,
    pub assigned_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    pub focus: Option<SkillArea>,
    pub status: Option<ModuleStatus>,
    pub completed_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertSkillRequest {
    pub skill: String,
    pub area: SkillArea,
    pub level: i16,
    pub assessed_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AddEventRequest {
    pub name: String,
    pub kind: EventKind,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub location: Option<String>,
}

pub const SKILL_LEVEL_MIN: i16 = 1;
pub const SKILL_LEVEL_MAX: i16 = 5;
