use anyhow::{bail, Result};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AddEventRequest, AddModuleRequest, DevelopmentPathway, ModuleStatus, PathwayEvent,
    SkillMatrixEntry, TrainingModule, UpdateModuleRequest, UpsertSkillRequest, SKILL_LEVEL_MAX,
    SKILL_LEVEL_MIN,
};

const PATHWAY_COLUMNS: &str =
    "id, player_id, training_modules, skill_matrix, events, created_at, updated_at";

#[derive(Clone)]
pub struct PathwayService {
    db: PgPool,
}

impl PathwayService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch a player's pathway, creating the empty container on first
    /// access.
    pub async fn get_or_create(&self, player_id: Uuid) -> Result<DevelopmentPathway> {
        if let Some(pathway) = sqlx::query_as::<_, DevelopmentPathway>(&format!(
            "SELECT {PATHWAY_COLUMNS} FROM development_pathways WHERE player_id = $1"
        ))
        .bind(player_id)
        .fetch_optional(&self.db)
        .await?
        {
            return Ok(pathway);
        }

        let pathway = sqlx::query_as::<_, DevelopmentPathway>(&format!(
            "INSERT INTO development_pathways (player_id, updated_at) VALUES ($1, $2) \
             ON CONFLICT (player_id) DO UPDATE SET updated_at = development_pathways.updated_at \
             RETURNING {PATHWAY_COLUMNS}"
        ))
        .bind(player_id)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(pathway)
    }

    pub async fn add_module(
        &self,
        player_id: Uuid,
        request: AddModuleRequest,
    ) -> Result<DevelopmentPathway> {
        let pathway = self.get_or_create(player_id).await?;
        let mut modules = pathway.training_modules.0;
        modules.push(TrainingModule {
            id: Uuid::new_v4(),
            title: request.title,
            focus: request.focus,
            status: ModuleStatus::Planned,
            assigned_on: request.assigned_on.unwrap_or_else(|| Utc::now().date_naive()),
            completed_on: None,
        });
        self.store_modules(player_id, modules).await
    }

    /// Append suggested modules, e.g. accepted coaching suggestions.
    pub async fn add_module_titles(
        &self,
        player_id: Uuid,
        titles: &[String],
        focus: crate::models::SkillArea,
    ) -> Result<DevelopmentPathway> {
        let pathway = self.get_or_create(player_id).await?;
        let mut modules = pathway.training_modules.0;
        let today = Utc::now().date_naive();
        for title in titles {
            modules.push(TrainingModule {
                id: Uuid::new_v4(),
                title: title.clone(),
                focus,
                status: ModuleStatus::Planned,
                assigned_on: today,
                completed_on: None,
            });
        }
        self.store_modules(player_id, modules).await
    }

    pub async fn update_module(
        &self,
        player_id: Uuid,
        module_id: Uuid,
        request: UpdateModuleRequest,
    ) -> Result<Option<DevelopmentPathway>> {
        let pathway = self.get_or_create(player_id).await?;
        let mut modules = pathway.training_modules.0;
        let Some(module) = modules.iter_mut().find(|m| m.id == module_id) else {
            return Ok(None);
        };

        if let Some(title) = request.title {
            module.title = title;
        }
        if let Some(focus) = request.focus {
            module.focus = focus;
        }
        if let Some(status) = request.status {
            module.status = status;
            if status == ModuleStatus::Completed && module.completed_on.is_none() {
                module.completed_on = Some(Utc::now().date_naive());
            }
        }
        if let Some(completed_on) = request.completed_on {
            module.completed_on = Some(completed_on);
        }

        self.store_modules(player_id, modules).await.map(Some)
    }

    pub async fn remove_module(
        &self,
        player_id: Uuid,
        module_id: Uuid,
    ) -> Result<Option<DevelopmentPathway>> {
        let pathway = self.get_or_create(player_id).await?;
        let mut modules = pathway.training_modules.0;
        let before = modules.len();
        modules.retain(|m| m.id != module_id);
        if modules.len() == before {
            return Ok(None);
        }
        self.store_modules(player_id, modules).await.map(Some)
    }

    /// Insert or update a skill matrix entry, keyed by skill name.
    pub async fn upsert_skill(
        &self,
        player_id: Uuid,
        request: UpsertSkillRequest,
    ) -> Result<DevelopmentPathway> {
        if !(SKILL_LEVEL_MIN..=SKILL_LEVEL_MAX).contains(&request.level) {
            bail!(
                "skill level must be between {SKILL_LEVEL_MIN} and {SKILL_LEVEL_MAX}, got {}",
                request.level
            );
        }

        let pathway = self.get_or_create(player_id).await?;
        let mut matrix = pathway.skill_matrix.0;
        let assessed_on = request.assessed_on.unwrap_or_else(|| Utc::now().date_naive());

        match matrix
            .iter_mut()
            .find(|entry| entry.skill.eq_ignore_ascii_case(&request.skill))
        {
            Some(entry) => {
                entry.area = request.area;
                entry.level = request.level;
                entry.assessed_on = assessed_on;
            }
            None => matrix.push(SkillMatrixEntry {
                skill: request.skill,
                area: request.area,
                level: request.level,
                assessed_on,
            }),
        }

        self.store_matrix(player_id, matrix).await
    }

    pub async fn remove_skill(
        &self,
        player_id: Uuid,
        skill: &str,
    ) -> Result<Option<DevelopmentPathway>> {
        let pathway = self.get_or_create(player_id).await?;
        let mut matrix = pathway.skill_matrix.0;
        let before = matrix.len();
        matrix.retain(|entry| !entry.skill.eq_ignore_ascii_case(skill));
        if matrix.len() == before {
            return Ok(None);
        }
        self.store_matrix(player_id, matrix).await.map(Some)
    }

    pub async fn add_event(
        &self,
        player_id: Uuid,
        request: AddEventRequest,
    ) -> Result<DevelopmentPathway> {
        let pathway = self.get_or_create(player_id).await?;
        let mut events = pathway.events.0;
        events.push(PathwayEvent {
            id: Uuid::new_v4(),
            name: request.name,
            kind: request.kind,
            starts_on: request.starts_on,
            ends_on: request.ends_on,
            location: request.location,
        });
        self.store_events(player_id, events).await
    }

    pub async fn remove_event(
        &self,
        player_id: Uuid,
        event_id: Uuid,
    ) -> Result<Option<DevelopmentPathway>> {
        let pathway = self.get_or_create(player_id).await?;
        let mut events = pathway.events.0;
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Ok(None);
        }
        self.store_events(player_id, events).await.map(Some)
    }

    async fn store_modules(
        &self,
        player_id: Uuid,
        modules: Vec<TrainingModule>,
    ) -> Result<DevelopmentPathway> {
        let pathway = sqlx::query_as::<_, DevelopmentPathway>(&format!(
            "UPDATE development_pathways SET training_modules = $2, updated_at = $3 \
             WHERE player_id = $1 RETURNING {PATHWAY_COLUMNS}"
        ))
        .bind(player_id)
        .bind(Json(modules))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        Ok(pathway)
    }

    async fn store_matrix(
        &self,
        player_id: Uuid,
        matrix: Vec<SkillMatrixEntry>,
    ) -> Result<DevelopmentPathway> {
        let pathway = sqlx::query_as::<_, DevelopmentPathway>(&format!(
            "UPDATE development_pathways SET skill_matrix = $2, updated_at = $3 \
             WHERE player_id = $1 RETURNING {PATHWAY_COLUMNS}"
        ))
        .bind(player_id)
        .bind(Json(matrix))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        Ok(pathway)
    }

    async fn store_events(
        &self,
        player_id: Uuid,
        events: Vec<PathwayEvent>,
    ) -> Result<DevelopmentPathway> {
        let pathway = sqlx::query_as::<_, DevelopmentPathway>(&format!(
            "UPDATE development_pathways SET events = $2, updated_at = $3 \
             WHERE player_id = $1 RETURNING {PATHWAY_COLUMNS}"
        ))
        .bind(player_id)
        .bind(Json(events))
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;
        Ok(pathway)
    }
}
