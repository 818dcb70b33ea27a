use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::domain::{KanbanError, ProjectState};

use super::{reducer, views};

#[derive(Debug, Clone, FromRow)]
struct SnapshotRow {
    snapshot: String,
    version: i64,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub project_id: String,
    pub project_name: String,
    pub version: i64,
    pub created_at: String,
    pub updated_at: String,
    pub lists: usize,
    pub cards: usize,
    pub backlog: usize,
    pub epics: usize,
    pub archived: usize,
}

pub struct SnapshotService;

impl SnapshotService {
    pub async fn load(pool: &SqlitePool, project_id: &str) -> Result<Option<ProjectState>, KanbanError> {
        let row: Option<SnapshotRow> = sqlx::query_as(
            "SELECT snapshot, version, created_at, updated_at FROM project_snapshots WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_optional(pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut state: ProjectState = serde_json::from_str(&row.snapshot)?;
        reducer::normalize(&mut state);
        tracing::debug!(project_id, version = row.version, "Loaded project snapshot");

        Ok(Some(state))
    }

    /// Upserts the snapshot and returns its new version number.
    pub async fn save(
        pool: &SqlitePool,
        project_id: &str,
        state: &ProjectState,
    ) -> Result<i64, KanbanError> {
        let snapshot = serde_json::to_string(state)?;
        let now = Utc::now().to_rfc3339();

        let version: i64 = sqlx::query_scalar(
            "INSERT INTO project_snapshots (project_id, snapshot, version, created_at, updated_at) VALUES (?, ?, 1, ?, ?) \
             ON CONFLICT(project_id) DO UPDATE SET snapshot = excluded.snapshot, version = project_snapshots.version + 1, updated_at = excluded.updated_at \
             RETURNING version",
        )
        .bind(project_id)
        .bind(&snapshot)
        .bind(&now)
        .bind(&now)
        .fetch_one(pool)
        .await?;

        Ok(version)
    }

    pub async fn delete(pool: &SqlitePool, project_id: &str) -> Result<(), KanbanError> {
        let result = sqlx::query("DELETE FROM project_snapshots WHERE project_id = ?")
            .bind(project_id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!(
                "Project snapshot not found: {}",
                project_id
            )));
        }

        Ok(())
    }

    pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<String>, KanbanError> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT project_id FROM project_snapshots ORDER BY updated_at DESC")
                .fetch_all(pool)
                .await?;

        Ok(ids)
    }

    pub async fn summary(pool: &SqlitePool, project_id: &str) -> Result<SnapshotSummary, KanbanError> {
        let row: SnapshotRow = sqlx::query_as(
            "SELECT snapshot, version, created_at, updated_at FROM project_snapshots WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Project snapshot not found: {}", project_id)))?;

        let state: ProjectState = serde_json::from_str(&row.snapshot)?;

        Ok(SnapshotSummary {
            project_id: project_id.to_string(),
            project_name: state.settings.project_name.clone(),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            lists: state.lists.len(),
            cards: state.card_count(),
            backlog: state.backlog_cards.len(),
            epics: state.epics.len(),
            archived: views::archived_count(&state),
        })
    }
}
