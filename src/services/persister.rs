use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::domain::ProjectState;

use super::SnapshotService;

/// Saves every snapshot the store publishes. Runs until the store (the
/// last sender) is dropped and returns how many snapshots were written.
pub struct SnapshotPersister {
    pub db: SqlitePool,
    pub project_id: String,
    pub updates: broadcast::Receiver<Arc<ProjectState>>,
}

impl SnapshotPersister {
    pub async fn start(self) -> u64 {
        let mut stream = BroadcastStream::new(self.updates);
        let mut saved = 0;

        while let Some(next) = stream.next().await {
            match next {
                Ok(state) => match SnapshotService::save(&self.db, &self.project_id, &state).await {
                    Ok(version) => {
                        saved += 1;
                        tracing::debug!(project_id = self.project_id.as_str(), version, "Snapshot persisted");
                    }
                    Err(e) => {
                        tracing::warn!(project_id = self.project_id.as_str(), "Snapshot persist failed: {}", e);
                    }
                },
                // A newer snapshot is already queued behind the gap.
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Snapshot persister lagged, skipping stale snapshots");
                }
            }
        }

        tracing::info!(
            project_id = self.project_id.as_str(),
            saved,
            "Snapshot persister stopped"
        );
        saved
    }
}
