use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::domain::{Command, ProjectState};

use super::{ProjectStore, SnapshotPersister};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub applied: usize,
    pub ignored: usize,
    pub rejected: usize,
}

/// Outcome of a replay once every published snapshot has been persisted.
#[derive(Debug)]
pub struct ReplaySession {
    pub stats: ReplayStats,
    pub saved: u64,
    pub state: Arc<ProjectState>,
}

/// Replays a JSON-lines command script through the store while `persister`
/// saves each snapshot. The persister is always drained before returning,
/// so a strict-mode failure still leaves every snapshot published before the
/// failing line on disk.
pub async fn run<R>(
    mut store: ProjectStore,
    persister: SnapshotPersister,
    reader: R,
    strict: bool,
) -> anyhow::Result<ReplaySession>
where
    R: AsyncBufRead + Unpin,
{
    let persister = tokio::spawn(persister.start());

    let replayed = replay(&mut store, reader, strict).await;

    let state = store.snapshot();
    drop(store);
    let saved = persister.await.context("snapshot persister panicked")?;

    match replayed {
        Ok(stats) => Ok(ReplaySession { stats, saved, state }),
        Err(e) => {
            tracing::warn!(saved, "Replay aborted after persisting earlier snapshots");
            Err(e)
        }
    }
}

/// Applies every command line in `reader`. Blank lines and `#` comments are
/// skipped. In strict mode the first unparsable, invalid or ineffective
/// command aborts the replay; otherwise it is counted and skipped.
pub async fn replay<R>(store: &mut ProjectStore, reader: R, strict: bool) -> anyhow::Result<ReplayStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command = match serde_json::from_str::<Command>(line) {
            Ok(command) => command,
            Err(e) if strict => return Err(e).with_context(|| format!("line {}: invalid command", line_no)),
            Err(e) => {
                tracing::warn!(line = line_no, "Skipping invalid command: {}", e);
                stats.rejected += 1;
                continue;
            }
        };

        if let Err(e) = command.validate() {
            if strict {
                return Err(e).with_context(|| format!("line {}: {}", line_no, command.kind()));
            }
            tracing::warn!(line = line_no, command = command.kind(), "Skipping command: {}", e);
            stats.rejected += 1;
            continue;
        }

        let kind = command.kind();
        match store.try_dispatch(command) {
            Ok(_) => stats.applied += 1,
            Err(e) if strict => return Err(e).with_context(|| format!("line {}: {}", line_no, kind)),
            Err(e) => {
                tracing::info!(line = line_no, command = kind, "Command had no effect: {}", e);
                stats.ignored += 1;
            }
        }
    }

    Ok(stats)
}
