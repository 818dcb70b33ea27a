use project_board::config::Config;
use project_board::infrastructure::db;
use project_board::services::SnapshotService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().unwrap_or_default();
    let pool = db::init_db(&config.database_url).await?;

    let journal_mode = db::journal_mode(&pool).await?;
    println!("Journal mode: {}", journal_mode);

    let projects = SnapshotService::list_projects(&pool).await?;
    println!("Projects: {}", projects.len());

    for project_id in projects {
        let summary = SnapshotService::summary(&pool, &project_id).await?;
        println!(
            "{} \"{}\" v{} (updated {}): {} lists, {} cards ({} in backlog, {} archived items), {} epics",
            summary.project_id,
            summary.project_name,
            summary.version,
            summary.updated_at,
            summary.lists,
            summary.cards,
            summary.backlog,
            summary.archived,
            summary.epics,
        );
    }

    Ok(())
}
