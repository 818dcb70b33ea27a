use anyhow::Context;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use project_board::config::Config;
use project_board::domain::ProjectState;
use project_board::infrastructure::db;
use project_board::services::{
    replay, seed, views, ProjectStore, ReplaySession, SnapshotPersister, SnapshotService,
    SystemEnvironment,
};

/// Replays a JSON-lines command script against a stored project board.
///
/// Usage: `board-replay [commands.jsonl]` (reads stdin without a path).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,project_board=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting board replay v{}...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env, using defaults: {}", e);
        Config::default()
    });

    let pool = db::init_db(&config.database_url)
        .await
        .context("failed to open snapshot database")?;

    let initial = match SnapshotService::load(&pool, &config.project_id).await? {
        Some(state) => {
            tracing::info!(project_id = config.project_id.as_str(), "Resuming stored project");
            state
        }
        None if config.seed_demo => {
            tracing::info!(project_id = config.project_id.as_str(), "Seeding new project with demo board");
            seed::demo_project()?
        }
        None => ProjectState::default(),
    };

    let current_member = match &config.current_member_id {
        Some(id) => initial.member(id).cloned(),
        None => initial.members.first().cloned(),
    };

    let mut store = ProjectStore::new(initial, Box::new(SystemEnvironment), config.observer_capacity);
    match current_member {
        Some(member) => {
            tracing::info!(member = member.name.as_str(), "Acting as member");
            store = store.with_current_member(member);
        }
        None => tracing::warn!("No current member resolved; comments without an author will be ignored"),
    }

    let persister = SnapshotPersister {
        db: pool.clone(),
        project_id: config.project_id.clone(),
        updates: store.subscribe(),
    };

    let session = match std::env::args().nth(1) {
        Some(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("failed to open command script {}", path))?;
            replay::run(store, persister, BufReader::new(file), config.strict).await?
        }
        None => replay::run(store, persister, BufReader::new(tokio::io::stdin()), config.strict).await?,
    };
    let ReplaySession { stats, saved, state } = session;

    println!("project:   {} ({})", state.settings.project_name, config.project_id);
    println!("commands:  {} applied, {} ignored, {} rejected", stats.applied, stats.ignored, stats.rejected);
    println!("snapshots: {} saved", saved);
    for view in views::visible_lists(&state) {
        let marker = if view.list.terminal { " [done]" } else { "" };
        println!("  {}{}: {} cards", view.list.title, marker, view.cards.len());
    }
    println!(
        "  Backlog: {} cards",
        views::active_backlog(&state, &Default::default()).len()
    );
    for epic in views::active_epics(&state, "") {
        println!("  Epic {}: {}%", epic.title, views::epic_progress(&state, &epic.id));
    }

    tracing::info!("Board replay finished");
    Ok(())
}
