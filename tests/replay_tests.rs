mod common;

use tokio::io::BufReader;

use common::{card_ids, empty_board, env, setup_test_db};
use project_board::services::{replay, ProjectStore, ReplayStats, SnapshotPersister, SnapshotService};

const SCRIPT: &str = r#"
# three good commands, then one pointing at a list that does not exist
{"type":"add_list","title":"QA"}
{"type":"add_card","list_id":"A","card":{"title":"first"}}
{"type":"add_card","card":{"title":"parked"}}
{"type":"move_card","card_id":"gen-2","source_list_id":"A","target_list_id":"ghost","target_index":0}
{"type":"add_list","title":"Release"}
"#;

fn session(pool: &sqlx::SqlitePool, project_id: &str) -> (ProjectStore, SnapshotPersister) {
    let store = ProjectStore::new(empty_board(), Box::new(env()), 64);
    let persister = SnapshotPersister {
        db: pool.clone(),
        project_id: project_id.into(),
        updates: store.subscribe(),
    };
    (store, persister)
}

#[tokio::test]
async fn test_strict_failure_still_persists_earlier_snapshots() {
    let (_dir, pool) = setup_test_db().await;
    let (store, persister) = session(&pool, "strict");

    let err = replay::run(store, persister, BufReader::new(SCRIPT.as_bytes()), true)
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("line 6"));

    let summary = SnapshotService::summary(&pool, "strict").await.unwrap();
    assert_eq!(summary.version, 3);

    let stored = SnapshotService::load(&pool, "strict").await.unwrap().unwrap();
    assert_eq!(stored.lists.len(), 4);
    assert_eq!(card_ids(&stored, "A"), vec!["gen-2".to_string()]);
    assert_eq!(stored.backlog_cards.len(), 1);
}

#[tokio::test]
async fn test_lenient_replay_counts_and_persists_everything() {
    let (_dir, pool) = setup_test_db().await;
    let (store, persister) = session(&pool, "lenient");
    let script = format!("{}not json\n{{\"type\":\"add_list\",\"title\":\"  \"}}\n", SCRIPT);

    let outcome = replay::run(store, persister, BufReader::new(script.as_bytes()), false)
        .await
        .unwrap();

    assert_eq!(
        outcome.stats,
        ReplayStats {
            applied: 4,
            ignored: 1,
            rejected: 2,
        }
    );
    assert_eq!(outcome.saved, 4);
    assert_eq!(outcome.state.lists.len(), 5);

    let stored = SnapshotService::load(&pool, "lenient").await.unwrap().unwrap();
    assert_eq!(&stored, outcome.state.as_ref());
}
