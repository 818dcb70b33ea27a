#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

use project_board::domain::{CardDraft, Command, List, ProjectState};
use project_board::infrastructure::db;
use project_board::services::{apply, SequentialEnvironment};

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

pub fn env() -> SequentialEnvironment {
    SequentialEnvironment::new("gen-", start_time())
}

/// Lists "A" (position 0), "B" (1) and a terminal "done" (2), all empty.
pub fn empty_board() -> ProjectState {
    let mut done = List::new("done".into(), "Done".into(), 2);
    done.terminal = true;

    ProjectState {
        lists: vec![
            List::new("A".into(), "To Do".into(), 0),
            List::new("B".into(), "In Progress".into(), 1),
            done,
        ],
        ..ProjectState::default()
    }
}

/// Adds a card and returns the new state plus the id the store assigned.
pub fn add_card(
    state: &ProjectState,
    env: &mut SequentialEnvironment,
    list_id: &str,
    title: &str,
) -> (ProjectState, String) {
    let next = apply(
        state,
        Command::AddCard {
            list_id: list_id.into(),
            card: CardDraft::titled(title),
        },
        env,
    );
    let id = next
        .cards()
        .find(|c| c.title == title)
        .map(|c| c.id.clone())
        .expect("card should have been added");
    (next, id)
}

/// List "A" holding [c1, c2], "B" empty, as in the relocation scenario.
pub fn board_with_two_cards(env: &mut SequentialEnvironment) -> (ProjectState, String, String) {
    let state = empty_board();
    let (state, c1) = add_card(&state, env, "A", "c1");
    let (state, c2) = add_card(&state, env, "A", "c2");
    (state, c1, c2)
}

pub fn card_ids(state: &ProjectState, list_id: &str) -> Vec<String> {
    if list_id.is_empty() {
        return state.backlog_cards.iter().map(|c| c.id.clone()).collect();
    }
    state
        .list(list_id)
        .map(|l| l.cards.iter().map(|c| c.id.clone()).collect())
        .unwrap_or_default()
}

/// Every card sits in exactly one container, and that container agrees
/// with the card's `list_id`.
pub fn assert_containers_consistent(state: &ProjectState) {
    let mut seen = std::collections::HashSet::new();
    for list in &state.lists {
        for card in &list.cards {
            assert_eq!(card.list_id, list.id, "card {} in list {}", card.id, list.id);
            assert!(seen.insert(card.id.clone()), "card {} appears twice", card.id);
        }
    }
    for card in &state.backlog_cards {
        assert!(card.list_id.is_empty(), "backlog card {} has list {}", card.id, card.list_id);
        assert!(seen.insert(card.id.clone()), "card {} appears twice", card.id);
    }
}

pub async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("temporary directory should be created");
    let url = format!("sqlite:{}", dir.path().join("board.db").display());
    let pool = db::init_db(&url)
        .await
        .expect("Failed to create test database");
    (dir, pool)
}
