use crate::domain::{KanbanError, ProjectState};

use super::reducer;

const DEMO_BOARD: &str = include_str!("seed/demo_board.json");

/// The board a brand new project starts with: four stages (the last one
/// terminal), two epics, a small label and member catalog and one backlog card.
pub fn demo_project() -> Result<ProjectState, KanbanError> {
    let mut state: ProjectState = serde_json::from_str(DEMO_BOARD)?;
    reducer::normalize(&mut state);
    tracing::debug!(
        lists = state.lists.len(),
        cards = state.card_count(),
        "Loaded demo board seed"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::views;

    #[test]
    fn test_demo_board_parses() {
        let state = demo_project().unwrap();

        assert_eq!(state.lists.len(), 4);
        assert_eq!(state.card_count(), 4);
        assert_eq!(state.labels.len(), 6);
        assert_eq!(state.members.len(), 3);
        assert!(state.is_terminal_list("4"));
        assert!(!state.is_terminal_list("1"));
    }

    #[test]
    fn test_demo_epic_index_is_rebuilt_from_cards() {
        let state = demo_project().unwrap();
        let epic = state.epic("1").unwrap();

        assert_eq!(epic.cards, vec!["1", "2", "3", "4"]);
        assert_eq!(views::epic_progress(&state, "1"), 25);
        assert_eq!(views::epic_progress(&state, "2"), 0);
    }
}
