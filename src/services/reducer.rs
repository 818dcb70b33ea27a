//! The project state transition table.
//!
//! `apply` is the only entry point callers need: it never fails, and a
//! command that points at a missing card, list, epic, label or member leaves
//! the snapshot exactly as it was. `try_apply` runs the same transitions but
//! reports which reference was missing.
//!
//! Every transition works on a private copy of the snapshot, so a command is
//! either applied completely or not at all. Cards always move by id through
//! remove-then-insert, never by swapping indices.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{
    Card, CardDraft, ChecklistItem, Command, Comment, EntityKind, Epic, EpicDraft, KanbanError,
    Label, LabelDraft, List, Member, MemberDraft, ProjectState,
};

use super::environment::Environment;

pub fn apply(state: &ProjectState, command: Command, env: &mut dyn Environment) -> ProjectState {
    try_apply(state, command, env).unwrap_or_else(|_| state.clone())
}

pub fn try_apply(
    state: &ProjectState,
    command: Command,
    env: &mut dyn Environment,
) -> Result<ProjectState, KanbanError> {
    let mut next = state.clone();
    transition(&mut next, command, env)?;
    reindex_epics(&mut next);
    refresh_selection(&mut next);
    Ok(next)
}

/// Repairs a snapshot that came from outside the reducer (seed data, a
/// stored snapshot): every card's `list_id` is aligned with the container
/// that actually holds it and the derived epic index is rebuilt.
pub fn normalize(state: &mut ProjectState) {
    for list in &mut state.lists {
        for card in &mut list.cards {
            if card.list_id != list.id {
                card.list_id = list.id.clone();
            }
        }
    }
    for card in &mut state.backlog_cards {
        card.list_id.clear();
    }
    reindex_epics(state);
    refresh_selection(state);
}

fn transition(
    state: &mut ProjectState,
    command: Command,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    match command {
        Command::MoveCard {
            card_id,
            source_list_id,
            target_list_id,
            target_index,
        } => move_card(state, &card_id, &source_list_id, &target_list_id, target_index),
        Command::AddCard { list_id, card } => add_card(state, list_id, card, env),
        Command::UpdateCard { card } => update_card(state, card, env),
        Command::DeleteCard { card_id, list_id } => delete_card(state, &card_id, &list_id),
        Command::ArchiveCard { card_id, list_id } => archive_card(state, &card_id, &list_id),
        Command::RestoreCard {
            card_id,
            target_list_id,
        } => restore_card(state, &card_id, target_list_id),
        Command::AddList { title } => {
            let position = state.lists.len() as i64;
            state.lists.push(List::new(env.next_id(), title, position));
            Ok(())
        }
        Command::UpdateList { list_id, title } => {
            let list = state
                .list_mut(&list_id)
                .ok_or_else(|| KanbanError::missing(EntityKind::List, &list_id))?;
            list.title = title;
            Ok(())
        }
        Command::DeleteList { list_id } => delete_list(state, &list_id),
        Command::SetListTerminal { list_id, terminal } => {
            let list = state
                .list_mut(&list_id)
                .ok_or_else(|| KanbanError::missing(EntityKind::List, &list_id))?;
            list.terminal = terminal;
            Ok(())
        }
        Command::SelectCard { card } => {
            state.selected_card = card;
            Ok(())
        }
        Command::AddEpic { epic } => add_epic(state, epic, env),
        Command::UpdateEpic { epic } => update_epic(state, epic),
        Command::DeleteEpic { epic_id } => delete_epic(state, &epic_id),
        Command::ArchiveEpic { epic_id } => {
            set_epic_archived(state, &epic_id, true)?;
            clear_selected_epic(state, &epic_id);
            Ok(())
        }
        Command::RestoreEpic { epic_id } => set_epic_archived(state, &epic_id, false),
        Command::SelectEpic { epic } => {
            state.selected_epic = epic;
            Ok(())
        }
        Command::MoveToBacklog { card_id, list_id } => move_to_backlog(state, &card_id, &list_id),
        Command::MoveFromBacklog {
            card_id,
            target_list_id,
        } => move_from_backlog(state, &card_id, target_list_id),
        Command::ToggleCardLabel { card_id, label_id } => {
            toggle_card_label(state, &card_id, &label_id, env)
        }
        Command::ToggleCardMember { card_id, member_id } => {
            toggle_card_member(state, &card_id, &member_id, env)
        }
        Command::AddComment {
            card_id,
            text,
            author,
        } => add_comment(state, &card_id, text, author, env),
        Command::AddChecklistItem { card_id, text } => {
            edit_card(state, &card_id, env, |card, env| {
                card.checklist.push(ChecklistItem {
                    id: env.next_id(),
                    text,
                    completed: false,
                });
                Ok(())
            })
        }
        Command::ToggleChecklistItem { card_id, item_id } => {
            edit_card(state, &card_id, env, |card, _| {
                let item = card
                    .checklist
                    .iter_mut()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| KanbanError::missing(EntityKind::ChecklistItem, &item_id))?;
                item.completed = !item.completed;
                Ok(())
            })
        }
        Command::DeleteChecklistItem { card_id, item_id } => {
            edit_card(state, &card_id, env, |card, _| {
                let index = card
                    .checklist
                    .iter()
                    .position(|i| i.id == item_id)
                    .ok_or_else(|| KanbanError::missing(EntityKind::ChecklistItem, &item_id))?;
                card.checklist.remove(index);
                Ok(())
            })
        }
        Command::AddLabel { label } => add_label(state, label, env),
        Command::UpdateLabel { label } => {
            let existing = state
                .labels
                .iter_mut()
                .find(|l| l.id == label.id)
                .ok_or_else(|| KanbanError::missing(EntityKind::Label, &label.id))?;
            *existing = label;
            Ok(())
        }
        Command::DeleteLabel { label_id } => {
            let index = state
                .labels
                .iter()
                .position(|l| l.id == label_id)
                .ok_or_else(|| KanbanError::missing(EntityKind::Label, &label_id))?;
            state.labels.remove(index);
            Ok(())
        }
        Command::AddMember { member } => add_member(state, member, env),
        Command::UpdateMember { member } => {
            let existing = state
                .members
                .iter_mut()
                .find(|m| m.id == member.id)
                .ok_or_else(|| KanbanError::missing(EntityKind::Member, &member.id))?;
            *existing = member;
            Ok(())
        }
        Command::DeleteMember { member_id } => {
            let index = state
                .members
                .iter()
                .position(|m| m.id == member_id)
                .ok_or_else(|| KanbanError::missing(EntityKind::Member, &member_id))?;
            state.members.remove(index);
            Ok(())
        }
        Command::UpdateSettings { settings } => {
            state.settings.merge(settings);
            Ok(())
        }
        Command::ToggleSettingsPanel { show } => {
            state.show_settings = show.unwrap_or(!state.show_settings);
            Ok(())
        }
    }
}

// ── Cards ──────────────────────────────────────────────────

fn move_card(
    state: &mut ProjectState,
    card_id: &str,
    source_list_id: &str,
    target_list_id: &str,
    target_index: usize,
) -> Result<(), KanbanError> {
    let source = state
        .list_index(source_list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, source_list_id))?;
    let target = state
        .list_index(target_list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, target_list_id))?;

    let mut card = state.lists[source]
        .take_card(card_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, card_id))?;
    card.list_id = state.lists[target].id.clone();
    state.lists[target].insert_clamped(target_index, card);
    Ok(())
}

fn add_card(
    state: &mut ProjectState,
    list_id: String,
    draft: CardDraft,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let target = if list_id.is_empty() {
        None
    } else {
        Some(
            state
                .list_index(&list_id)
                .ok_or_else(|| KanbanError::missing(EntityKind::List, &list_id))?,
        )
    };

    let now = env.now();
    let card = Card::from_draft(draft, env.next_id(), list_id, now);
    match target {
        Some(index) => state.lists[index].cards.push(card),
        None => state.backlog_cards.push(card),
    }
    Ok(())
}

/// Replaces the card wholesale where it currently lives. Identity, creation
/// time and container are owned by the store, not by the caller's copy.
fn update_card(
    state: &mut ProjectState,
    card: Card,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let location = state
        .locate_card(&card.id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, &card.id))?;

    let current = state.card_at(location);
    let mut updated = card;
    updated.created_at = current.created_at;
    updated.updated_at = touch(current.updated_at, env.now());
    updated.list_id = state.container_id(location).to_string();

    *state.card_at_mut(location) = updated;
    Ok(())
}

fn delete_card(state: &mut ProjectState, card_id: &str, list_id: &str) -> Result<(), KanbanError> {
    let mut removed = state
        .list_mut(list_id)
        .and_then(|list| list.take_card(card_id))
        .is_some();

    let before = state.backlog_cards.len();
    state.backlog_cards.retain(|c| c.id != card_id);
    removed |= state.backlog_cards.len() != before;

    if !removed {
        return Err(KanbanError::missing(EntityKind::Card, card_id));
    }

    clear_selected_card(state, card_id);
    Ok(())
}

fn archive_card(state: &mut ProjectState, card_id: &str, list_id: &str) -> Result<(), KanbanError> {
    let mut found = false;

    if let Some(card) = state
        .list_mut(list_id)
        .and_then(|list| list.cards.iter_mut().find(|c| c.id == card_id))
    {
        card.archived = true;
        found = true;
    }
    for card in state.backlog_cards.iter_mut().filter(|c| c.id == card_id) {
        card.archived = true;
        found = true;
    }

    if !found {
        return Err(KanbanError::missing(EntityKind::Card, card_id));
    }

    clear_selected_card(state, card_id);
    Ok(())
}

fn restore_card(
    state: &mut ProjectState,
    card_id: &str,
    target_list_id: String,
) -> Result<(), KanbanError> {
    let location = state
        .locate_card(card_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, card_id))?;

    if target_list_id.is_empty() || state.container_id(location) == target_list_id {
        state.card_at_mut(location).archived = false;
        return Ok(());
    }

    let target = state
        .list_index(&target_list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, &target_list_id))?;

    let mut card = state.take_card_at(location);
    card.archived = false;
    card.list_id = target_list_id;
    state.lists[target].cards.push(card);
    Ok(())
}

fn move_to_backlog(state: &mut ProjectState, card_id: &str, list_id: &str) -> Result<(), KanbanError> {
    let index = state
        .list_index(list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, list_id))?;

    let mut card = state.lists[index]
        .take_card(card_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, card_id))?;
    card.list_id.clear();
    state.backlog_cards.push(card);
    Ok(())
}

fn move_from_backlog(
    state: &mut ProjectState,
    card_id: &str,
    target_list_id: String,
) -> Result<(), KanbanError> {
    let target = state
        .list_index(&target_list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, &target_list_id))?;
    let position = state
        .backlog_cards
        .iter()
        .position(|c| c.id == card_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, card_id))?;

    let mut card = state.backlog_cards.remove(position);
    card.list_id = target_list_id;
    state.lists[target].cards.push(card);
    Ok(())
}

fn toggle_card_label(
    state: &mut ProjectState,
    card_id: &str,
    label_id: &str,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let catalog_copy = state.label(label_id).cloned();

    edit_card(state, card_id, env, |card, _| {
        if let Some(index) = card.labels.iter().position(|l| l.id == label_id) {
            card.labels.remove(index);
            return Ok(());
        }
        let label = catalog_copy.ok_or_else(|| KanbanError::missing(EntityKind::Label, label_id))?;
        card.labels.push(label);
        Ok(())
    })
}

fn toggle_card_member(
    state: &mut ProjectState,
    card_id: &str,
    member_id: &str,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let catalog_copy = state.member(member_id).cloned();

    edit_card(state, card_id, env, |card, _| {
        if let Some(index) = card.members.iter().position(|m| m.id == member_id) {
            card.members.remove(index);
            return Ok(());
        }
        let member =
            catalog_copy.ok_or_else(|| KanbanError::missing(EntityKind::Member, member_id))?;
        card.members.push(member);
        Ok(())
    })
}

fn add_comment(
    state: &mut ProjectState,
    card_id: &str,
    text: String,
    author: Option<Member>,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let author = author.ok_or_else(|| KanbanError::missing(EntityKind::Author, "current member"))?;

    edit_card(state, card_id, env, |card, env| {
        card.comments.push(Comment {
            id: env.next_id(),
            text,
            author,
            created_at: env.now(),
        });
        Ok(())
    })
}

/// Runs a targeted edit on a card wherever it lives and refreshes its
/// `updated_at`. The environment is only consulted once the card is found.
fn edit_card<F>(
    state: &mut ProjectState,
    card_id: &str,
    env: &mut dyn Environment,
    edit: F,
) -> Result<(), KanbanError>
where
    F: FnOnce(&mut Card, &mut dyn Environment) -> Result<(), KanbanError>,
{
    let card = state
        .card_mut(card_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Card, card_id))?;
    edit(&mut *card, &mut *env)?;
    card.updated_at = touch(card.updated_at, env.now());
    Ok(())
}

/// `updated_at` must strictly increase even when the clock does not.
fn touch(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

// ── Lists ──────────────────────────────────────────────────

/// Removes the list and orphans its cards to the end of the backlog.
fn delete_list(state: &mut ProjectState, list_id: &str) -> Result<(), KanbanError> {
    let index = state
        .list_index(list_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::List, list_id))?;

    let list = state.lists.remove(index);
    for mut card in list.cards {
        card.list_id.clear();
        state.backlog_cards.push(card);
    }

    state.lists.sort_by_key(|l| l.position);
    for (rank, list) in state.lists.iter_mut().enumerate() {
        list.position = rank as i64;
    }
    Ok(())
}

// ── Epics ──────────────────────────────────────────────────

fn add_epic(
    state: &mut ProjectState,
    draft: EpicDraft,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    state.epics.push(draft.into_epic(env.next_id()));
    Ok(())
}

fn update_epic(state: &mut ProjectState, epic: Epic) -> Result<(), KanbanError> {
    let existing = state
        .epic_mut(&epic.id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Epic, &epic.id))?;
    *existing = epic;
    Ok(())
}

/// Removes the epic and unlinks every card that referenced it.
fn delete_epic(state: &mut ProjectState, epic_id: &str) -> Result<(), KanbanError> {
    let index = state
        .epics
        .iter()
        .position(|e| e.id == epic_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Epic, epic_id))?;
    state.epics.remove(index);

    for card in state.cards_mut() {
        if card.epic_id.as_deref() == Some(epic_id) {
            card.epic_id = None;
        }
    }

    clear_selected_epic(state, epic_id);
    Ok(())
}

fn set_epic_archived(state: &mut ProjectState, epic_id: &str, archived: bool) -> Result<(), KanbanError> {
    let epic = state
        .epic_mut(epic_id)
        .ok_or_else(|| KanbanError::missing(EntityKind::Epic, epic_id))?;
    epic.archived = archived;
    Ok(())
}

// ── Catalog ────────────────────────────────────────────────

fn add_label(
    state: &mut ProjectState,
    draft: LabelDraft,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    let label: Label = draft.into_label(env.next_id());
    state.labels.push(label);
    Ok(())
}

fn add_member(
    state: &mut ProjectState,
    draft: MemberDraft,
    env: &mut dyn Environment,
) -> Result<(), KanbanError> {
    state.members.push(draft.into_member(env.next_id()));
    Ok(())
}

// ── Derived bookkeeping ────────────────────────────────────

fn clear_selected_card(state: &mut ProjectState, card_id: &str) {
    if state.selected_card.as_ref().is_some_and(|c| c.id == card_id) {
        state.selected_card = None;
    }
}

fn clear_selected_epic(state: &mut ProjectState, epic_id: &str) {
    if state.selected_epic.as_ref().is_some_and(|e| e.id == epic_id) {
        state.selected_epic = None;
    }
}

/// Rebuilds every epic's card index from the cards that reference it, in
/// board order (lists, then backlog).
fn reindex_epics(state: &mut ProjectState) {
    let mut index: HashMap<String, Vec<String>> = HashMap::new();
    for card in state.cards() {
        if let Some(epic_id) = &card.epic_id {
            index.entry(epic_id.clone()).or_default().push(card.id.clone());
        }
    }

    for epic in &mut state.epics {
        epic.cards = index.remove(&epic.id).unwrap_or_default();
    }
}

/// The selected card and epic are mirrors of live entities; keep them
/// current. Drafts (ids with no live entity) are left untouched.
fn refresh_selection(state: &mut ProjectState) {
    let live_card = state
        .selected_card
        .as_ref()
        .and_then(|selected| state.card(&selected.id))
        .cloned();
    if live_card.is_some() {
        state.selected_card = live_card;
    }

    let live_epic = state
        .selected_epic
        .as_ref()
        .filter(|selected| !selected.is_draft())
        .and_then(|selected| state.epic(&selected.id))
        .cloned();
    if live_epic.is_some() {
        state.selected_epic = live_epic;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::services::environment::SequentialEnvironment;

    fn env() -> SequentialEnvironment {
        SequentialEnvironment::new("id-", Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_touch_is_strictly_increasing() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

        assert_eq!(touch(t, t + Duration::seconds(5)), t + Duration::seconds(5));
        assert_eq!(touch(t, t), t + Duration::milliseconds(1));
        assert_eq!(touch(t, t - Duration::hours(1)), t + Duration::milliseconds(1));
    }

    #[test]
    fn test_normalize_aligns_list_ids_and_epic_index() {
        let mut env = env();
        let now = env.now();
        let mut list = List::new("todo".into(), "To Do".into(), 0);
        let mut stray = Card::from_draft(CardDraft::titled("stray"), "c1".into(), "done".into(), now);
        stray.epic_id = Some("e1".into());
        list.cards.push(stray);

        let mut epic = EpicDraft::default().into_epic("e1".into());
        epic.cards = vec!["ghost".into()];

        let mut state = ProjectState {
            lists: vec![list],
            epics: vec![epic],
            backlog_cards: vec![Card::from_draft(
                CardDraft::titled("b"),
                "c2".into(),
                "todo".into(),
                now,
            )],
            ..ProjectState::default()
        };

        normalize(&mut state);

        assert_eq!(state.lists[0].cards[0].list_id, "todo");
        assert_eq!(state.backlog_cards[0].list_id, "");
        assert_eq!(state.epics[0].cards, vec!["c1".to_string()]);
    }

    #[test]
    fn test_missing_reference_returns_identical_snapshot() {
        let mut env = env();
        let state = ProjectState::default();
        let command = Command::UpdateList {
            list_id: "nope".into(),
            title: "Renamed".into(),
        };

        let err = try_apply(&state, command.clone(), &mut env).unwrap_err();
        assert!(matches!(
            err,
            KanbanError::MissingReference { kind: EntityKind::List, ref id } if id == "nope"
        ));
        assert_eq!(apply(&state, command, &mut env), state);
    }
}
