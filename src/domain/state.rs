use serde::{Deserialize, Serialize};

use super::card::Card;
use super::catalog::{Label, Member};
use super::epic::Epic;
use super::list::List;
use super::settings::Settings;

/// Where a card currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Index of the list, index of the card inside that list.
    List(usize, usize),
    /// Index inside the backlog collection.
    Backlog(usize),
}

/// The whole planning aggregate of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    #[serde(default)]
    pub lists: Vec<List>,
    #[serde(default)]
    pub epics: Vec<Epic>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub selected_card: Option<Card>,
    #[serde(default)]
    pub selected_epic: Option<Epic>,
    #[serde(default)]
    pub backlog_cards: Vec<Card>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub show_settings: bool,
}

impl ProjectState {
    pub fn list_index(&self, list_id: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.id == list_id)
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn list_mut(&mut self, list_id: &str) -> Option<&mut List> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    pub fn epic(&self, epic_id: &str) -> Option<&Epic> {
        self.epics.iter().find(|e| e.id == epic_id)
    }

    pub fn epic_mut(&mut self, epic_id: &str) -> Option<&mut Epic> {
        self.epics.iter_mut().find(|e| e.id == epic_id)
    }

    pub fn label(&self, label_id: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.id == label_id)
    }

    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn locate_card(&self, card_id: &str) -> Option<Location> {
        for (list_index, list) in self.lists.iter().enumerate() {
            if let Some(card_index) = list.card_index(card_id) {
                return Some(Location::List(list_index, card_index));
            }
        }

        self.backlog_cards
            .iter()
            .position(|c| c.id == card_id)
            .map(Location::Backlog)
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.locate_card(card_id).map(|location| self.card_at(location))
    }

    pub fn card_mut(&mut self, card_id: &str) -> Option<&mut Card> {
        let location = self.locate_card(card_id)?;
        Some(self.card_at_mut(location))
    }

    pub fn card_at(&self, location: Location) -> &Card {
        match location {
            Location::List(list, card) => &self.lists[list].cards[card],
            Location::Backlog(card) => &self.backlog_cards[card],
        }
    }

    pub fn card_at_mut(&mut self, location: Location) -> &mut Card {
        match location {
            Location::List(list, card) => &mut self.lists[list].cards[card],
            Location::Backlog(card) => &mut self.backlog_cards[card],
        }
    }

    /// Identity of the container at `location`; the backlog is `""`.
    pub fn container_id(&self, location: Location) -> &str {
        match location {
            Location::List(list, _) => &self.lists[list].id,
            Location::Backlog(_) => "",
        }
    }

    pub fn take_card_at(&mut self, location: Location) -> Card {
        match location {
            Location::List(list, card) => self.lists[list].cards.remove(card),
            Location::Backlog(card) => self.backlog_cards.remove(card),
        }
    }

    /// Every card, lists first (in stored order), then the backlog.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .chain(self.backlog_cards.iter())
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.lists
            .iter_mut()
            .flat_map(|l| l.cards.iter_mut())
            .chain(self.backlog_cards.iter_mut())
    }

    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|l| l.cards.len()).sum::<usize>() + self.backlog_cards.len()
    }

    pub fn is_terminal_list(&self, list_id: &str) -> bool {
        !list_id.is_empty() && self.list(list_id).is_some_and(|l| l.terminal)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::CardDraft;

    fn state_with_cards() -> ProjectState {
        let now = Utc::now();
        let mut todo = List::new("todo".into(), "To Do".into(), 0);
        todo.cards.push(Card::from_draft(CardDraft::titled("a"), "a".into(), "todo".into(), now));
        todo.cards.push(Card::from_draft(CardDraft::titled("b"), "b".into(), "todo".into(), now));

        ProjectState {
            lists: vec![todo],
            backlog_cards: vec![Card::from_draft(CardDraft::titled("c"), "c".into(), "".into(), now)],
            ..ProjectState::default()
        }
    }

    #[test]
    fn test_locate_card_in_lists_and_backlog() {
        let state = state_with_cards();

        assert_eq!(state.locate_card("b"), Some(Location::List(0, 1)));
        assert_eq!(state.locate_card("c"), Some(Location::Backlog(0)));
        assert_eq!(state.locate_card("zzz"), None);
        assert_eq!(state.container_id(Location::Backlog(0)), "");
        assert_eq!(state.container_id(Location::List(0, 0)), "todo");
    }

    #[test]
    fn test_cards_iterates_lists_before_backlog() {
        let state = state_with_cards();
        let ids: Vec<&str> = state.cards().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(state.card_count(), 3);
    }

    #[test]
    fn test_empty_snapshot_deserializes_with_defaults() {
        let state: ProjectState = serde_json::from_str("{}").unwrap();

        assert!(state.lists.is_empty());
        assert_eq!(state.settings.project_name, "Project Board");
        assert!(!state.show_settings);
    }
}
