use serde::{Deserialize, Serialize};

use super::card::Card;

/// An ordered column of cards.
///
/// `terminal` marks the "Done" stage: cards residing in a terminal list
/// count as completed for epic progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    pub position: i64,
    #[serde(default)]
    pub terminal: bool,
}

impl List {
    pub fn new(id: String, title: String, position: i64) -> Self {
        Self {
            id,
            title,
            cards: Vec::new(),
            position,
            terminal: false,
        }
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn take_card(&mut self, card_id: &str) -> Option<Card> {
        let index = self.card_index(card_id)?;
        Some(self.cards.remove(index))
    }

    /// Inserts at `index`, degrading to an append when it is past the end.
    pub fn insert_clamped(&mut self, index: usize, card: Card) {
        let index = index.min(self.cards.len());
        self.cards.insert(index, card);
    }
}
