use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A theme grouping many cards.
///
/// Progress is never stored here; it is derived from the cards that
/// reference the epic (see `services::views::epic_progress`). `cards` is an
/// index of those card ids that the reducer rebuilds after every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub cards: Vec<String>,
    #[serde(default)]
    pub archived: bool,
}

impl Epic {
    /// An unsaved epic with an empty id; selecting it means "create new".
    pub fn blank(color: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            color: color.into(),
            start_date: None,
            end_date: None,
            cards: Vec::new(),
            archived: false,
        }
    }

    pub fn is_draft(&self) -> bool {
        self.id.is_empty()
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl EpicDraft {
    pub fn into_epic(self, id: String) -> Epic {
        Epic {
            id,
            title: self.title,
            description: self.description,
            color: self.color,
            start_date: self.start_date,
            end_date: self.end_date,
            cards: Vec::new(),
            archived: false,
        }
    }
}
