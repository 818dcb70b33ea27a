//! Read-only projections over a snapshot. Nothing here mutates state.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Card, Epic, List, Priority, ProjectState};

/// Non-archived cards that reference the epic, in board order.
pub fn epic_cards<'a>(state: &'a ProjectState, epic_id: &str) -> Vec<&'a Card> {
    state
        .cards()
        .filter(|c| !c.archived && c.epic_id.as_deref() == Some(epic_id))
        .collect()
}

/// Share of the epic's cards sitting in a terminal list, rounded to a
/// whole percent. An epic with no cards is at 0.
pub fn epic_progress(state: &ProjectState, epic_id: &str) -> u8 {
    let cards = epic_cards(state, epic_id);
    let completed = cards
        .iter()
        .filter(|c| state.is_terminal_list(&c.list_id))
        .count();
    percent(completed, cards.len())
}

pub fn checklist_progress(card: &Card) -> u8 {
    let completed = card.checklist.iter().filter(|i| i.completed).count();
    percent(completed, card.checklist.len())
}

fn percent(part: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u8
}

pub fn archived_cards(state: &ProjectState) -> Vec<&Card> {
    state.cards().filter(|c| c.archived).collect()
}

pub fn archived_epics(state: &ProjectState) -> Vec<&Epic> {
    state.epics.iter().filter(|e| e.archived).collect()
}

pub fn archived_count(state: &ProjectState) -> usize {
    archived_cards(state).len() + archived_epics(state).len()
}

#[derive(Debug, Default)]
pub struct ArchiveMatches<'a> {
    pub cards: Vec<&'a Card>,
    pub epics: Vec<&'a Epic>,
}

pub fn search_archive<'a>(state: &'a ProjectState, query: &str) -> ArchiveMatches<'a> {
    ArchiveMatches {
        cards: archived_cards(state)
            .into_iter()
            .filter(|c| c.matches_query(query))
            .collect(),
        epics: archived_epics(state)
            .into_iter()
            .filter(|e| e.matches_query(query))
            .collect(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

pub fn active_backlog<'a>(state: &'a ProjectState, filter: &BacklogFilter) -> Vec<&'a Card> {
    state
        .backlog_cards
        .iter()
        .filter(|c| !c.archived)
        .filter(|c| c.matches_query(&filter.query))
        .filter(|c| match &filter.epic_id {
            Some(epic_id) => c.epic_id.as_ref() == Some(epic_id),
            None => true,
        })
        .filter(|c| filter.priority.map_or(true, |p| c.priority == p))
        .collect()
}

/// Non-archived epics matching `query`; finished ones sink to the bottom,
/// otherwise stored order is kept.
pub fn active_epics<'a>(state: &'a ProjectState, query: &str) -> Vec<&'a Epic> {
    let mut epics: Vec<&Epic> = state
        .epics
        .iter()
        .filter(|e| !e.archived && e.matches_query(query))
        .collect();
    epics.sort_by_key(|e| epic_progress(state, &e.id) == 100);
    epics
}

#[derive(Debug)]
pub struct ListView<'a> {
    pub list: &'a List,
    pub cards: Vec<&'a Card>,
}

/// Lists in position order with archived cards hidden.
pub fn visible_lists(state: &ProjectState) -> Vec<ListView<'_>> {
    let mut lists: Vec<&List> = state.lists.iter().collect();
    lists.sort_by_key(|l| l.position);
    lists
        .into_iter()
        .map(|list| ListView {
            list,
            cards: list.cards.iter().filter(|c| !c.archived).collect(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueFilter {
    #[default]
    All,
    Overdue,
    Today,
    /// Same ISO week as today.
    Week,
    /// Same calendar month as today.
    Month,
    #[serde(rename = "none")]
    NoDueDate,
}

impl DueFilter {
    pub fn matches(&self, due: Option<NaiveDate>, today: NaiveDate) -> bool {
        match (self, due) {
            (DueFilter::All, _) => true,
            (DueFilter::NoDueDate, due) => due.is_none(),
            (_, None) => false,
            (DueFilter::Overdue, Some(due)) => due < today,
            (DueFilter::Today, Some(due)) => due == today,
            (DueFilter::Week, Some(due)) => due.iso_week() == today.iso_week(),
            (DueFilter::Month, Some(due)) => due.year() == today.year() && due.month() == today.month(),
        }
    }
}

/// Board filter. Facets combine with AND; values inside a facet with OR.
/// An empty facet matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFilter {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub priorities: Vec<Priority>,
    #[serde(default)]
    pub due: DueFilter,
    /// List ids, i.e. board stages.
    #[serde(default)]
    pub lists: Vec<String>,
}

impl CardFilter {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
            && self.members.is_empty()
            && self.priorities.is_empty()
            && self.due == DueFilter::All
            && self.lists.is_empty()
    }

    pub fn matches(&self, card: &Card, today: NaiveDate) -> bool {
        (self.labels.is_empty() || self.labels.iter().any(|id| card.has_label(id)))
            && (self.members.is_empty() || self.members.iter().any(|id| card.has_member(id)))
            && (self.priorities.is_empty() || self.priorities.contains(&card.priority))
            && self.due.matches(card.due_date, today)
            && (self.lists.is_empty() || self.lists.contains(&card.list_id))
    }
}

/// Non-archived cards on the board (not the backlog) that pass the filter.
pub fn filter_cards<'a>(state: &'a ProjectState, filter: &CardFilter, today: NaiveDate) -> Vec<&'a Card> {
    state
        .lists
        .iter()
        .flat_map(|l| l.cards.iter())
        .filter(|c| !c.archived && filter.matches(c, today))
        .collect()
}
