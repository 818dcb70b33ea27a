use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::{Label, Member};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[
            Priority::Urgent,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    /// Value copy of the author at the time of writing.
    pub author: Member,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A unit of work on the board.
///
/// `list_id` names the list whose card sequence holds this card; an empty
/// string means the card lives in the backlog. Labels and members are value
/// copies taken when they were attached, so catalog edits never reach them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub list_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub archived: bool,
}

impl Card {
    pub fn from_draft(draft: CardDraft, id: String, list_id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            list_id,
            epic_id: draft.epic_id,
            labels: draft.labels,
            members: draft.members,
            due_date: draft.due_date,
            priority: draft.priority.unwrap_or_default(),
            checklist: draft.checklist,
            comments: draft.comments,
            attachments: draft.attachments,
            created_at: now,
            updated_at: now,
            archived: false,
        }
    }

    pub fn in_backlog(&self) -> bool {
        self.list_id.is_empty()
    }

    pub fn has_label(&self, label_id: &str) -> bool {
        self.labels.iter().any(|l| l.id == label_id)
    }

    pub fn has_member(&self, member_id: &str) -> bool {
        self.members.iter().any(|m| m.id == member_id)
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
    }
}

/// Everything a caller supplies when creating a card. The store assigns the
/// id and timestamps; the target container comes from the command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl CardDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_round_trips_through_str() {
        for priority in Priority::all() {
            assert_eq!(priority.as_str().parse::<Priority>(), Ok(*priority));
        }
        assert!("critical".parse::<Priority>().is_err());
    }

    #[test]
    fn test_draft_without_priority_defaults_to_medium() {
        let now = Utc::now();
        let card = Card::from_draft(CardDraft::titled("Write docs"), "c1".into(), "".into(), now);

        assert_eq!(card.priority, Priority::Medium);
        assert!(card.in_backlog());
        assert!(!card.archived);
        assert_eq!(card.created_at, card.updated_at);
    }

    #[test]
    fn test_card_deserializes_ui_shape() {
        let card: Card = serde_json::from_str(
            r#"{
                "id": "4",
                "title": "Mobile responsive design",
                "description": "Works on phones",
                "listId": "",
                "epicId": "1",
                "labels": [{"id": "1", "name": "Design", "color": "bg-purple-500"}],
                "members": [],
                "priority": "low",
                "checklist": [],
                "comments": [],
                "attachments": [{"id": "a1", "name": "design.pdf", "url": "/design.pdf", "type": "pdf"}],
                "createdAt": "2024-01-03T12:00:00Z",
                "updatedAt": "2024-01-03T12:00:00Z"
            }"#,
        )
        .unwrap();

        assert!(card.in_backlog());
        assert_eq!(card.epic_id.as_deref(), Some("1"));
        assert_eq!(card.priority, Priority::Low);
        assert_eq!(card.attachments[0].kind, "pdf");
        assert!(!card.archived);
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let now = Utc::now();
        let mut card = Card::from_draft(CardDraft::titled("Implement API"), "c".into(), "1".into(), now);
        card.description = "REST endpoints".into();

        assert!(card.matches_query("api"));
        assert!(card.matches_query("rest"));
        assert!(card.matches_query("  "));
        assert!(!card.matches_query("graphql"));
    }
}
