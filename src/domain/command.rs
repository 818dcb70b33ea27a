use serde::{Deserialize, Serialize};

use super::card::{Card, CardDraft};
use super::catalog::{Label, LabelDraft, Member, MemberDraft};
use super::epic::{Epic, EpicDraft};
use super::error::KanbanError;
use super::settings::SettingsPatch;

/// Every state change the project store accepts.
///
/// An empty list id always means the backlog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    MoveCard {
        card_id: String,
        source_list_id: String,
        target_list_id: String,
        target_index: usize,
    },
    AddCard {
        #[serde(default)]
        list_id: String,
        card: CardDraft,
    },
    UpdateCard {
        card: Card,
    },
    DeleteCard {
        card_id: String,
        #[serde(default)]
        list_id: String,
    },
    ArchiveCard {
        card_id: String,
        #[serde(default)]
        list_id: String,
    },
    RestoreCard {
        card_id: String,
        #[serde(default)]
        target_list_id: String,
    },
    AddList {
        title: String,
    },
    UpdateList {
        list_id: String,
        title: String,
    },
    DeleteList {
        list_id: String,
    },
    SetListTerminal {
        list_id: String,
        terminal: bool,
    },
    SelectCard {
        card: Option<Card>,
    },
    AddEpic {
        epic: EpicDraft,
    },
    UpdateEpic {
        epic: Epic,
    },
    DeleteEpic {
        epic_id: String,
    },
    ArchiveEpic {
        epic_id: String,
    },
    RestoreEpic {
        epic_id: String,
    },
    SelectEpic {
        epic: Option<Epic>,
    },
    MoveToBacklog {
        card_id: String,
        list_id: String,
    },
    MoveFromBacklog {
        card_id: String,
        target_list_id: String,
    },
    ToggleCardLabel {
        card_id: String,
        label_id: String,
    },
    ToggleCardMember {
        card_id: String,
        member_id: String,
    },
    AddComment {
        card_id: String,
        text: String,
        #[serde(default)]
        author: Option<Member>,
    },
    AddChecklistItem {
        card_id: String,
        text: String,
    },
    ToggleChecklistItem {
        card_id: String,
        item_id: String,
    },
    DeleteChecklistItem {
        card_id: String,
        item_id: String,
    },
    AddLabel {
        label: LabelDraft,
    },
    UpdateLabel {
        label: Label,
    },
    DeleteLabel {
        label_id: String,
    },
    AddMember {
        member: MemberDraft,
    },
    UpdateMember {
        member: Member,
    },
    DeleteMember {
        member_id: String,
    },
    UpdateSettings {
        settings: SettingsPatch,
    },
    ToggleSettingsPanel {
        #[serde(default)]
        show: Option<bool>,
    },
}

impl Command {
    pub fn kind(&self) -> &'static str {
        match self {
            Command::MoveCard { .. } => "move_card",
            Command::AddCard { .. } => "add_card",
            Command::UpdateCard { .. } => "update_card",
            Command::DeleteCard { .. } => "delete_card",
            Command::ArchiveCard { .. } => "archive_card",
            Command::RestoreCard { .. } => "restore_card",
            Command::AddList { .. } => "add_list",
            Command::UpdateList { .. } => "update_list",
            Command::DeleteList { .. } => "delete_list",
            Command::SetListTerminal { .. } => "set_list_terminal",
            Command::SelectCard { .. } => "select_card",
            Command::AddEpic { .. } => "add_epic",
            Command::UpdateEpic { .. } => "update_epic",
            Command::DeleteEpic { .. } => "delete_epic",
            Command::ArchiveEpic { .. } => "archive_epic",
            Command::RestoreEpic { .. } => "restore_epic",
            Command::SelectEpic { .. } => "select_epic",
            Command::MoveToBacklog { .. } => "move_to_backlog",
            Command::MoveFromBacklog { .. } => "move_from_backlog",
            Command::ToggleCardLabel { .. } => "toggle_card_label",
            Command::ToggleCardMember { .. } => "toggle_card_member",
            Command::AddComment { .. } => "add_comment",
            Command::AddChecklistItem { .. } => "add_checklist_item",
            Command::ToggleChecklistItem { .. } => "toggle_checklist_item",
            Command::DeleteChecklistItem { .. } => "delete_checklist_item",
            Command::AddLabel { .. } => "add_label",
            Command::UpdateLabel { .. } => "update_label",
            Command::DeleteLabel { .. } => "delete_label",
            Command::AddMember { .. } => "add_member",
            Command::UpdateMember { .. } => "update_member",
            Command::DeleteMember { .. } => "delete_member",
            Command::UpdateSettings { .. } => "update_settings",
            Command::ToggleSettingsPanel { .. } => "toggle_settings_panel",
        }
    }

    /// Input validation the caller runs before dispatching. The store itself
    /// never rejects a payload; it only ignores dangling references.
    pub fn validate(&self) -> Result<(), KanbanError> {
        match self {
            Command::AddCard { card, .. } => require("card title", &card.title),
            Command::UpdateCard { card } => require("card title", &card.title),
            Command::AddList { title } | Command::UpdateList { title, .. } => {
                require("list title", title)
            }
            Command::AddEpic { epic } => require("epic title", &epic.title),
            Command::UpdateEpic { epic } => require("epic title", &epic.title),
            Command::AddComment { text, .. } => require("comment text", text),
            Command::AddChecklistItem { text, .. } => require("checklist item text", text),
            Command::AddLabel { label } => require("label name", &label.name),
            Command::UpdateLabel { label } => require("label name", &label.name),
            Command::AddMember { member } => require("member name", &member.name),
            Command::UpdateMember { member } => require("member name", &member.name),
            Command::UpdateSettings { settings } => match &settings.project_name {
                Some(name) => require("project name", name),
                None => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), KanbanError> {
    if value.trim().is_empty() {
        return Err(KanbanError::BadRequest(format!("{} must not be blank", field)));
    }
    Ok(())
}
