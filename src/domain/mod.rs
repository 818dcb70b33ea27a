pub mod card;
pub mod catalog;
pub mod command;
pub mod epic;
pub mod error;
pub mod list;
pub mod settings;
pub mod state;

pub use card::{Attachment, Card, CardDraft, ChecklistItem, Comment, Priority};
pub use catalog::{Label, LabelDraft, Member, MemberDraft};
pub use command::Command;
pub use epic::{Epic, EpicDraft};
pub use error::{EntityKind, KanbanError};
pub use list::List;
pub use settings::{BackgroundKind, Settings, SettingsPatch};
pub use state::{Location, ProjectState};
