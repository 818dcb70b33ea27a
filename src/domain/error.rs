use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Card,
    List,
    Epic,
    Label,
    Member,
    ChecklistItem,
    Author,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Card => "card",
            EntityKind::List => "list",
            EntityKind::Epic => "epic",
            EntityKind::Label => "label",
            EntityKind::Member => "member",
            EntityKind::ChecklistItem => "checklist item",
            EntityKind::Author => "author",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KanbanError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("missing {kind} reference: {id}")]
    MissingReference { kind: EntityKind, id: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KanbanError {
    pub fn missing(kind: EntityKind, id: impl Into<String>) -> Self {
        KanbanError::MissingReference {
            kind,
            id: id.into(),
        }
    }

    pub fn is_missing_reference(&self) -> bool {
        matches!(self, KanbanError::MissingReference { .. })
    }
}
