use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDraft {
    pub name: String,
    pub color: String,
}

impl LabelDraft {
    pub fn into_label(self, id: String) -> Label {
        Label {
            id,
            name: self.name,
            color: self.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub email: String,
}

impl MemberDraft {
    pub fn into_member(self, id: String) -> Member {
        Member {
            id,
            name: self.name,
            avatar: self.avatar,
            email: self.email,
        }
    }
}
