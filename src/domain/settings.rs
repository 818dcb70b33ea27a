use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    #[default]
    Url,
    Upload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub project_name: String,
    #[serde(default)]
    pub background_image: String,
    #[serde(default)]
    pub background_type: BackgroundKind,
    #[serde(default)]
    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name: "Project Board".into(),
            background_image: String::new(),
            background_type: BackgroundKind::Url,
            dark_mode: false,
        }
    }
}

impl Settings {
    /// Shallow merge: only fields present in the patch are overwritten.
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(project_name) = patch.project_name {
            self.project_name = project_name;
        }
        if let Some(background_image) = patch.background_image {
            self.background_image = background_image;
        }
        if let Some(background_type) = patch.background_type {
            self.background_type = background_type;
        }
        if let Some(dark_mode) = patch.dark_mode {
            self.dark_mode = dark_mode;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_type: Option<BackgroundKind>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
}
