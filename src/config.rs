use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub project_id: String,
    pub seed_demo: bool,
    pub observer_capacity: usize,
    pub strict: bool,
    pub current_member_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Builds the config from any key lookup. A malformed value only costs
    /// that one setting its default; the rest are still honoured.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            database_url: lookup("BOARD_DATABASE_URL").unwrap_or(defaults.database_url),
            project_id: lookup("BOARD_PROJECT_ID").unwrap_or(defaults.project_id),
            seed_demo: parse_flag("BOARD_SEED_DEMO", lookup("BOARD_SEED_DEMO"), defaults.seed_demo),
            observer_capacity: lookup("BOARD_OBSERVER_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.observer_capacity),
            strict: parse_flag("BOARD_STRICT", lookup("BOARD_STRICT"), defaults.strict),
            current_member_id: lookup("BOARD_MEMBER_ID").filter(|v| !v.trim().is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:board.db".into(),
            project_id: "default".into(),
            seed_demo: true,
            observer_capacity: 100,
            strict: false,
            current_member_id: None,
        }
    }
}

fn parse_flag(key: &str, value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            tracing::warn!(key, value = other, default, "Ignoring non-boolean flag, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_parse_flag_falls_back_to_default() {
        assert!(parse_flag("BOARD_STRICT", None, true));
        assert!(!parse_flag("BOARD_STRICT", None, false));
        assert!(parse_flag("BOARD_STRICT", Some(" Yes ".into()), false));
        assert!(!parse_flag("BOARD_STRICT", Some("off".into()), true));
        assert!(parse_flag("BOARD_STRICT", Some("maybe".into()), true));
    }

    #[test]
    fn test_malformed_flag_keeps_other_settings() {
        let config = Config::from_lookup(lookup(&[
            ("BOARD_DATABASE_URL", "sqlite:prod.db"),
            ("BOARD_PROJECT_ID", "roadmap"),
            ("BOARD_MEMBER_ID", "2"),
            ("BOARD_STRICT", "maybe"),
            ("BOARD_SEED_DEMO", "sometimes"),
        ]));

        assert_eq!(config.database_url, "sqlite:prod.db");
        assert_eq!(config.project_id, "roadmap");
        assert_eq!(config.current_member_id.as_deref(), Some("2"));
        assert!(!config.strict);
        assert!(config.seed_demo);
    }

    #[test]
    fn test_empty_lookup_matches_default() {
        let config = Config::from_lookup(|_| None);
        let default = Config::default();

        assert_eq!(config.database_url, default.database_url);
        assert_eq!(config.project_id, "default");
        assert_eq!(config.observer_capacity, 100);
        assert!(config.seed_demo);
        assert!(!config.strict);
        assert!(config.current_member_id.is_none());
    }
}
