//! Host configuration read from the environment.

use std::path::PathBuf;

use log::LevelFilter;

pub const SETTINGS_PATH_VAR: &str = "LUMEN_SETTINGS_PATH";
pub const PAGE_VAR: &str = "LUMEN_PAGE";
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const DEBUG_VAR: &str = "LUMEN_DEBUG";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostConfig {
    /// Settings file; settings stay in memory when unset.
    pub settings_path: Option<PathBuf>,
    /// JSON document to load as the page; an empty page when unset.
    pub page_path: Option<PathBuf>,
    pub gemini_api_key: Option<String>,
    pub debug: bool,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            settings_path: non_empty(SETTINGS_PATH_VAR).map(PathBuf::from),
            page_path: non_empty(PAGE_VAR).map(PathBuf::from),
            gemini_api_key: non_empty(API_KEY_VAR),
            debug: non_empty(DEBUG_VAR)
                .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> HostConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        HostConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config(&[]);
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.log_level(), LevelFilter::Info);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            (SETTINGS_PATH_VAR, "/tmp/lumen.json"),
            (PAGE_VAR, "page.json"),
            (API_KEY_VAR, "secret"),
            (DEBUG_VAR, "TRUE"),
        ]);
        assert_eq!(config.settings_path, Some(PathBuf::from("/tmp/lumen.json")));
        assert_eq!(config.page_path, Some(PathBuf::from("page.json")));
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[(API_KEY_VAR, "  "), (DEBUG_VAR, "0")]);
        assert_eq!(config.gemini_api_key, None);
        assert!(!config.debug);
    }
}
