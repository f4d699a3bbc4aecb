use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::query::{CaseMode, DEFAULT_FUZZY_DISTANCE, SearchMatching};

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub search: SearchConfig,
    /// Tags (`@meeting`) and sections (`Ideas`) whose entries are never finished.
    #[serde(default)]
    pub never_finish: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    /// JSON file holding the log entries.
    pub log_file: String,
}

/// Free-text search settings.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default)]
    pub matching: SearchMatching,
    /// Maximum gap between fuzzy query characters.
    #[serde(default = "default_distance")]
    pub distance: usize,
    #[serde(default)]
    pub case: CaseMode,
    /// `builtin`, or a command line that filters stdin by the query, e.g. `fzf --filter`.
    #[serde(default = "default_ranker")]
    pub ranker: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            matching: SearchMatching::default(),
            distance: default_distance(),
            case: CaseMode::default(),
            ranker: default_ranker(),
        }
    }
}

fn default_distance() -> usize {
    DEFAULT_FUZZY_DISTANCE
}

fn default_ranker() -> String {
    "builtin".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config_path: PathBuf,
    pub active_profile: String,
    pub log_file: PathBuf,
    pub search: SearchConfig,
    pub never_finish: Vec<String>,
    pub logging: LoggingConfig,
}
