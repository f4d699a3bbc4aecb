//! Locating, reading and resolving the config file.

use std::path::{Path, PathBuf};
use std::{env, fs};

use dirs::home_dir;
use shellexpand::full;
use thiserror::Error;

use crate::config::types::{ConfigFile, LoggingConfig, ResolvedConfig};

const DEFAULT_PROFILE: &str = "default";

/// Placeholder replaced by the directory holding the config file.
const CONFIG_DIR_VAR: &str = "{{config_dir}}";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("profile '{0}' not found (known profiles: {1})")]
    ProfileNotFound(String, String),

    #[error("no profiles defined in config")]
    NoProfiles,

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("profile '{0}' has an empty log_file")]
    EmptyLogFile(String),

    #[error("search.ranker must be 'builtin' or a command line")]
    EmptyRanker,

    #[error("never_finish entry '{0}' names no tag or section")]
    BadNeverFinish(String),

    #[error("cannot expand '{0}': {1}")]
    Expand(String, String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the config at `config_path` (or the default location) and
    /// resolve the active profile.
    pub fn load(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let cf = read_config(&path)?;
        validate(&cf)?;

        let active = profile_override
            .map(ToOwned::to_owned)
            .or_else(|| cf.profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let profile = cf
            .profiles
            .get(&active)
            .ok_or_else(|| ConfigError::ProfileNotFound(active.clone(), known_profiles(&cf)))?;
        if profile.log_file.trim().is_empty() {
            return Err(ConfigError::EmptyLogFile(active));
        }

        let config_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let expand = |raw: &str| {
            expand_path(&raw.replace(CONFIG_DIR_VAR, &config_dir.to_string_lossy()))
        };

        let log_file = expand(&profile.log_file)?;
        let diagnostics =
            cf.logging.file.as_deref().map(|f| expand(&f.to_string_lossy())).transpose()?;
        let logging = LoggingConfig { file: diagnostics, ..cf.logging };

        tracing::debug!(profile = %active, log_file = %log_file.display(), "config loaded");

        Ok(ResolvedConfig {
            config_path: path,
            active_profile: active,
            log_file,
            search: cf.search,
            never_finish: cf.never_finish,
            logging,
        })
    }
}

fn read_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let shown = || path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::NotFound(shown()));
    }

    let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError(shown(), e))?;
    let cf: ConfigFile = toml::from_str(&raw).map_err(|e| ConfigError::ParseError(shown(), e))?;

    if cf.version != 1 {
        return Err(ConfigError::BadVersion(cf.version));
    }
    if cf.profiles.is_empty() {
        return Err(ConfigError::NoProfiles);
    }
    Ok(cf)
}

fn validate(cf: &ConfigFile) -> Result<(), ConfigError> {
    if cf.search.ranker.trim().is_empty() {
        return Err(ConfigError::EmptyRanker);
    }
    if let Some(item) = cf.never_finish.iter().find(|s| s.trim().trim_start_matches('@').is_empty())
    {
        return Err(ConfigError::BadNeverFinish(item.clone()));
    }
    Ok(())
}

fn known_profiles(cf: &ConfigFile) -> String {
    let mut names: Vec<&str> = cf.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    names.join(", ")
}

/// `$XDG_CONFIG_HOME/jotlog/config.toml`, else `~/.config/jotlog/config.toml`.
pub fn default_config_path() -> PathBuf {
    let base = env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().unwrap_or_else(|| PathBuf::from("~")).join(".config"));
    base.join("jotlog").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    let expanded =
        full(input).map_err(|e| ConfigError::Expand(input.to_string(), e.to_string()))?;
    Ok(PathBuf::from(expanded.into_owned()))
}
