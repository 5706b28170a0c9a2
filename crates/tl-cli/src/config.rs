//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::{FailurePolicy, KeyScope};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timesheet log analyzed when no log file is given.
    pub log_path: PathBuf,

    /// Label written at the start of every summary line.
    pub team: String,

    /// Top-level projects always listed, even without tracked time.
    pub projects: Vec<String>,

    /// How much of an entry's project path forms its key.
    pub key_scope: KeyScope,

    /// What to do with lines that cannot be parsed.
    pub on_malformed: FailurePolicy,

    /// Directory `report --save` writes into.
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("timesheet.log"),
            team: "team".to_string(),
            projects: Vec::new(),
            key_scope: KeyScope::default(),
            on_malformed: FailurePolicy::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TL_*)
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for tl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

/// Returns the platform-specific data directory for tl.
///
/// On Linux: `~/.local/share/tl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_tl() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_log() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("timesheet.log"));
        assert_eq!(config.key_scope, KeyScope::Remainder);
        assert_eq!(config.on_malformed, FailurePolicy::Collect);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
team = "platform"
log_path = "/srv/time/timesheet.log"
projects = ["Infra", "Support"]
key_scope = "top-level"
on_malformed = "abort"
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.team, "platform");
        assert_eq!(config.log_path, PathBuf::from("/srv/time/timesheet.log"));
        assert_eq!(config.projects, ["Infra", "Support"]);
        assert_eq!(config.key_scope, KeyScope::TopLevel);
        assert_eq!(config.on_malformed, FailurePolicy::Abort);
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_from_rejects_unknown_policy() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "on_malformed = \"ignore\"\n").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }
}
