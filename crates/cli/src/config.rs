//! CLI configuration
//!
//! Defaults, then an optional config file, then `PORTAL_*` environment
//! variables; later sources win.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "PORTAL";
const DEFAULT_API_URL: &str = "http://localhost:8000";
/// No request timeout unless one is configured
const DEFAULT_TIMEOUT_SECS: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the portal API
    pub api_url: String,
    /// Request timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
    /// Where the session token is kept
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token_path: None,
        }
    }
}

impl CliConfig {
    /// Load configuration, reading `file` if given or the default config file if it exists
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(|| {
            project_dirs()
                .map(|dirs| dirs.config_dir().join("config.toml"))
                .filter(|path| path.exists())
        });

        Self::from_sources(file.as_deref(), config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_sources(file: Option<&Path>, env: config::Environment) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_url", defaults.api_url)?
            .set_default("timeout_secs", defaults.timeout_secs)?;

        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }

    /// Token file location, falling back to the platform data directory
    pub fn resolved_token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(|| {
            project_dirs()
                .map_or_else(|| PathBuf::from(".portal"), |dirs| dirs.data_dir().to_path_buf())
                .join("token")
        })
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "portal", "portal")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(vars))
    }

    #[test]
    fn defaults_apply_without_sources() {
        let config = CliConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn requests_have_no_timeout_by_default() {
        let config = CliConfig::from_sources(None, env(&[])).unwrap();
        assert_eq!(config.timeout_secs, 0);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://portal.example.com\"\ntoken_path = \"/tmp/portal-token\"\n",
        )
        .unwrap();

        let config = CliConfig::from_sources(Some(&path), env(&[])).unwrap();
        assert_eq!(config.api_url, "https://portal.example.com");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.resolved_token_path(), PathBuf::from("/tmp/portal-token"));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://file.example.com\"\n").unwrap();

        let config = CliConfig::from_sources(
            Some(&path),
            env(&[
                ("PORTAL_API_URL", "https://env.example.com"),
                ("PORTAL_TIMEOUT_SECS", "5"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CliConfig::from_sources(Some(&dir.path().join("absent.toml")), env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn token_path_defaults_to_a_token_file() {
        let path = CliConfig::default().resolved_token_path();
        assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("token"));
    }
}
