//! Layered settings. Later layers win:
//!
//! 1. `$XDG_CONFIG_HOME/git-seal/config.toml` (platform config dir)
//! 2. `<repo>/.git-seal.toml`
//! 3. `GIT_SEAL_*` environment variables (`GIT_SEAL_KEY_FILE`, `GIT_SEAL_LOG_LEVEL`, ...)
//!
//! ```toml
//! key_file = "/secure/team.key"
//! log_level = "debug"
//! default_format = "yaml"
//! ```
//!
//! The repository file is committed with the project, so it may only set
//! `log_level` and `default_format`. `key` and `key_file` written there are
//! ignored: the key is chosen by the user, never by repository content.

use crate::error::Result;
use crate::format::Format;
use config::{Config, Environment, File, FileFormat, Source};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".git-seal.toml";
pub const ENV_PREFIX: &str = "GIT_SEAL";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Base64 repository key, normally only set through `GIT_SEAL_KEY`
    pub key: Option<String>,
    pub key_file: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Used when neither a flag nor the path suffix names a format
    pub default_format: Option<Format>,
}

/// The subset of [`Settings`] a repository may carry.
#[derive(Debug, Default, Deserialize)]
struct RepoSettings {
    log_level: Option<String>,
    default_format: Option<Format>,
}

impl From<RepoSettings> for Settings {
    fn from(repo: RepoSettings) -> Self {
        Settings {
            log_level: repo.log_level,
            default_format: repo.default_format,
            ..Settings::default()
        }
    }
}

impl Settings {
    /// Load settings for the repository rooted at `repo_root`, if any
    pub fn load(repo_root: Option<&Path>) -> Result<Self> {
        Self::load_layers(global_config_path(), repo_root)
    }

    fn load_layers(global: Option<PathBuf>, repo_root: Option<&Path>) -> Result<Self> {
        let mut settings = match global {
            Some(global) => read_layer(toml_file(global))?,
            None => Settings::default(),
        };
        if let Some(root) = repo_root {
            let repo: RepoSettings = read_layer(toml_file(root.join(CONFIG_FILE)))?;
            settings = settings.overlay(repo.into());
        }
        let env: Settings = read_layer(Environment::with_prefix(ENV_PREFIX))?;

        Ok(settings.overlay(env))
    }

    /// Fields set in `upper` replace the ones in `self`
    fn overlay(self, upper: Settings) -> Settings {
        Settings {
            key: upper.key.or(self.key),
            key_file: upper.key_file.or(self.key_file),
            log_level: upper.log_level.or(self.log_level),
            default_format: upper.default_format.or(self.default_format),
        }
    }
}

fn toml_file(path: PathBuf) -> impl Source + Send + Sync + 'static {
    File::from(path).format(FileFormat::Toml).required(false)
}

fn read_layer<T, S>(source: S) -> Result<T>
where
    T: DeserializeOwned,
    S: Source + Send + Sync + 'static,
{
    Ok(Config::builder().add_source(source).build()?.try_deserialize()?)
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-seal").join("config.toml"))
}
