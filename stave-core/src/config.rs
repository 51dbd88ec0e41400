use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    vcs: VcsConfig,
    #[serde(default)]
    storage: StorageConfig,
}

#[derive(Deserialize, Default)]
struct VcsConfig {
    author: Option<String>,
    initial_commit_message: Option<String>,
    quick_stash_message: Option<String>,
}

#[derive(Deserialize, Default)]
struct StorageConfig {
    wal: Option<bool>,
}

/// Settings handed to [`crate::vcs::VersionControl`] at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcsSettings {
    /// Recorded on every new revision. Empty means anonymous.
    pub author: String,
    /// Message of the root revision of a fresh history.
    pub initial_commit_message: String,
    pub quick_stash_message: String,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            author: String::new(),
            initial_commit_message: "Project created".to_string(),
            quick_stash_message: "Quick stash".to_string(),
        }
    }
}

/// Options for [`crate::persistence::save_pack`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageOptions {
    /// Put the database in WAL journal mode before writing.
    pub wal: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self { wal: true }
    }
}

pub struct Config {
    vcs: VcsConfig,
    storage: StorageConfig,
}

impl Config {
    pub fn load() -> Self {
        let mut base: ConfigFile = match toml::from_str(DEFAULT_CONFIG) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is malformed: {}", e);
                ConfigFile::default()
            }
        };

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => {
                            merge_vcs(&mut base.vcs, user.vcs);
                            merge_storage(&mut base.storage, user.storage);
                        }
                        Err(e) => {
                            log::warn!(
                                target: "config",
                                "ignoring malformed config {}: {}",
                                path.display(),
                                e
                            )
                        }
                    },
                    Err(e) => {
                        log::warn!(
                            target: "config",
                            "could not read config {}: {}",
                            path.display(),
                            e
                        )
                    }
                }
            }
        }

        Config {
            vcs: base.vcs,
            storage: base.storage,
        }
    }

    /// Parse a config from TOML text layered over the embedded defaults.
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut base: ConfigFile = toml::from_str(DEFAULT_CONFIG).unwrap_or_default();
        let user: ConfigFile = toml::from_str(contents)?;
        merge_vcs(&mut base.vcs, user.vcs);
        merge_storage(&mut base.storage, user.storage);
        Ok(Config {
            vcs: base.vcs,
            storage: base.storage,
        })
    }

    pub fn vcs_settings(&self) -> VcsSettings {
        let fallback = VcsSettings::default();
        VcsSettings {
            author: self.vcs.author.clone().unwrap_or(fallback.author),
            initial_commit_message: self
                .vcs
                .initial_commit_message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback.initial_commit_message),
            quick_stash_message: self
                .vcs
                .quick_stash_message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback.quick_stash_message),
        }
    }

    pub fn storage_options(&self) -> StorageOptions {
        let fallback = StorageOptions::default();
        StorageOptions {
            wal: self.storage.wal.unwrap_or(fallback.wal),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("stave").join("config.toml"))
}

fn merge_vcs(base: &mut VcsConfig, user: VcsConfig) {
    if user.author.is_some() {
        base.author = user.author;
    }
    if user.initial_commit_message.is_some() {
        base.initial_commit_message = user.initial_commit_message;
    }
    if user.quick_stash_message.is_some() {
        base.quick_stash_message = user.quick_stash_message;
    }
}

fn merge_storage(base: &mut StorageConfig, user: StorageConfig) {
    if user.wal.is_some() {
        base.wal = user.wal;
    }
}
