use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::schema::DEFAULT_COLLECTION;

/// Environment variable overriding the database path
pub const ENV_DATABASE: &str = "SHELTER_DATABASE";
/// Environment variable overriding the collection name
pub const ENV_COLLECTION: &str = "SHELTER_COLLECTION";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ShelterConfig {
    pub database: Option<String>,
    pub collection: Option<String>,
}

impl ShelterConfig {
    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(database) = present(ENV_DATABASE) {
            self.database = Some(database);
        }
        if let Some(collection) = present(ENV_COLLECTION) {
            self.collection = Some(collection);
        }
        self
    }

    /// Database path, resolved against `base` when relative or unset
    pub fn database_path(&self, base: &Path) -> PathBuf {
        match &self.database {
            Some(path) => base.join(path),
            None => default_database_path_in(base),
        }
    }

    pub fn collection(&self) -> &str {
        self.collection.as_deref().unwrap_or(DEFAULT_COLLECTION)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("shelterdash.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".shelterdash").join("shelter.db")
}

/// Settings from the config file (defaults when absent), then the environment
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ShelterConfig> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// `load_config` with an explicit variable lookup in place of the environment
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ShelterConfig> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    let from_file = match std::fs::read_to_string(&path) {
        Ok(contents) => toml::from_str::<ShelterConfig>(&contents)
            .with_context(|| format!("invalid config {}", path.display()))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No config at {}, using defaults", path.display());
            ShelterConfig::default()
        }
        Err(e) => return Err(e).with_context(|| format!("cannot read {}", path.display())),
    };

    Ok(from_file.with_overrides(lookup))
}

/// Write `config` as TOML. An existing file is kept unless `force` is set.
pub fn write_config(path: &Path, config: &ShelterConfig, force: bool) -> anyhow::Result<()> {
    if !force && path.exists() {
        anyhow::bail!("{} exists; pass --force to replace it", path.display());
    }

    ensure_db_dir(path)?;
    std::fs::write(path, toml::to_string_pretty(config)?)
        .with_context(|| format!("cannot write {}", path.display()))
}

/// Create the directory a database (or any file) will live in
pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    match db_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create {}", dir.display())),
        _ => Ok(()),
    }
}
