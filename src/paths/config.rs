//! Persisted asset root record.
//!
//! The record lives at `$LIBERO_CONFIG_PATH/config.yaml`, or
//! `~/.libero/config.yaml` when the variable is unset. Absence means defaults.
use crate::error::PathError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_ENV: &str = "LIBERO_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// On-disk record; unknown keys written by other tools are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bddl_files: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_states: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasets: Option<PathBuf>,
}

/// Locate the config record from the environment or home directory.
pub fn default_config_path() -> Result<PathBuf, PathError> {
    let dir = match std::env::var_os(CONFIG_DIR_ENV).filter(|value| !value.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .ok_or(PathError::NoConfigDir)?
            .join(".libero"),
    };
    Ok(dir.join(CONFIG_FILE_NAME))
}

pub(super) fn load_record(path: &Path) -> Result<Option<ConfigRecord>, PathError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|source| PathError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let record = serde_yaml::from_str(&text).map_err(|err| PathError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(Some(record))
}

/// Write the record through a temp file in the same directory, then rename.
pub(super) fn write_record(path: &Path, record: &ConfigRecord) -> Result<(), PathError> {
    let text = serde_yaml::to_string(record).map_err(|err| PathError::Config {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|source| PathError::Io {
        action: "create",
        path: dir.to_path_buf(),
        source,
    })?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|source| PathError::Io {
        action: "create temp file in",
        path: dir.to_path_buf(),
        source,
    })?;
    tmp.write_all(text.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|source| PathError::Io {
            action: "write",
            path: tmp.path().to_path_buf(),
            source,
        })?;
    tmp.persist(path).map_err(|err| PathError::Io {
        action: "persist",
        path: path.to_path_buf(),
        source: err.error,
    })?;
    Ok(())
}

/// Remove the record; returns whether one existed.
pub(super) fn remove_record(path: &Path) -> Result<bool, PathError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(PathError::Io {
            action: "remove",
            path: path.to_path_buf(),
            source,
        }),
    }
}
