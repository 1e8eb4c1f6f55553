//! Persisted known state: one [`PersonResourceModel`] per resource address, stored as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::PersonResourceModel;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write state file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse state file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode state for {path:?}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unsupported state file version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub version: u32,
    #[serde(default)]
    pub resources: BTreeMap<String, PersonResourceModel>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
        }
    }
}

impl State {
    /// Load state from `path`. A missing file is an empty state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(state_path = ?path, "No state file yet, starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let state: State = serde_json::from_str(&content).map_err(|source| StateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if state.version != STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                found: state.version,
                expected: STATE_VERSION,
            });
        }
        info!(state_path = ?path, resources = state.resources.len(), "Loaded state");
        Ok(state)
    }

    /// Write state to `path` through a temporary file in the same directory, then rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();
        let write_err = |source: std::io::Error| StateError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| StateError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        info!(state_path = ?path, resources = self.resources.len(), "Saved state");
        Ok(())
    }

    pub fn get(&self, address: &str) -> Option<&PersonResourceModel> {
        self.resources.get(address)
    }

    pub fn insert(&mut self, address: impl Into<String>, model: PersonResourceModel) {
        self.resources.insert(address.into(), model);
    }

    pub fn remove(&mut self, address: &str) -> Option<PersonResourceModel> {
        self.resources.remove(address)
    }

    pub fn addresses(&self) -> Vec<String> {
        self.resources.keys().cloned().collect()
    }
}
