//! Save files
//!
//! Encounters and recent dice rolls are saved as a versioned JSON document.
//! [`SaveFile`] handles the format; [`SaveStore`] reads and writes it at a
//! path, refusing documents larger than the configured quota.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::combat::{CombatEncounter, DiceRollResult};

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

/// Persistence errors
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported save version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("save is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("encounter {encounter} lists participant {participant} more than once")]
    DuplicateParticipant {
        encounter: String,
        participant: String,
    },
}

/// A complete save document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub encounters: Vec<CombatEncounter>,
    #[serde(default)]
    pub dice_history: Vec<DiceRollResult>,
}

/// Only the version, so unsupported documents are rejected before the rest
/// of the body is interpreted
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl SaveFile {
    /// Create a save stamped with the current time
    pub fn new(encounters: Vec<CombatEncounter>, dice_history: Vec<DiceRollResult>) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            encounters,
            dice_history,
        }
    }

    /// Serialize to pretty JSON, enforcing a size limit if given
    pub fn to_json(&self, limit: Option<usize>) -> Result<String, PersistError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(limit) = limit {
            if json.len() > limit {
                return Err(PersistError::TooLarge {
                    size: json.len(),
                    limit,
                });
            }
        }
        Ok(json)
    }

    /// Parse a save document, checking its version and repairing derived
    /// fields on every encounter
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        if probe.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: probe.version,
            });
        }

        let mut save: SaveFile = serde_json::from_str(json)?;
        for encounter in &mut save.encounters {
            check_unique_ids(encounter)?;
            encounter.normalize();
        }
        Ok(save)
    }
}

fn check_unique_ids(encounter: &CombatEncounter) -> Result<(), PersistError> {
    let mut seen = HashSet::new();
    for participant in encounter.participants() {
        if !seen.insert(participant.id.as_str()) {
            return Err(PersistError::DuplicateParticipant {
                encounter: encounter.id().to_string(),
                participant: participant.id.clone(),
            });
        }
    }
    Ok(())
}

/// Reads and writes one save file on disk
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
    max_bytes: usize,
}

impl SaveStore {
    /// Create a store for `path` with a size quota in bytes
    pub fn new(path: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            path: path.into(),
            max_bytes,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the save is written to before being renamed into place
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the save. The previous file is replaced only once the new one
    /// is fully on disk.
    pub async fn save(&self, save: &SaveFile) -> Result<(), PersistError> {
        let json = save.to_json(Some(self.max_bytes))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        info!(
            "saved {} encounters to {} ({} bytes)",
            save.encounters.len(),
            self.path.display(),
            json.len()
        );
        Ok(())
    }

    /// Load the save, or `None` if there is no file yet
    pub async fn load(&self) -> Result<Option<SaveFile>, PersistError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if json.len() > self.max_bytes {
            return Err(PersistError::TooLarge {
                size: json.len(),
                limit: self.max_bytes,
            });
        }

        let save = SaveFile::from_json(&json)?;
        debug!(
            "loaded {} encounters from {}",
            save.encounters.len(),
            self.path.display()
        );
        Ok(Some(save))
    }
}
