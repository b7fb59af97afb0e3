//! Combat log
//!
//! Append-only record of what happened during an encounter, shown to the
//! game master and kept after combat ends for review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Something a participant did
    Action,
    /// Hit point changes
    Damage,
    /// Conditions applied or removed
    Status,
    /// Encounter bookkeeping (start, rounds, roster changes)
    System,
}

impl std::fmt::Display for LogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogKind::Action => "action",
            LogKind::Damage => "damage",
            LogKind::Status => "status",
            LogKind::System => "system",
        };
        write!(f, "{}", s)
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub round: u32,
    #[serde(default)]
    pub participant_id: Option<String>,
    pub action: String,
    #[serde(rename = "type")]
    pub kind: LogKind,
}

/// Encounter log. Entries can be appended and read, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatLog {
    entries: Vec<CombatLogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current time
    pub fn append(
        &mut self,
        kind: LogKind,
        round: u32,
        participant_id: Option<&str>,
        action: impl Into<String>,
    ) -> &CombatLogEntry {
        self.entries.push(CombatLogEntry {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            round,
            participant_id: participant_id.map(str::to_string),
            action: action.into(),
            kind,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[CombatLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&CombatLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, oldest first
    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &CombatLogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}
