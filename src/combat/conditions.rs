//! Status conditions
//!
//! Timed and persistent effects attached to a combat participant:
//! - Timed conditions count down once per round and drop off at 0
//! - Persistent conditions stay until explicitly removed
//! - Conditions stack; the same name may appear more than once

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single status effect instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCondition {
    pub id: String,
    pub name: String,
    /// Rounds remaining. Ignored for persistent conditions.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub is_persistent: bool,
    /// Free-form effect tags shown on the screen (e.g. "-2 to attacks")
    #[serde(default)]
    pub effects: BTreeSet<String>,
}

impl StatusCondition {
    /// A condition that expires after `rounds` round transitions
    pub fn timed(name: impl Into<String>, rounds: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            duration: Some(rounds),
            is_persistent: false,
            effects: BTreeSet::new(),
        }
    }

    /// A condition that lasts until removed
    pub fn persistent(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            duration: None,
            is_persistent: true,
            effects: BTreeSet::new(),
        }
    }

    /// Replace the generated id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add an effect tag
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effects.insert(effect.into());
        self
    }

    /// Whether this condition counts down
    pub fn is_timed(&self) -> bool {
        !self.is_persistent && self.duration.is_some()
    }

    /// Count down one round, returning true if the condition has expired
    fn tick(&mut self) -> bool {
        if !self.is_timed() {
            return false;
        }
        let remaining = self.duration.unwrap_or(0).saturating_sub(1);
        self.duration = Some(remaining);
        remaining == 0
    }
}

/// Ordered list of conditions on one participant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionTracker {
    conditions: Vec<StatusCondition>,
}

impl ConditionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition; duplicates by name are allowed
    pub fn add(&mut self, condition: StatusCondition) {
        self.conditions.push(condition);
    }

    /// Remove a condition by id, returning it if it was present
    pub fn remove(&mut self, condition_id: &str) -> Option<StatusCondition> {
        let pos = self.conditions.iter().position(|c| c.id == condition_id)?;
        Some(self.conditions.remove(pos))
    }

    /// Get a condition by id
    pub fn get(&self, condition_id: &str) -> Option<&StatusCondition> {
        self.conditions.iter().find(|c| c.id == condition_id)
    }

    /// Check for a condition by name (case-insensitive)
    pub fn has(&self, name: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Advance one round.
    ///
    /// Timed conditions lose one round and are dropped when they reach 0.
    /// Persistent and untimed conditions are untouched. Returns the
    /// conditions that expired, in their original order.
    pub fn tick(&mut self) -> Vec<StatusCondition> {
        let mut expired = Vec::new();
        let mut kept = Vec::with_capacity(self.conditions.len());

        for mut condition in self.conditions.drain(..) {
            if condition.tick() {
                debug!("condition {} ({}) expired", condition.name, condition.id);
                expired.push(condition);
            } else {
                kept.push(condition);
            }
        }

        self.conditions = kept;
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusCondition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Clear all conditions
    pub fn clear(&mut self) {
        self.conditions.clear();
    }
}

impl FromIterator<StatusCondition> for ConditionTracker {
    fn from_iter<I: IntoIterator<Item = StatusCondition>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().collect(),
        }
    }
}
