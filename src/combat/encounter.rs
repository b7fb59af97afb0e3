//! Combat encounter aggregate
//!
//! Owns the participant roster and the combat log. Turn order and round
//! progression live in [`super::scheduler`]; this module handles the
//! roster, hit points and conditions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::conditions::StatusCondition;
use super::log::{CombatLog, LogKind};
use super::participant::{CombatParticipant, ParticipantUpdate};

/// Encounter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncounterError {
    #[error("participant id already in encounter: {0}")]
    DuplicateParticipant(String),

    #[error("participant not found: {0}")]
    ParticipantNotFound(String),
}

/// A single fight: who is in it, whose turn it is, and what happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEncounter {
    pub(super) id: String,
    pub name: String,
    pub(super) participants: Vec<CombatParticipant>,
    pub(super) current_turn: usize,
    pub(super) round: u32,
    pub(super) is_active: bool,
    pub(super) is_paused: bool,
    pub(super) combat_log: CombatLog,
}

impl CombatEncounter {
    /// Create an empty, inactive encounter
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name)
    }

    /// Create an empty encounter with a caller-chosen id
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            participants: Vec::new(),
            current_turn: 0,
            round: 1,
            is_active: false,
            is_paused: false,
            combat_log: CombatLog::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn participants(&self) -> &[CombatParticipant] {
        &self.participants
    }

    /// Index of the acting participant. Meaningless while inactive.
    pub fn current_turn(&self) -> usize {
        self.current_turn
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn log(&self) -> &CombatLog {
        &self.combat_log
    }

    /// Look up a participant by id
    pub fn participant(&self, participant_id: &str) -> Option<&CombatParticipant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    /// The participant whose turn it is, if combat is running
    pub fn current_participant(&self) -> Option<&CombatParticipant> {
        if !self.is_active {
            return None;
        }
        self.participants.get(self.current_turn)
    }

    fn position(&self, participant_id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == participant_id)
    }

    fn participant_mut(
        &mut self,
        participant_id: &str,
    ) -> Result<&mut CombatParticipant, EncounterError> {
        self.participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| EncounterError::ParticipantNotFound(participant_id.to_string()))
    }

    /// Append a log entry for the current round
    pub(super) fn record(
        &mut self,
        kind: LogKind,
        participant_id: Option<&str>,
        action: impl Into<String>,
    ) {
        self.combat_log
            .append(kind, self.round, participant_id, action);
    }

    /// Add a participant to the end of the roster
    pub fn add_participant(
        &mut self,
        mut participant: CombatParticipant,
    ) -> Result<(), EncounterError> {
        if self.position(&participant.id).is_some() {
            warn!(
                "encounter {}: rejected duplicate participant {}",
                self.id, participant.id
            );
            return Err(EncounterError::DuplicateParticipant(participant.id));
        }

        participant.refresh_wounds();
        let message = format!("{} joined the encounter", participant.name);
        let id = participant.id.clone();
        self.participants.push(participant);
        self.record(LogKind::System, Some(&id), message);
        Ok(())
    }

    /// Remove a participant. Missing ids are ignored.
    ///
    /// The turn pointer keeps pointing at the same logical participant when
    /// someone earlier in the order leaves. If the acting participant leaves,
    /// the pointer stays on the slot, which now holds the next participant
    /// (clamped to the end of the roster).
    pub fn remove_participant(&mut self, participant_id: &str) -> Option<CombatParticipant> {
        let index = self.position(participant_id)?;
        let removed = self.participants.remove(index);

        if self.participants.is_empty() {
            self.current_turn = 0;
        } else {
            if index < self.current_turn {
                self.current_turn -= 1;
            }
            self.current_turn = self.current_turn.min(self.participants.len() - 1);
        }

        self.record(
            LogKind::System,
            Some(participant_id),
            format!("{} left the encounter", removed.name),
        );
        Some(removed)
    }

    /// Merge changed fields into a participant
    pub fn update_participant(
        &mut self,
        participant_id: &str,
        update: ParticipantUpdate,
    ) -> Result<(), EncounterError> {
        let participant = self.participant_mut(participant_id)?;
        participant.apply(update);
        debug!("participant {} updated", participant_id);
        Ok(())
    }

    /// Attach a condition to a participant
    pub fn add_condition(
        &mut self,
        participant_id: &str,
        condition: StatusCondition,
    ) -> Result<(), EncounterError> {
        let participant = self.participant_mut(participant_id)?;
        let message = match (condition.is_persistent, condition.duration) {
            (false, Some(rounds)) => format!(
                "{} is {} ({} rounds)",
                participant.name, condition.name, rounds
            ),
            _ => format!("{} is {}", participant.name, condition.name),
        };
        participant.conditions.add(condition);
        self.record(LogKind::Status, Some(participant_id), message);
        Ok(())
    }

    /// Remove a condition from a participant. Missing ids are ignored.
    pub fn remove_condition(
        &mut self,
        participant_id: &str,
        condition_id: &str,
    ) -> Option<StatusCondition> {
        let index = self.position(participant_id)?;
        let participant = &mut self.participants[index];
        let removed = participant.conditions.remove(condition_id)?;
        let message = format!("{} is no longer {}", participant.name, removed.name);
        self.record(LogKind::Status, Some(participant_id), message);
        Some(removed)
    }

    /// Deal damage. Hit points may drop below 0.
    pub fn apply_damage(&mut self, participant_id: &str, amount: i32) -> Result<i32, EncounterError> {
        let participant = self.participant_mut(participant_id)?;
        let hit_points = participant.take_damage(amount);
        let mut message = format!(
            "{} takes {} damage ({} HP)",
            participant.name, amount, hit_points
        );
        if participant.seriously_wounded() {
            message.push_str(", seriously wounded");
        }
        self.record(LogKind::Damage, Some(participant_id), message);
        Ok(hit_points)
    }

    /// Restore hit points up to the maximum, returning the amount healed
    pub fn heal(&mut self, participant_id: &str, amount: i32) -> Result<i32, EncounterError> {
        let participant = self.participant_mut(participant_id)?;
        let healed = participant.heal(amount);
        let message = format!(
            "{} heals {} ({} HP)",
            participant.name,
            healed,
            participant.hit_points()
        );
        self.record(LogKind::Damage, Some(participant_id), message);
        Ok(healed)
    }

    /// Record something a participant did
    pub fn log_action(
        &mut self,
        participant_id: &str,
        action: impl Into<String>,
    ) -> Result<(), EncounterError> {
        self.participant_mut(participant_id)?;
        self.record(LogKind::Action, Some(participant_id), action);
        Ok(())
    }

    /// Record a free-form note not tied to a participant
    pub fn log_note(&mut self, note: impl Into<String>) {
        self.record(LogKind::System, None, note);
    }

    /// Restore invariants on an encounter read from outside (e.g. a save file)
    pub(crate) fn normalize(&mut self) {
        self.round = self.round.max(1);
        if self.participants.is_empty() {
            self.current_turn = 0;
        } else {
            self.current_turn = self.current_turn.min(self.participants.len() - 1);
        }
        for participant in &mut self.participants {
            participant.refresh_wounds();
        }
    }
}
