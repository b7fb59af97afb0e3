//! Encounter manager
//!
//! Holds every open encounter by id and exposes the operation set the UI
//! layer calls. Each call locks the manager for its duration, runs to
//! completion, and returns a snapshot of the updated encounter.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info};

use super::conditions::StatusCondition;
use super::dice::{roll, DiceError, DiceRollResult, DieSource, RandomDice};
use super::encounter::{CombatEncounter, EncounterError};
use super::participant::{CombatParticipant, ParticipantUpdate};
use crate::persist::SaveFile;
use crate::Config;

/// Manager errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("encounter not found: {0}")]
    EncounterNotFound(String),

    #[error(transparent)]
    Encounter(#[from] EncounterError),

    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// Open encounters plus the shared dice and roll history
pub struct EncounterManager {
    encounters: RwLock<BTreeMap<String, CombatEncounter>>,
    dice: Mutex<Box<dyn DieSource + Send>>,
    history: Mutex<VecDeque<DiceRollResult>>,
    history_limit: usize,
}

impl std::fmt::Debug for EncounterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncounterManager")
            .field("encounters", &self.encounters.read().len())
            .field("history", &self.history.lock().len())
            .field("history_limit", &self.history_limit)
            .finish_non_exhaustive()
    }
}

impl EncounterManager {
    /// Create a manager with OS-seeded dice
    pub fn new(history_limit: usize) -> Self {
        Self::with_dice(RandomDice::from_entropy(), history_limit)
    }

    /// Create a manager rolling with the given dice
    pub fn with_dice(dice: impl DieSource + Send + 'static, history_limit: usize) -> Self {
        Self {
            encounters: RwLock::new(BTreeMap::new()),
            dice: Mutex::new(Box::new(dice)),
            history: Mutex::new(VecDeque::with_capacity(history_limit)),
            history_limit,
        }
    }

    /// Create a manager using the configured history limit
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.dice_history_limit)
    }

    /// Replace the dice used for all further rolls
    pub fn set_dice(&self, dice: impl DieSource + Send + 'static) {
        *self.dice.lock() = Box::new(dice);
    }

    /// Roll a free-standing expression and remember it in the history
    pub fn roll_dice(&self, expression: &str) -> Result<DiceRollResult, ManagerError> {
        let result = {
            let mut dice = self.dice.lock();
            roll(expression, &mut **dice)?
        };
        self.remember(result.clone());
        Ok(result)
    }

    fn remember(&self, result: DiceRollResult) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(result);
    }

    /// Recent rolls, oldest first
    pub fn dice_history(&self) -> Vec<DiceRollResult> {
        self.history.lock().iter().cloned().collect()
    }

    /// Open a new empty encounter
    pub fn create_encounter(&self, name: &str) -> CombatEncounter {
        let encounter = CombatEncounter::new(name);
        info!("created encounter {} ({})", encounter.name, encounter.id());
        self.encounters
            .write()
            .insert(encounter.id().to_string(), encounter.clone());
        encounter
    }

    /// Snapshot of an encounter by id
    pub fn get(&self, encounter_id: &str) -> Option<CombatEncounter> {
        self.encounters.read().get(encounter_id).cloned()
    }

    /// Find an encounter by id, or by name ignoring case
    pub fn find(&self, key: &str) -> Option<CombatEncounter> {
        let encounters = self.encounters.read();
        encounters.get(key).cloned().or_else(|| {
            encounters
                .values()
                .find(|e| e.name.eq_ignore_ascii_case(key))
                .cloned()
        })
    }

    /// Snapshots of all encounters, ordered by id
    pub fn list(&self) -> Vec<CombatEncounter> {
        self.encounters.read().values().cloned().collect()
    }

    /// Drop an encounter
    pub fn discard(&self, encounter_id: &str) -> Option<CombatEncounter> {
        self.encounters.write().remove(encounter_id)
    }

    fn update<F>(&self, encounter_id: &str, f: F) -> Result<CombatEncounter, ManagerError>
    where
        F: FnOnce(&mut CombatEncounter) -> Result<(), EncounterError>,
    {
        let mut encounters = self.encounters.write();
        let encounter = encounters
            .get_mut(encounter_id)
            .ok_or_else(|| ManagerError::EncounterNotFound(encounter_id.to_string()))?;
        f(encounter)?;
        Ok(encounter.clone())
    }

    pub fn add_participant(
        &self,
        encounter_id: &str,
        participant: CombatParticipant,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.add_participant(participant))
    }

    pub fn remove_participant(
        &self,
        encounter_id: &str,
        participant_id: &str,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.remove_participant(participant_id);
            Ok(())
        })
    }

    pub fn update_participant(
        &self,
        encounter_id: &str,
        participant_id: &str,
        update: ParticipantUpdate,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.update_participant(participant_id, update))
    }

    pub fn start_combat(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            let mut dice = self.dice.lock();
            e.start_combat(&mut **dice);
            Ok(())
        })
    }

    pub fn end_combat(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.end_combat();
            Ok(())
        })
    }

    pub fn pause_combat(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.pause_combat();
            Ok(())
        })
    }

    pub fn resume_combat(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.resume_combat();
            Ok(())
        })
    }

    pub fn next_turn(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.next_turn();
            Ok(())
        })
    }

    pub fn previous_turn(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.previous_turn();
            Ok(())
        })
    }

    pub fn sort_by_initiative(&self, encounter_id: &str) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.sort_by_initiative();
            Ok(())
        })
    }

    pub fn add_condition(
        &self,
        encounter_id: &str,
        participant_id: &str,
        condition: StatusCondition,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.add_condition(participant_id, condition))
    }

    pub fn remove_condition(
        &self,
        encounter_id: &str,
        participant_id: &str,
        condition_id: &str,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| {
            e.remove_condition(participant_id, condition_id);
            Ok(())
        })
    }

    pub fn apply_damage(
        &self,
        encounter_id: &str,
        participant_id: &str,
        amount: i32,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.apply_damage(participant_id, amount).map(drop))
    }

    pub fn heal(
        &self,
        encounter_id: &str,
        participant_id: &str,
        amount: i32,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.heal(participant_id, amount).map(drop))
    }

    pub fn log_action(
        &self,
        encounter_id: &str,
        participant_id: &str,
        action: &str,
    ) -> Result<CombatEncounter, ManagerError> {
        self.update(encounter_id, |e| e.log_action(participant_id, action))
    }

    /// Capture every encounter and the roll history for saving
    pub fn to_save_file(&self) -> SaveFile {
        SaveFile::new(self.list(), self.dice_history())
    }

    /// Replace all state with the contents of a save file
    pub fn restore(&self, save: SaveFile) {
        let mut encounters = self.encounters.write();
        encounters.clear();
        for mut encounter in save.encounters {
            encounter.normalize();
            encounters.insert(encounter.id().to_string(), encounter);
        }

        let mut history = self.history.lock();
        history.clear();
        let skip = save.dice_history.len().saturating_sub(self.history_limit);
        history.extend(save.dice_history.into_iter().skip(skip));
        debug!(
            "restored {} encounters and {} rolls",
            encounters.len(),
            history.len()
        );
    }
}
