//! TestTable - a game table with one encounter and predictable dice

#![allow(dead_code)]

use gmscreen::combat::{CombatEncounter, CombatParticipant, EncounterManager, ScriptedDice};

/// Dice history kept by test managers
pub const HISTORY_LIMIT: usize = 20;

/// Manager plus the id of the encounter under test
pub struct TestTable {
    pub manager: EncounterManager,
    pub encounter_id: String,
}

impl TestTable {
    /// Open an encounter whose dice replay `script`
    pub fn new(name: &str, script: &[u32]) -> Self {
        let manager =
            EncounterManager::with_dice(ScriptedDice::new(script.to_vec()), HISTORY_LIMIT);
        let encounter_id = manager.create_encounter(name).id().to_string();
        Self {
            manager,
            encounter_id,
        }
    }

    /// Add a player character with the given reflexes
    pub fn pc(self, id: &str, reflexes: i32) -> Self {
        self.add(CombatParticipant::new(id, id.to_uppercase(), 40).with_reflexes(reflexes))
    }

    /// Add an NPC with the given reflexes
    pub fn npc(self, id: &str, reflexes: i32) -> Self {
        self.add(CombatParticipant::npc(id, id.to_uppercase(), 30).with_reflexes(reflexes))
    }

    /// Add any participant
    pub fn add(self, participant: CombatParticipant) -> Self {
        self.manager
            .add_participant(&self.encounter_id, participant)
            .expect("Failed to add participant");
        self
    }

    /// Current state of the encounter
    pub fn encounter(&self) -> CombatEncounter {
        self.manager
            .get(&self.encounter_id)
            .expect("Encounter missing")
    }

    pub fn start(&self) -> CombatEncounter {
        self.manager
            .start_combat(&self.encounter_id)
            .expect("Failed to start combat")
    }

    pub fn next(&self) -> CombatEncounter {
        self.manager
            .next_turn(&self.encounter_id)
            .expect("Failed to advance turn")
    }

    pub fn prev(&self) -> CombatEncounter {
        self.manager
            .previous_turn(&self.encounter_id)
            .expect("Failed to step back")
    }

    /// Participant ids in turn order
    pub fn order(&self) -> Vec<String> {
        self.encounter()
            .participants()
            .iter()
            .map(|p| p.id.clone())
            .collect()
    }

    /// Id of the acting participant
    pub fn acting(&self) -> Option<String> {
        self.encounter().current_participant().map(|p| p.id.clone())
    }
}
