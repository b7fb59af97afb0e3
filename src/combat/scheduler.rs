//! Turn scheduling
//!
//! Initiative, turn order and round progression for an encounter.
//!
//! Initiative is reflexes (default 5) plus an exploding check die. Ties
//! keep whatever order the participants were already in; there is no
//! secondary tie-break.
//!
//! [`CombatEncounter::previous_turn`] is a game-master undo for a misclick.
//! It moves the pointer (and round) back but does not give conditions their
//! rounds back or clear `has_acted`, so next/previous are not inverses.

use tracing::{debug, info};

use super::dice::{initiative_roll, DieSource};
use super::encounter::CombatEncounter;
use super::log::LogKind;
use super::participant::CombatParticipant;

/// Roll initiative for every participant without reordering them
pub fn roll_initiative<D: DieSource + ?Sized>(participants: &mut [CombatParticipant], dice: &mut D) {
    for participant in participants.iter_mut() {
        let check = initiative_roll(participant.reflexes_or_default(), dice);
        participant.initiative_roll = Some(check.roll.total);
        participant.initiative = check.total;
        debug!(
            "{} rolls initiative {} ({})",
            participant.name, participant.initiative, check.roll
        );
    }
}

/// Order participants by initiative, highest first. Stable for ties.
pub fn sort_by_initiative(participants: &mut [CombatParticipant]) {
    participants.sort_by(|a, b| b.initiative.cmp(&a.initiative));
}

impl CombatEncounter {
    /// Roll initiative, sort, and begin round 1.
    ///
    /// Does nothing when there is nobody to fight. Calling it on a running
    /// encounter restarts combat with fresh rolls.
    pub fn start_combat<D: DieSource + ?Sized>(&mut self, dice: &mut D) {
        if self.participants.is_empty() {
            debug!("encounter {}: no participants, not starting", self.id);
            return;
        }

        roll_initiative(&mut self.participants, dice);
        sort_by_initiative(&mut self.participants);
        for participant in &mut self.participants {
            participant.has_acted = false;
        }

        self.is_active = true;
        self.is_paused = false;
        self.current_turn = 0;
        self.round = 1;
        self.record(LogKind::System, None, "Combat started");
        info!(
            "encounter {} started with {} participants",
            self.id,
            self.participants.len()
        );
    }

    /// Re-sort by current initiative values.
    ///
    /// While combat is running the pointer follows the acting participant.
    pub fn sort_by_initiative(&mut self) {
        let acting = self.current_participant().map(|p| p.id.clone());
        sort_by_initiative(&mut self.participants);
        if let Some(acting) = acting {
            if let Some(index) = self.participants.iter().position(|p| p.id == acting) {
                self.current_turn = index;
            }
        }
    }

    /// Override a participant's initiative (e.g. a roll made at the table).
    /// The order is not changed until [`Self::sort_by_initiative`] is called.
    pub fn set_initiative(&mut self, participant_id: &str, initiative: i32) -> bool {
        match self.participants.iter_mut().find(|p| p.id == participant_id) {
            Some(participant) => {
                participant.initiative = initiative;
                participant.initiative_roll = None;
                true
            }
            None => false,
        }
    }

    /// Whether turn controls should respond
    fn turns_running(&self) -> bool {
        self.is_active && !self.is_paused && !self.participants.is_empty()
    }

    /// End the current participant's turn.
    ///
    /// After the last participant the pointer wraps to the top, the round
    /// advances, everyone's `has_acted` resets, and every participant's
    /// conditions tick once.
    pub fn next_turn(&mut self) {
        if !self.turns_running() {
            return;
        }

        if let Some(current) = self.participants.get_mut(self.current_turn) {
            current.has_acted = true;
        }

        self.current_turn += 1;
        if self.current_turn < self.participants.len() {
            debug!("encounter {}: turn {}", self.id, self.current_turn);
            return;
        }

        self.current_turn = 0;
        self.round += 1;
        for participant in &mut self.participants {
            participant.has_acted = false;
            let expired = participant.conditions.tick();
            for condition in expired {
                debug!("{} is no longer {}", participant.name, condition.name);
            }
        }
        let message = format!("Round {} started", self.round);
        self.record(LogKind::System, None, message);
        debug!("encounter {}: round {}", self.id, self.round);
    }

    /// Step the pointer back one turn, wrapping into the previous round.
    ///
    /// Round never drops below 1. Condition durations and `has_acted` are
    /// left as they are.
    pub fn previous_turn(&mut self) {
        if !self.turns_running() {
            return;
        }

        if self.current_turn == 0 {
            self.current_turn = self.participants.len() - 1;
            self.round = self.round.saturating_sub(1).max(1);
        } else {
            self.current_turn -= 1;
        }
        debug!(
            "encounter {}: back to turn {} of round {}",
            self.id, self.current_turn, self.round
        );
    }

    /// Stop combat, keeping the roster, round and log for review
    pub fn end_combat(&mut self) {
        if !self.is_active {
            return;
        }
        self.is_active = false;
        self.is_paused = false;
        self.current_turn = 0;
        self.record(LogKind::System, None, "Combat ended");
        info!("encounter {} ended in round {}", self.id, self.round);
    }

    /// Freeze turn controls without ending combat
    pub fn pause_combat(&mut self) {
        if !self.is_active || self.is_paused {
            return;
        }
        self.is_paused = true;
        self.record(LogKind::System, None, "Combat paused");
    }

    /// Unfreeze turn controls
    pub fn resume_combat(&mut self) {
        if !self.is_active || !self.is_paused {
            return;
        }
        self.is_paused = false;
        self.record(LogKind::System, None, "Combat resumed");
    }
}
