//! Combat system module
//!
//! Implements the game master's combat tracker:
//! - Dice rolling (e.g., "3d6+2") with an exploding d10 check die
//! - Timed and persistent status conditions
//! - Initiative, turn order and round progression
//! - The encounter aggregate and its combat log
//! - A manager holding encounters by id for the UI layer

mod conditions;
mod dice;
mod encounter;
mod log;
mod manager;
mod participant;
mod scheduler;

pub use conditions::{ConditionTracker, StatusCondition};
pub use dice::{
    initiative_roll, roll, roll_dice, skill_check, DiceError, DiceExpression, DiceRollResult,
    DieSource, RandomDice, ScriptedDice, SkillCheck, CHECK_DIE, MAX_DICE, MAX_EXPLOSIONS,
};
pub use encounter::{CombatEncounter, EncounterError};
pub use log::{CombatLog, CombatLogEntry, LogKind};
pub use manager::{EncounterManager, ManagerError};
pub use participant::{CombatParticipant, ParticipantUpdate, DEFAULT_REFLEXES, NPC_COLOR, PC_COLOR};
pub use scheduler::{roll_initiative, sort_by_initiative};
