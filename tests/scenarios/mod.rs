//! Scenario Tests
//!
//! - Roster: joining, leaving and the turn pointer
//! - Turns: initiative order, undo, pausing
//! - Saves: writing and restoring a table through a save file

pub mod roster;
pub mod saves;
pub mod turns;
