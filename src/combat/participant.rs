//! Combat participants
//!
//! Player characters and NPCs on the initiative track. Hit points are kept
//! behind setters so the seriously-wounded flag always matches them.

use serde::{Deserialize, Serialize};

use super::conditions::ConditionTracker;

/// Reflexes assumed for initiative when a participant has none recorded
pub const DEFAULT_REFLEXES: i32 = 5;

/// Token color for player characters
pub const PC_COLOR: &str = "#3b82f6";

/// Token color for NPCs
pub const NPC_COLOR: &str = "#ef4444";

/// One entry on the initiative track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ParticipantRecord")]
pub struct CombatParticipant {
    /// Unique within an encounter
    pub id: String,
    pub name: String,
    pub initiative: i32,
    /// Check die total from the last initiative roll
    pub initiative_roll: Option<i32>,
    pub reflexes: Option<i32>,
    hit_points: i32,
    max_hit_points: i32,
    seriously_wounded: bool,
    #[serde(rename = "isNPC")]
    pub is_npc: bool,
    pub conditions: ConditionTracker,
    pub has_acted: bool,
    pub color: String,
}

/// Incoming participant JSON. Any `seriouslyWounded` value is ignored and
/// recomputed from hit points.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantRecord {
    id: String,
    name: String,
    initiative: i32,
    #[serde(default)]
    initiative_roll: Option<i32>,
    #[serde(default)]
    reflexes: Option<i32>,
    hit_points: i32,
    max_hit_points: i32,
    #[serde(rename = "isNPC", default)]
    is_npc: bool,
    #[serde(default)]
    conditions: ConditionTracker,
    #[serde(default)]
    has_acted: bool,
    color: String,
}

impl From<ParticipantRecord> for CombatParticipant {
    fn from(record: ParticipantRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            initiative: record.initiative,
            initiative_roll: record.initiative_roll,
            reflexes: record.reflexes,
            hit_points: record.hit_points,
            max_hit_points: record.max_hit_points,
            seriously_wounded: is_seriously_wounded(record.hit_points, record.max_hit_points),
            is_npc: record.is_npc,
            conditions: record.conditions,
            has_acted: record.has_acted,
            color: record.color,
        }
    }
}

impl CombatParticipant {
    /// Create a participant at full hit points
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_hit_points: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            initiative: 0,
            initiative_roll: None,
            reflexes: None,
            hit_points: max_hit_points,
            max_hit_points,
            seriously_wounded: is_seriously_wounded(max_hit_points, max_hit_points),
            is_npc: false,
            conditions: ConditionTracker::new(),
            has_acted: false,
            color: PC_COLOR.to_string(),
        }
    }

    /// Create an NPC at full hit points
    pub fn npc(id: impl Into<String>, name: impl Into<String>, max_hit_points: i32) -> Self {
        let mut participant = Self::new(id, name, max_hit_points);
        participant.is_npc = true;
        participant.color = NPC_COLOR.to_string();
        participant
    }

    /// Set the reflexes stat
    pub fn with_reflexes(mut self, reflexes: i32) -> Self {
        self.reflexes = Some(reflexes);
        self
    }

    /// Set current hit points
    pub fn with_hit_points(mut self, hit_points: i32) -> Self {
        self.set_hit_points(hit_points);
        self
    }

    /// Set the token color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn hit_points(&self) -> i32 {
        self.hit_points
    }

    pub fn max_hit_points(&self) -> i32 {
        self.max_hit_points
    }

    /// True when hit points are at or below half of maximum (rounded down)
    pub fn seriously_wounded(&self) -> bool {
        self.seriously_wounded
    }

    /// Reflexes used for initiative
    pub fn reflexes_or_default(&self) -> i32 {
        self.reflexes.unwrap_or(DEFAULT_REFLEXES)
    }

    /// Set current hit points. Values outside `0..=max` are kept as given.
    pub fn set_hit_points(&mut self, hit_points: i32) {
        self.hit_points = hit_points;
        self.refresh_wounds();
    }

    /// Set maximum hit points
    pub fn set_max_hit_points(&mut self, max_hit_points: i32) {
        self.max_hit_points = max_hit_points;
        self.refresh_wounds();
    }

    /// Subtract damage, returning the new hit point total
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        self.set_hit_points(self.hit_points.saturating_sub(amount));
        self.hit_points
    }

    /// Heal (cannot exceed max hit points), returning the amount restored
    pub fn heal(&mut self, amount: i32) -> i32 {
        let actual = amount
            .min(self.max_hit_points.saturating_sub(self.hit_points))
            .max(0);
        self.set_hit_points(self.hit_points + actual);
        actual
    }

    /// Whether the participant is at 0 hit points or below
    pub fn is_down(&self) -> bool {
        self.hit_points <= 0
    }

    /// Merge a partial update
    pub fn apply(&mut self, update: ParticipantUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(initiative) = update.initiative {
            self.initiative = initiative;
        }
        if let Some(reflexes) = update.reflexes {
            self.reflexes = Some(reflexes);
        }
        if let Some(is_npc) = update.is_npc {
            self.is_npc = is_npc;
        }
        if let Some(has_acted) = update.has_acted {
            self.has_acted = has_acted;
        }
        if let Some(color) = update.color {
            self.color = color;
        }
        if let Some(max) = update.max_hit_points {
            self.max_hit_points = max;
        }
        if let Some(hp) = update.hit_points {
            self.hit_points = hp;
        }
        self.refresh_wounds();
    }

    /// Recompute the derived wound flag from hit points
    pub(crate) fn refresh_wounds(&mut self) {
        self.seriously_wounded = is_seriously_wounded(self.hit_points, self.max_hit_points);
    }
}

fn is_seriously_wounded(hit_points: i32, max_hit_points: i32) -> bool {
    hit_points <= max_hit_points.div_euclid(2)
}

/// Fields to change on a participant; `None` leaves a field as is
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantUpdate {
    pub name: Option<String>,
    pub initiative: Option<i32>,
    pub reflexes: Option<i32>,
    pub hit_points: Option<i32>,
    pub max_hit_points: Option<i32>,
    #[serde(rename = "isNPC")]
    pub is_npc: Option<bool>,
    pub has_acted: Option<bool>,
    pub color: Option<String>,
}

impl ParticipantUpdate {
    /// Update that only sets hit points
    pub fn hit_points(hit_points: i32) -> Self {
        Self {
            hit_points: Some(hit_points),
            ..Self::default()
        }
    }
}
