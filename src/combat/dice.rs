//! Dice rolling system
//!
//! Parses and rolls dice notation like "3d6+2", "1d10", "2d6-1".
//!
//! A lone d10 is the check die. It explodes on a 10 (another d10 is rolled
//! and added, chaining on repeated 10s) and reports critical/fumble
//! outcomes. Every roll draws from an injected [`DieSource`] so callers can
//! replay exact sequences.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Sides on the check die used for initiative and skill checks
pub const CHECK_DIE: u32 = 10;

/// Maximum number of extra dice a single exploding check may add.
///
/// Only reachable with a broken random source; real dice stop long before.
pub const MAX_EXPLOSIONS: usize = 100;

/// Most dice a single expression may roll
pub const MAX_DICE: u32 = 1000;

static DICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[dD](\d+)(?:\s*([+-])\s*(\d+))?$").unwrap());

/// Dice notation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("invalid dice notation: {0:?}")]
    InvalidNotation(String),

    #[error("dice count must be at least 1, got {0}")]
    InvalidCount(u32),

    #[error("dice must have at least 2 sides, got {0}")]
    InvalidSides(u32),

    #[error("too many dice: {0} (at most {max})", max = MAX_DICE)]
    TooManyDice(u32),
}

/// Source of individual die results.
///
/// Implementations must return a value in `1..=sides`.
pub trait DieSource {
    /// Roll one die with the given number of sides
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<D: DieSource + ?Sized> DieSource for &mut D {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

impl<D: DieSource + ?Sized> DieSource for Box<D> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        (**self).roll_die(sides)
    }
}

/// Dice backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct RandomDice<R> {
    rng: R,
}

impl<R: Rng> RandomDice<R> {
    /// Wrap an existing generator
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomDice<StdRng> {
    /// Reproducible dice from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Dice seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> DieSource for RandomDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.random_range(1..=sides.max(1))
    }
}

/// Dice that replay a fixed sequence of results.
///
/// The sequence wraps around when exhausted. Values are clamped into the
/// range of the die being rolled; an empty script always rolls 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    values: Vec<u32>,
    next: usize,
}

impl ScriptedDice {
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }

    /// Number of dice rolled so far
    pub fn rolled(&self) -> usize {
        self.next
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        if self.values.is_empty() {
            return 1;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value.clamp(1, sides.max(1))
    }
}

/// A parsed dice expression: `count`d`sides` plus a flat modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceExpression {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceExpression {
    /// Create an expression, validating count and sides
    pub fn new(count: u32, sides: u32, modifier: i32) -> Result<Self, DiceError> {
        if count < 1 {
            return Err(DiceError::InvalidCount(count));
        }
        if count > MAX_DICE {
            return Err(DiceError::TooManyDice(count));
        }
        if sides < 2 {
            return Err(DiceError::InvalidSides(sides));
        }
        Ok(Self {
            count,
            sides,
            modifier,
        })
    }

    /// The single check die, `1d10`
    pub fn check_die() -> Self {
        Self {
            count: 1,
            sides: CHECK_DIE,
            modifier: 0,
        }
    }

    /// Parse a dice notation string like "3d6+2"
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let trimmed = notation.trim();
        let invalid = || DiceError::InvalidNotation(notation.to_string());

        let caps = DICE_REGEX.captures(trimmed).ok_or_else(invalid)?;
        let count: u32 = caps[1].parse().map_err(|_| invalid())?;
        let sides: u32 = caps[2].parse().map_err(|_| invalid())?;
        let modifier = match (caps.get(3), caps.get(4)) {
            (Some(sign), Some(value)) => {
                let value: i32 = value.as_str().parse().map_err(|_| invalid())?;
                if sign.as_str() == "-" {
                    -value
                } else {
                    value
                }
            }
            _ => 0,
        };

        Self::new(count, sides, modifier)
    }

    /// Whether this is a lone check die, which explodes and can crit or fumble.
    /// The modifier is ignored, so `1d10+3` is still a check die.
    pub fn is_check_die(&self) -> bool {
        self.count == 1 && self.sides == CHECK_DIE
    }

    /// Minimum possible total, ignoring explosions
    pub fn min(&self) -> i32 {
        (i64::from(self.count) + i64::from(self.modifier)).clamp(0, i64::from(i32::MAX)) as i32
    }

    /// Maximum possible total, ignoring explosions
    pub fn max(&self) -> i32 {
        let dice = i64::from(self.count) * i64::from(self.sides);
        (dice + i64::from(self.modifier)).clamp(0, i64::from(i32::MAX)) as i32
    }

    /// Roll the expression against the given dice
    pub fn roll_with<D: DieSource + ?Sized>(&self, dice: &mut D) -> DiceRollResult {
        let mut rolls: Vec<u32> = (0..self.count).map(|_| dice.roll_die(self.sides)).collect();

        let mut critical = false;
        let mut fumble = false;
        if self.is_check_die() {
            critical = rolls[0] == CHECK_DIE;
            fumble = rolls[0] == 1;
            if critical {
                explode(&mut rolls, dice);
            }
        }

        let sum: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        let total = (sum + i64::from(self.modifier)).clamp(0, i64::from(i32::MAX)) as i32;

        let result = DiceRollResult {
            expression: self.to_string(),
            rolls,
            modifier: self.modifier,
            total,
            critical,
            fumble,
        };
        debug!(expression = %result.expression, total = result.total, rolls = ?result.rolls, "rolled");
        result
    }
}

/// Keep rolling the check die while the newest result is a 10
fn explode<D: DieSource + ?Sized>(rolls: &mut Vec<u32>, dice: &mut D) {
    let mut extra = 0;
    while rolls.last() == Some(&CHECK_DIE) {
        if extra == MAX_EXPLOSIONS {
            warn!(
                "exploding check stopped after {} extra dice; random source looks stuck",
                MAX_EXPLOSIONS
            );
            break;
        }
        rolls.push(dice.roll_die(CHECK_DIE));
        extra += 1;
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.count, self.sides, self.modifier)
        } else if self.modifier < 0 {
            write!(f, "{}d{}{}", self.count, self.sides, self.modifier)
        } else {
            write!(f, "{}d{}", self.count, self.sides)
        }
    }
}

/// Outcome of rolling a dice expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollResult {
    /// Normalized notation that was rolled
    pub expression: String,
    /// Every die rolled, including exploded extras, in order
    pub rolls: Vec<u32>,
    pub modifier: i32,
    /// Sum of rolls plus modifier, never below 0
    pub total: i32,
    pub critical: bool,
    pub fumble: bool,
}

impl fmt::Display for DiceRollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rolls: Vec<String> = self.rolls.iter().map(|r| r.to_string()).collect();
        write!(f, "{}: [{}]", self.expression, rolls.join(", "))?;
        if self.modifier > 0 {
            write!(f, " + {}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, " - {}", self.modifier.unsigned_abs())?;
        }
        write!(f, " = {}", self.total)?;
        if self.critical {
            write!(f, " (critical)")?;
        } else if self.fumble {
            write!(f, " (fumble)")?;
        }
        Ok(())
    }
}

/// A check die rolled against a base value (stat + skill, or reflexes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCheck {
    pub base: i32,
    pub roll: DiceRollResult,
    /// `base + roll.total`
    pub total: i32,
}

impl SkillCheck {
    /// Whether the check strictly exceeds the difficulty value
    pub fn beats(&self, difficulty: i32) -> bool {
        self.total > difficulty
    }

    pub fn is_critical(&self) -> bool {
        self.roll.critical
    }

    pub fn is_fumble(&self) -> bool {
        self.roll.fumble
    }
}

/// Parse and roll `notation` against the given dice
pub fn roll<D: DieSource + ?Sized>(
    notation: &str,
    dice: &mut D,
) -> Result<DiceRollResult, DiceError> {
    Ok(DiceExpression::parse(notation)?.roll_with(dice))
}

/// Parse and roll `notation` with the thread-local generator
pub fn roll_dice(notation: &str) -> Result<DiceRollResult, DiceError> {
    roll(notation, &mut RandomDice::new(rand::rng()))
}

/// Roll the check die and add it to `base`
pub fn skill_check<D: DieSource + ?Sized>(base: i32, dice: &mut D) -> SkillCheck {
    let roll = DiceExpression::check_die().roll_with(dice);
    let total = base.saturating_add(roll.total);
    SkillCheck { base, roll, total }
}

/// Initiative is a check with reflexes as the base
pub fn initiative_roll<D: DieSource + ?Sized>(reflexes: i32, dice: &mut D) -> SkillCheck {
    skill_check(reflexes, dice)
}
