// Deterministic aging curve: age bracket → additive per-skill rating deltas.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{PerSkill, SkillRatings};

/// One bracket of the aging table, covering ages up to and including
/// `through_age` (and above the previous bracket).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgingBracket {
    pub through_age: u32,
    pub deltas: PerSkill<f64>,
}

/// Versioned age → delta table. Ages past the last bracket use the last
/// bracket's deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingModifierTable {
    pub version: u32,
    pub brackets: Vec<AgingBracket>,
}

fn uniform(pitching: [f64; 3], batting: [f64; 5]) -> PerSkill<f64> {
    PerSkill {
        stuff: pitching[0],
        control: pitching[1],
        hr_avoidance: pitching[2],
        eye: batting[0],
        contact: batting[1],
        gap: batting[2],
        speed: batting[3],
        power: batting[4],
    }
}

impl Default for AgingModifierTable {
    fn default() -> Self {
        let b = |through_age, pitching, batting| AgingBracket {
            through_age,
            deltas: uniform(pitching, batting),
        };
        AgingModifierTable {
            version: 1,
            brackets: vec![
                b(20, [3.0, 2.5, 2.0], [2.5, 3.0, 2.5, 0.5, 3.0]),
                b(22, [2.5, 2.0, 1.5], [2.0, 2.5, 2.0, 0.0, 2.5]),
                b(24, [1.5, 1.5, 1.0], [1.5, 1.5, 1.5, 0.0, 2.0]),
                b(26, [0.5, 1.0, 0.5], [1.0, 0.5, 0.5, -0.5, 1.0]),
                b(29, [0.0, 0.5, 0.0], [0.5, 0.0, 0.0, -1.0, 0.0]),
                b(31, [-1.0, 0.0, -0.5], [0.0, -0.5, -1.0, -1.5, -0.5]),
                b(33, [-1.5, -0.5, -1.0], [-0.5, -1.0, -1.5, -2.0, -1.5]),
                b(35, [-2.5, -1.0, -1.5], [-1.0, -2.0, -2.0, -2.5, -2.5]),
                b(u32::MAX, [-3.5, -1.5, -2.0], [-1.5, -3.0, -2.5, -3.0, -3.5]),
            ],
        }
    }
}

impl AgingModifierTable {
    /// Deltas for a player of `age` aging one season.
    pub fn deltas_for(&self, age: u32) -> PerSkill<f64> {
        self.brackets
            .iter()
            .find(|b| age <= b.through_age)
            .or_else(|| self.brackets.last())
            .map(|b| b.deltas)
            .unwrap_or_default()
    }

    /// Ratings after one season of aging, scaled by `fraction` (1.0 for the
    /// full curve). Results stay unclamped.
    pub fn apply(&self, ratings: &SkillRatings, age: u32, fraction: f64) -> SkillRatings {
        let deltas = self.deltas_for(age);
        ratings.map(|skill, value| value + deltas.get(skill) * fraction)
    }

    pub fn validate(&self) -> Result<()> {
        if self.brackets.is_empty() {
            return Err(EngineError::invalid("aging.brackets", "must contain at least one bracket"));
        }
        for pair in self.brackets.windows(2) {
            if pair[1].through_age <= pair[0].through_age {
                return Err(EngineError::invalid(
                    "aging.brackets",
                    "brackets must be in strictly ascending age order",
                ));
            }
        }
        Ok(())
    }
}
