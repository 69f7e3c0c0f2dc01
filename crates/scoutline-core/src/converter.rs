// Linear mapping between 20-80 scouting grades and rate stats.

use crate::config::{ConverterConfig, LinearMap};
use crate::model::{RateLine, Role, Skill, SkillRatings, Stat, RATING_MID};

/// Forward (rating → rate) and inverse (rate → rating) conversion per skill
/// axis. Neither direction clamps; callers clamp ratings for display and
/// rates at the physical-bounds stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingConverter {
    config: ConverterConfig,
}

impl Default for RatingConverter {
    fn default() -> Self {
        RatingConverter::new(ConverterConfig::default())
    }
}

impl RatingConverter {
    pub fn new(config: ConverterConfig) -> Self {
        RatingConverter { config }
    }

    fn map(&self, skill: Skill) -> LinearMap {
        self.config.coefficients.get(skill)
    }

    /// Rate implied by `rating` on the given axis.
    pub fn rate(&self, skill: Skill, rating: f64) -> f64 {
        let m = self.map(skill);
        m.intercept + m.slope * rating
    }

    /// Rating implied by `rate` for the given stat. A flat mapping carries no
    /// information, so it reads as the scale midpoint.
    pub fn rating(&self, stat: Stat, rate: f64) -> f64 {
        let m = self.map(stat.skill());
        if m.slope == 0.0 || !rate.is_finite() {
            return RATING_MID;
        }
        (rate - m.intercept) / m.slope
    }

    /// Rates implied by a full set of ratings.
    pub fn rates_for(&self, ratings: &SkillRatings) -> RateLine {
        RateLine::from_fn(ratings.role(), |stat| {
            self.rate(stat.skill(), ratings.get(stat.skill()))
        })
    }

    /// Ratings implied by a full rate line.
    pub fn ratings_for(&self, rates: &RateLine) -> SkillRatings {
        SkillRatings::from_fn(rates.role(), |skill| {
            self.rating(skill.stat(), rates.get(skill.stat()))
        })
    }

    /// Rates implied by a grade lookup (e.g. a scouting row's current or
    /// potential grades).
    pub fn rates_from_grades(&self, role: Role, grade: impl Fn(Skill) -> f64) -> RateLine {
        RateLine::from_fn(role, |stat| self.rate(stat.skill(), grade(stat.skill())))
    }
}
