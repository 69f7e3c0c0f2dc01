// Core data model: roles, stats, skills, rate lines, and the read-only input
// records the engine consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable identifier shared by stat rows, scouting rows, and outputs.
pub type PlayerId = u32;

/// Lowest grade on the 20-80 scouting scale.
pub const RATING_MIN: f64 = 20.0;
/// Highest grade on the 20-80 scouting scale.
pub const RATING_MAX: f64 = 80.0;
/// League-average grade; also the neutral default for absent grades.
pub const RATING_MID: f64 = 50.0;

/// Clamp an internal (unclamped) rating into the displayable 20-80 range.
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return RATING_MID;
    }
    rating.clamp(RATING_MIN, RATING_MAX)
}

// ---------------------------------------------------------------------------
// Roles and levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pitcher,
    Batter,
}

/// Peer-pool tier. Pitchers split into starters and relievers; batters share
/// a single tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTier {
    Starter,
    Reliever,
    Batter,
}

impl RoleTier {
    pub fn role(self) -> Role {
        match self {
            RoleTier::Starter | RoleTier::Reliever => Role::Pitcher,
            RoleTier::Batter => Role::Batter,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoleTier::Starter => "SP",
            RoleTier::Reliever => "RP",
            RoleTier::Batter => "BAT",
        }
    }
}

/// Competitive level a season was played at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Mlb,
    Aaa,
    Aa,
    A,
    Rookie,
}

impl Level {
    /// Parse a level tag (e.g. "MLB", "AAA", "r"). Returns `None` for
    /// unknown tags.
    pub fn from_str_level(s: &str) -> Option<Level> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MLB" | "ML" => Some(Level::Mlb),
            "AAA" => Some(Level::Aaa),
            "AA" => Some(Level::Aa),
            "A" => Some(Level::A),
            "R" | "ROOKIE" | "RK" => Some(Level::Rookie),
            _ => None,
        }
    }

    pub fn is_mlb(self) -> bool {
        self == Level::Mlb
    }
}

// ---------------------------------------------------------------------------
// Stats and skills
// ---------------------------------------------------------------------------

/// A rate stat the engine models. Pitching stats are per nine innings,
/// batting stats are per plate appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    K9,
    Bb9,
    Hr9,
    BbRate,
    SingleRate,
    DoubleRate,
    TripleRate,
    HrRate,
}

impl Stat {
    pub const PITCHING: [Stat; 3] = [Stat::K9, Stat::Bb9, Stat::Hr9];
    pub const BATTING: [Stat; 5] = [
        Stat::BbRate,
        Stat::SingleRate,
        Stat::DoubleRate,
        Stat::TripleRate,
        Stat::HrRate,
    ];

    pub fn for_role(role: Role) -> &'static [Stat] {
        match role {
            Role::Pitcher => &Self::PITCHING,
            Role::Batter => &Self::BATTING,
        }
    }

    pub fn role(self) -> Role {
        match self {
            Stat::K9 | Stat::Bb9 | Stat::Hr9 => Role::Pitcher,
            _ => Role::Batter,
        }
    }

    /// The scouting axis that drives this stat.
    pub fn skill(self) -> Skill {
        match self {
            Stat::K9 => Skill::Stuff,
            Stat::Bb9 => Skill::Control,
            Stat::Hr9 => Skill::HrAvoidance,
            Stat::BbRate => Skill::Eye,
            Stat::SingleRate => Skill::Contact,
            Stat::DoubleRate => Skill::Gap,
            Stat::TripleRate => Skill::Speed,
            Stat::HrRate => Skill::Power,
        }
    }

    /// Whether a larger value of this stat is better for the player.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Stat::Bb9 | Stat::Hr9)
    }

    /// Physically possible range of the stat.
    pub fn bounds(self) -> (f64, f64) {
        match self.role() {
            Role::Pitcher => (0.0, 27.0),
            Role::Batter => (0.0, 1.0),
        }
    }

    pub fn clamp(self, value: f64) -> f64 {
        let (lo, hi) = self.bounds();
        if value.is_nan() {
            return lo;
        }
        value.clamp(lo, hi)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::K9 => "K/9",
            Stat::Bb9 => "BB/9",
            Stat::Hr9 => "HR/9",
            Stat::BbRate => "BB%",
            Stat::SingleRate => "1B%",
            Stat::DoubleRate => "2B%",
            Stat::TripleRate => "3B%",
            Stat::HrRate => "HR%",
        }
    }
}

/// A 20-80 scouting axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Stuff,
    Control,
    HrAvoidance,
    Eye,
    Contact,
    Gap,
    Speed,
    Power,
}

impl Skill {
    pub const PITCHING: [Skill; 3] = [Skill::Stuff, Skill::Control, Skill::HrAvoidance];
    pub const BATTING: [Skill; 5] = [
        Skill::Eye,
        Skill::Contact,
        Skill::Gap,
        Skill::Speed,
        Skill::Power,
    ];

    pub fn for_role(role: Role) -> &'static [Skill] {
        match role {
            Role::Pitcher => &Self::PITCHING,
            Role::Batter => &Self::BATTING,
        }
    }

    /// The rate stat this axis converts to.
    pub fn stat(self) -> Stat {
        match self {
            Skill::Stuff => Stat::K9,
            Skill::Control => Stat::Bb9,
            Skill::HrAvoidance => Stat::Hr9,
            Skill::Eye => Stat::BbRate,
            Skill::Contact => Stat::SingleRate,
            Skill::Gap => Stat::DoubleRate,
            Skill::Speed => Stat::TripleRate,
            Skill::Power => Stat::HrRate,
        }
    }

    /// Parse a column-style skill name ("stuff", "hra", "avoid_hr", ...).
    pub fn from_str_skill(s: &str) -> Option<Skill> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stuff" | "stu" => Some(Skill::Stuff),
            "control" | "con" => Some(Skill::Control),
            "hra" | "hr_avoidance" => Some(Skill::HrAvoidance),
            "eye" => Some(Skill::Eye),
            "contact" => Some(Skill::Contact),
            "gap" => Some(Skill::Gap),
            "speed" => Some(Skill::Speed),
            "power" | "pow" => Some(Skill::Power),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Per-stat / per-skill tables
// ---------------------------------------------------------------------------

/// One value per rate stat. Used for configuration tables (stabilization
/// constants, level adjustments) and league averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerStat<T> {
    pub k9: T,
    pub bb9: T,
    pub hr9: T,
    pub bb_rate: T,
    pub single_rate: T,
    pub double_rate: T,
    pub triple_rate: T,
    pub hr_rate: T,
}

impl<T: Copy> PerStat<T> {
    pub fn get(&self, stat: Stat) -> T {
        match stat {
            Stat::K9 => self.k9,
            Stat::Bb9 => self.bb9,
            Stat::Hr9 => self.hr9,
            Stat::BbRate => self.bb_rate,
            Stat::SingleRate => self.single_rate,
            Stat::DoubleRate => self.double_rate,
            Stat::TripleRate => self.triple_rate,
            Stat::HrRate => self.hr_rate,
        }
    }
}

/// One value per scouting axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PerSkill<T> {
    pub stuff: T,
    pub control: T,
    pub hr_avoidance: T,
    pub eye: T,
    pub contact: T,
    pub gap: T,
    pub speed: T,
    pub power: T,
}

impl<T: Copy> PerSkill<T> {
    pub fn get(&self, skill: Skill) -> T {
        match skill {
            Skill::Stuff => self.stuff,
            Skill::Control => self.control,
            Skill::HrAvoidance => self.hr_avoidance,
            Skill::Eye => self.eye,
            Skill::Contact => self.contact,
            Skill::Gap => self.gap,
            Skill::Speed => self.speed,
            Skill::Power => self.power,
        }
    }
}

// ---------------------------------------------------------------------------
// Rate lines and rating sets
// ---------------------------------------------------------------------------

/// A role-tagged set of rate stats. Always holds exactly the stats of its
/// role; iteration order is the fixed `Stat` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLine {
    role: Role,
    rates: BTreeMap<Stat, f64>,
}

impl RateLine {
    /// Build a line by evaluating `f` for every stat of `role`.
    pub fn from_fn(role: Role, mut f: impl FnMut(Stat) -> f64) -> Self {
        let rates = Stat::for_role(role).iter().map(|&s| (s, f(s))).collect();
        RateLine { role, rates }
    }

    pub fn pitching(k9: f64, bb9: f64, hr9: f64) -> Self {
        Self::from_fn(Role::Pitcher, |s| match s {
            Stat::K9 => k9,
            Stat::Bb9 => bb9,
            _ => hr9,
        })
    }

    pub fn batting(bb: f64, single: f64, double: f64, triple: f64, hr: f64) -> Self {
        Self::from_fn(Role::Batter, |s| match s {
            Stat::BbRate => bb,
            Stat::SingleRate => single,
            Stat::DoubleRate => double,
            Stat::TripleRate => triple,
            _ => hr,
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Rate for `stat`; 0.0 for a stat outside this line's role.
    pub fn get(&self, stat: Stat) -> f64 {
        self.rates.get(&stat).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, f64)> + '_ {
        self.rates.iter().map(|(&s, &v)| (s, v))
    }

    pub fn map(&self, mut f: impl FnMut(Stat, f64) -> f64) -> Self {
        Self::from_fn(self.role, |s| f(s, self.get(s)))
    }

    /// Combine with another line stat-by-stat (over this line's role).
    pub fn zip_with(&self, other: &RateLine, mut f: impl FnMut(Stat, f64, f64) -> f64) -> Self {
        Self::from_fn(self.role, |s| f(s, self.get(s), other.get(s)))
    }

    /// Clamp every stat into its physical bounds.
    pub fn clamped(&self) -> Self {
        self.map(|s, v| s.clamp(v))
    }

    pub fn is_finite(&self) -> bool {
        self.rates.values().all(|v| v.is_finite())
    }
}

/// Skill ratings on the 20-80 scale, stored unclamped. Elite and raw
/// prospect values may legitimately fall outside the nominal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRatings {
    role: Role,
    ratings: BTreeMap<Skill, f64>,
}

impl SkillRatings {
    pub fn from_fn(role: Role, mut f: impl FnMut(Skill) -> f64) -> Self {
        let ratings = Skill::for_role(role).iter().map(|&k| (k, f(k))).collect();
        SkillRatings { role, ratings }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Raw (unclamped) rating; the scale midpoint for an axis outside the role.
    pub fn get(&self, skill: Skill) -> f64 {
        self.ratings.get(&skill).copied().unwrap_or(RATING_MID)
    }

    /// Rating clamped to [20, 80] for presentation.
    pub fn display(&self, skill: Skill) -> f64 {
        clamp_rating(self.get(skill))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Skill, f64)> + '_ {
        self.ratings.iter().map(|(&k, &v)| (k, v))
    }

    pub fn map(&self, mut f: impl FnMut(Skill, f64) -> f64) -> Self {
        Self::from_fn(self.role, |k| f(k, self.get(k)))
    }
}

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Player biography as of the rated season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    pub age: u32,
}

/// One pitcher-season at one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingSeason {
    pub player_id: PlayerId,
    pub year: u16,
    pub level: Level,
    pub ip: f64,
    pub gs: u32,
    pub k: u32,
    pub bb: u32,
    pub hr: u32,
    pub er: u32,
}

impl PitchingSeason {
    /// Earned runs per nine innings; 0.0 when no innings were pitched.
    pub fn era(&self) -> f64 {
        if self.ip <= 0.0 {
            return 0.0;
        }
        self.er as f64 * 9.0 / self.ip
    }
}

/// One batter-season at one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingSeason {
    pub player_id: PlayerId,
    pub year: u16,
    pub level: Level,
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub bb: u32,
    pub hbp: u32,
    pub k: u32,
    pub sb: u32,
    pub cs: u32,
}

impl BattingSeason {
    pub fn singles(&self) -> u32 {
        self.h
            .saturating_sub(self.doubles)
            .saturating_sub(self.triples)
            .saturating_sub(self.hr)
    }
}

/// Which scouting report a row comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoutSource {
    /// The user's own organisation scout.
    My,
    /// The league-wide shared scouting service.
    Osa,
}

/// Static durability grade. This is the only injury input the engine uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryGrade {
    IronMan,
    Durable,
    Normal,
    Fragile,
    Prone,
}

impl InjuryGrade {
    pub fn from_str_grade(s: &str) -> Option<InjuryGrade> {
        match s.trim().to_ascii_lowercase().replace([' ', '-', '_'], "").as_str() {
            "ironman" => Some(InjuryGrade::IronMan),
            "durable" => Some(InjuryGrade::Durable),
            "normal" => Some(InjuryGrade::Normal),
            "fragile" => Some(InjuryGrade::Fragile),
            "prone" | "wrecked" => Some(InjuryGrade::Prone),
            _ => None,
        }
    }

    /// Playing-time multiplier applied after the workload blend.
    pub fn workload_multiplier(self) -> f64 {
        match self {
            InjuryGrade::IronMan => 1.05,
            InjuryGrade::Durable => 1.02,
            InjuryGrade::Normal => 1.0,
            InjuryGrade::Fragile => 0.93,
            InjuryGrade::Prone => 0.85,
        }
    }
}

/// Scouting report for one player from one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutingRow {
    pub player_id: PlayerId,
    pub source: ScoutSource,
    pub role: Role,
    /// Current 20-80 grades. Absent axes read as 50.
    pub grades: BTreeMap<Skill, f64>,
    /// Potential grades. Absent axes fall back to the current grade.
    #[serde(default)]
    pub potential: BTreeMap<Skill, f64>,
    pub stamina: Option<f64>,
    pub injury: Option<InjuryGrade>,
    pub current_stars: Option<f64>,
    pub potential_stars: Option<f64>,
    /// Pitch (or tool) name -> grade.
    #[serde(default)]
    pub repertoire: BTreeMap<String, f64>,
}

impl ScoutingRow {
    pub fn grade(&self, skill: Skill) -> f64 {
        self.grades.get(&skill).copied().unwrap_or(RATING_MID)
    }

    pub fn potential_grade(&self, skill: Skill) -> f64 {
        self.potential
            .get(&skill)
            .copied()
            .unwrap_or_else(|| self.grade(skill))
    }

    /// Potential stars minus current stars. A missing side defaults to the
    /// other, so a row without potential reads as fully developed.
    pub fn star_gap(&self) -> f64 {
        match (self.current_stars, self.potential_stars) {
            (Some(cur), Some(pot)) => (pot - cur).max(0.0),
            _ => 0.0,
        }
    }

    /// Number of repertoire entries graded at or above `min_grade`.
    pub fn usable_pitches(&self, min_grade: f64) -> usize {
        self.repertoire.values().filter(|&&g| g >= min_grade).count()
    }
}

/// Whether a rating is backed by scouting or derived from stats alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSource {
    Scouting,
    StatsOnly,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
