// Input data loading and normalization.
//
// Reads snake_case CSV exports: player biographies, per-level pitching and
// batting seasons, scouting reports from either source, and an optional
// per-season league context table.

use crate::config::{resolve, DataPaths};
use scoutline_core::model::{
    BattingSeason, InjuryGrade, Level, PitchingSeason, Player, PlayerId, Role, ScoutSource,
    ScoutingRow, Skill,
};
use scoutline_core::{InMemoryRepository, LeagueContext};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Every input table, as parsed, in file order.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub players: Vec<Player>,
    pub pitching: Vec<PitchingSeason>,
    pub batting: Vec<BattingSeason>,
    pub scouting: Vec<ScoutingRow>,
    pub league: Vec<LeagueRow>,
}

impl LoadedData {
    /// Build the engine's read-only repository from the parsed tables.
    pub fn repository(&self) -> InMemoryRepository {
        InMemoryRepository::from_parts(
            self.players.clone(),
            self.pitching.clone(),
            self.batting.clone(),
            self.scouting.clone(),
        )
    }

    /// League context for `season`. Starts from the context derived from the
    /// stat rows, then applies whatever the league table supplies.
    pub fn league_context(&self, season: u16, min_qualified_ip: f64) -> LeagueContext {
        let derived = LeagueContext::from_seasons(season, &self.pitching, &self.batting, min_qualified_ip);
        match self.league.iter().rev().find(|row| row.season == season) {
            Some(row) => row.apply(derived),
            None => derived,
        }
    }
}

/// One row of the league context table. Absent columns keep the derived
/// value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LeagueRow {
    pub season: u16,
    #[serde(default)]
    pub fip_constant: Option<f64>,
    #[serde(default)]
    pub league_era: Option<f64>,
    #[serde(default)]
    pub league_woba: Option<f64>,
    #[serde(default)]
    pub woba_scale: Option<f64>,
    #[serde(default)]
    pub runs_per_win: Option<f64>,
    #[serde(default)]
    pub k9: Option<f64>,
    #[serde(default)]
    pub bb9: Option<f64>,
    #[serde(default)]
    pub hr9: Option<f64>,
    #[serde(default)]
    pub bb_rate: Option<f64>,
    #[serde(default)]
    pub single_rate: Option<f64>,
    #[serde(default)]
    pub double_rate: Option<f64>,
    #[serde(default)]
    pub triple_rate: Option<f64>,
    #[serde(default)]
    pub hr_rate: Option<f64>,
}

impl LeagueRow {
    /// Overlay this row onto `base`. League FIP and wOBA are recomputed from
    /// the resulting rates unless the row pins wOBA explicitly.
    pub fn apply(&self, base: LeagueContext) -> LeagueContext {
        let mut ctx = LeagueContext {
            season: self.season,
            ..base
        };
        let set = |slot: &mut f64, value: Option<f64>| {
            if let Some(v) = value {
                *slot = v;
            }
        };
        set(&mut ctx.fip_constant, self.fip_constant);
        set(&mut ctx.woba_scale, self.woba_scale);
        set(&mut ctx.runs_per_win, self.runs_per_win);
        set(&mut ctx.rates.k9, self.k9);
        set(&mut ctx.rates.bb9, self.bb9);
        set(&mut ctx.rates.hr9, self.hr9);
        set(&mut ctx.rates.bb_rate, self.bb_rate);
        set(&mut ctx.rates.single_rate, self.single_rate);
        set(&mut ctx.rates.double_rate, self.double_rate);
        set(&mut ctx.rates.triple_rate, self.triple_rate);
        set(&mut ctx.rates.hr_rate, self.hr_rate);

        ctx.league_fip = scoutline_core::value::fip(&ctx.league_rates(Role::Pitcher), ctx.fip_constant);
        set(&mut ctx.league_era, self.league_era);
        ctx.league_woba = match self.league_woba {
            Some(w) => w,
            None => scoutline_core::value::woba(&ctx.league_rates(Role::Batter), &ctx.woba_weights),
        };
        ctx
    }

    fn values(&self) -> [Option<f64>; 13] {
        [
            self.fip_constant,
            self.league_era,
            self.league_woba,
            self.woba_scale,
            self.runs_per_win,
            self.k9,
            self.bb9,
            self.hr9,
            self.bb_rate,
            self.single_rate,
            self.double_rate,
            self.triple_rate,
            self.hr_rate,
        ]
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: PlayerId,
    name: String,
    role: String,
    age: u32,
}

/// Innings are read as text so that baseball notation ("180.2" for 180 and
/// two thirds) can be told apart from plain decimals.
#[derive(Debug, Deserialize)]
struct RawPitching {
    player_id: PlayerId,
    year: u16,
    level: String,
    ip: String,
    #[serde(default)]
    gs: u32,
    k: u32,
    bb: u32,
    hr: u32,
    #[serde(default)]
    er: u32,
}

#[derive(Debug, Deserialize)]
struct RawBatting {
    player_id: PlayerId,
    year: u16,
    level: String,
    pa: u32,
    #[serde(default)]
    ab: u32,
    h: u32,
    doubles: u32,
    triples: u32,
    hr: u32,
    bb: u32,
    #[serde(default)]
    hbp: u32,
    #[serde(default)]
    k: u32,
    #[serde(default)]
    sb: u32,
    #[serde(default)]
    cs: u32,
}

#[derive(Debug, Deserialize)]
struct RawScouting {
    player_id: PlayerId,
    source: String,
    role: String,
    #[serde(default)]
    stuff: Option<f64>,
    #[serde(default)]
    control: Option<f64>,
    #[serde(default)]
    hra: Option<f64>,
    #[serde(default)]
    eye: Option<f64>,
    #[serde(default)]
    contact: Option<f64>,
    #[serde(default)]
    gap: Option<f64>,
    #[serde(default)]
    speed: Option<f64>,
    #[serde(default)]
    power: Option<f64>,
    #[serde(default)]
    pot_stuff: Option<f64>,
    #[serde(default)]
    pot_control: Option<f64>,
    #[serde(default)]
    pot_hra: Option<f64>,
    #[serde(default)]
    pot_eye: Option<f64>,
    #[serde(default)]
    pot_contact: Option<f64>,
    #[serde(default)]
    pot_gap: Option<f64>,
    #[serde(default)]
    pot_speed: Option<f64>,
    #[serde(default)]
    pot_power: Option<f64>,
    #[serde(default)]
    stamina: Option<f64>,
    #[serde(default)]
    injury: Option<String>,
    #[serde(default)]
    ovr: Option<f64>,
    #[serde(default)]
    pot: Option<f64>,
    #[serde(default)]
    pitches: Option<String>,
}

impl RawScouting {
    fn current(&self) -> [(Skill, Option<f64>); 8] {
        [
            (Skill::Stuff, self.stuff),
            (Skill::Control, self.control),
            (Skill::HrAvoidance, self.hra),
            (Skill::Eye, self.eye),
            (Skill::Contact, self.contact),
            (Skill::Gap, self.gap),
            (Skill::Speed, self.speed),
            (Skill::Power, self.power),
        ]
    }

    fn potential(&self) -> [(Skill, Option<f64>); 8] {
        [
            (Skill::Stuff, self.pot_stuff),
            (Skill::Control, self.pot_control),
            (Skill::HrAvoidance, self.pot_hra),
            (Skill::Eye, self.pot_eye),
            (Skill::Contact, self.pot_contact),
            (Skill::Gap, self.pot_gap),
            (Skill::Speed, self.pot_speed),
            (Skill::Power, self.pot_power),
        ]
    }
}

// ---------------------------------------------------------------------------
// Field parsers
// ---------------------------------------------------------------------------

/// Parse a role tag. Pitcher positions map to `Pitcher`; everything else
/// that names a hitter maps to `Batter`.
pub fn parse_role(s: &str) -> Option<Role> {
    match s.trim().to_ascii_uppercase().as_str() {
        "PITCHER" | "P" | "SP" | "RP" | "CL" => Some(Role::Pitcher),
        "BATTER" | "HITTER" | "B" | "H" => Some(Role::Batter),
        _ => None,
    }
}

pub fn parse_source(s: &str) -> Option<ScoutSource> {
    match s.trim().to_ascii_lowercase().as_str() {
        "my" | "own" | "scout" => Some(ScoutSource::My),
        "osa" | "shared" => Some(ScoutSource::Osa),
        _ => None,
    }
}

/// Parse an innings value. A single fractional digit of 1 or 2 is read as
/// thirds ("180.1" = 180 1/3); any other value is read as a plain decimal.
pub fn parse_innings(s: &str) -> Option<f64> {
    let s = s.trim();
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if let Some((whole, frac)) = s.split_once('.') {
        if matches!(frac, "1" | "2") {
            let whole: f64 = if whole.is_empty() { 0.0 } else { whole.parse().ok()? };
            let outs: f64 = frac.parse().ok()?;
            return Some(whole + outs / 3.0);
        }
    }
    Some(value)
}

/// Parse a repertoire list such as "FB:60;SL:55;CH:45". Malformed entries
/// are skipped.
pub fn parse_repertoire(s: &str) -> BTreeMap<String, f64> {
    s.split(';')
        .filter_map(|entry| {
            let (name, grade) = entry.split_once(':')?;
            let name = name.trim();
            let grade: f64 = grade.trim().parse().ok()?;
            if name.is_empty() || !grade.is_finite() {
                return None;
            }
            Some((name.to_string(), grade))
        })
        .collect()
}

fn all_finite(values: &[Option<f64>]) -> bool {
    values.iter().flatten().all(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Reader-based loaders (enable testing without temp files)
// ---------------------------------------------------------------------------

pub fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayer>() {
        match result {
            Ok(raw) => {
                let Some(role) = parse_role(&raw.role) else {
                    warn!("skipping player {}: unknown role '{}'", raw.id, raw.role);
                    continue;
                };
                players.push(Player {
                    id: raw.id,
                    name: raw.name.trim().to_string(),
                    role,
                    age: raw.age,
                });
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

pub fn load_pitching_from_reader<R: Read>(rdr: R) -> Result<Vec<PitchingSeason>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawPitching>() {
        match result {
            Ok(raw) => {
                let Some(level) = Level::from_str_level(&raw.level) else {
                    warn!("skipping pitching row for {}: unknown level '{}'", raw.player_id, raw.level);
                    continue;
                };
                let Some(ip) = parse_innings(&raw.ip) else {
                    warn!("skipping pitching row for {}: invalid IP '{}'", raw.player_id, raw.ip);
                    continue;
                };
                rows.push(PitchingSeason {
                    player_id: raw.player_id,
                    year: raw.year,
                    level,
                    ip,
                    gs: raw.gs,
                    k: raw.k,
                    bb: raw.bb,
                    hr: raw.hr,
                    er: raw.er,
                });
            }
            Err(e) => {
                warn!("skipping malformed pitching row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_batting_from_reader<R: Read>(rdr: R) -> Result<Vec<BattingSeason>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawBatting>() {
        match result {
            Ok(raw) => {
                let Some(level) = Level::from_str_level(&raw.level) else {
                    warn!("skipping batting row for {}: unknown level '{}'", raw.player_id, raw.level);
                    continue;
                };
                let extra_bases = raw.doubles.checked_add(raw.triples).and_then(|v| v.checked_add(raw.hr));
                let on_base = raw.h.checked_add(raw.bb).and_then(|v| v.checked_add(raw.hbp));
                let (Some(extra_bases), Some(on_base)) = (extra_bases, on_base) else {
                    warn!(
                        "skipping batting row for {} ({}): counting stats overflow",
                        raw.player_id, raw.year
                    );
                    continue;
                };
                if extra_bases > raw.h || on_base > raw.pa {
                    warn!(
                        "skipping batting row for {} ({}): hit/walk totals exceed PA",
                        raw.player_id, raw.year
                    );
                    continue;
                }
                rows.push(BattingSeason {
                    player_id: raw.player_id,
                    year: raw.year,
                    level,
                    pa: raw.pa,
                    ab: raw.ab,
                    h: raw.h,
                    doubles: raw.doubles,
                    triples: raw.triples,
                    hr: raw.hr,
                    bb: raw.bb,
                    hbp: raw.hbp,
                    k: raw.k,
                    sb: raw.sb,
                    cs: raw.cs,
                });
            }
            Err(e) => {
                warn!("skipping malformed batting row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_scouting_from_reader<R: Read>(rdr: R) -> Result<Vec<ScoutingRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawScouting>() {
        match result {
            Ok(raw) => {
                let Some(source) = parse_source(&raw.source) else {
                    warn!("skipping scouting row for {}: unknown source '{}'", raw.player_id, raw.source);
                    continue;
                };
                let Some(role) = parse_role(&raw.role) else {
                    warn!("skipping scouting row for {}: unknown role '{}'", raw.player_id, raw.role);
                    continue;
                };
                let grades = raw.current();
                let potential = raw.potential();
                let mut numbers: Vec<Option<f64>> = grades.iter().chain(potential.iter()).map(|(_, v)| *v).collect();
                numbers.extend([raw.stamina, raw.ovr, raw.pot]);
                if !all_finite(&numbers) {
                    warn!("skipping scouting row for {}: non-finite grade", raw.player_id);
                    continue;
                }

                let for_role = |pairs: [(Skill, Option<f64>); 8]| -> BTreeMap<Skill, f64> {
                    pairs
                        .into_iter()
                        .filter(|(skill, _)| Skill::for_role(role).contains(skill))
                        .filter_map(|(skill, v)| v.map(|v| (skill, v)))
                        .collect()
                };

                let injury = match raw.injury.as_deref().map(str::trim) {
                    None | Some("") => None,
                    Some(text) => {
                        let grade = InjuryGrade::from_str_grade(text);
                        if grade.is_none() {
                            warn!("unknown injury grade '{}' for {}, treating as absent", text, raw.player_id);
                        }
                        grade
                    }
                };

                rows.push(ScoutingRow {
                    player_id: raw.player_id,
                    source,
                    role,
                    grades: for_role(grades),
                    potential: for_role(potential),
                    stamina: raw.stamina,
                    injury,
                    current_stars: raw.ovr,
                    potential_stars: raw.pot,
                    repertoire: raw.pitches.as_deref().map(parse_repertoire).unwrap_or_default(),
                });
            }
            Err(e) => {
                warn!("skipping malformed scouting row: {}", e);
            }
        }
    }
    Ok(rows)
}

pub fn load_league_from_reader<R: Read>(rdr: R) -> Result<Vec<LeagueRow>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<LeagueRow>() {
        match result {
            Ok(row) => {
                if !all_finite(&row.values()) {
                    warn!("skipping league row for {}: non-finite value", row.season);
                    continue;
                }
                rows.push(row);
            }
            Err(e) => {
                warn!("skipping malformed league row: {}", e);
            }
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> LoadError + '_ {
    move |e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

pub fn load_players(path: &Path) -> Result<Vec<Player>, LoadError> {
    load_players_from_reader(open(path)?).map_err(csv_err(path))
}

pub fn load_pitching(path: &Path) -> Result<Vec<PitchingSeason>, LoadError> {
    load_pitching_from_reader(open(path)?).map_err(csv_err(path))
}

pub fn load_batting(path: &Path) -> Result<Vec<BattingSeason>, LoadError> {
    load_batting_from_reader(open(path)?).map_err(csv_err(path))
}

pub fn load_scouting(path: &Path) -> Result<Vec<ScoutingRow>, LoadError> {
    load_scouting_from_reader(open(path)?).map_err(csv_err(path))
}

pub fn load_league(path: &Path) -> Result<Vec<LeagueRow>, LoadError> {
    load_league_from_reader(open(path)?).map_err(csv_err(path))
}

/// Load every input table named in `paths`, resolved against `base_dir`.
pub fn load_all(base_dir: &Path, paths: &DataPaths) -> Result<LoadedData, LoadError> {
    let players = load_players(&resolve(base_dir, &paths.players))?;
    let pitching = load_pitching(&resolve(base_dir, &paths.pitching))?;
    let batting = load_batting(&resolve(base_dir, &paths.batting))?;
    let scouting = load_scouting(&resolve(base_dir, &paths.scouting))?;
    let league = match &paths.league {
        Some(p) => load_league(&resolve(base_dir, p))?,
        None => Vec::new(),
    };

    if players.is_empty() {
        return Err(LoadError::Validation("player CSV produced zero valid rows".into()));
    }

    Ok(LoadedData {
        players,
        pitching,
        batting,
        scouting,
        league,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    // ---- field parsers ----

    #[test]
    fn innings_thirds_notation() {
        assert!(approx_eq(parse_innings("180.1").unwrap(), 180.0 + 1.0 / 3.0, 1e-12));
        assert!(approx_eq(parse_innings("45.2").unwrap(), 45.0 + 2.0 / 3.0, 1e-12));
        assert_eq!(parse_innings("200").unwrap(), 200.0);
        assert_eq!(parse_innings("200.0").unwrap(), 200.0);
        assert_eq!(parse_innings("62.5").unwrap(), 62.5);
        assert_eq!(parse_innings("-3"), None);
        assert_eq!(parse_innings("abc"), None);
    }

    #[test]
    fn repertoire_skips_bad_entries() {
        let rep = parse_repertoire("FB:60; SL:55;CH;CB:x;:40");
        assert_eq!(rep.len(), 2);
        assert_eq!(rep["FB"], 60.0);
        assert_eq!(rep["SL"], 55.0);
    }

    #[test]
    fn role_tags() {
        assert_eq!(parse_role("SP"), Some(Role::Pitcher));
        assert_eq!(parse_role("pitcher"), Some(Role::Pitcher));
        assert_eq!(parse_role("batter"), Some(Role::Batter));
        assert_eq!(parse_role("DH"), None);
    }

    // ---- players ----

    #[test]
    fn players_parse_and_trim() {
        let csv = "id,name,role,age\n1,  Ace Arm ,pitcher,27\n2,Big Bat,batter,30\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Ace Arm");
        assert_eq!(players[0].role, Role::Pitcher);
        assert_eq!(players[1].age, 30);
    }

    #[test]
    fn players_unknown_role_skipped() {
        let csv = "id,name,role,age\n1,Ace,wizard,27\n2,Bat,batter,30\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, 2);
    }

    #[test]
    fn malformed_player_rows_skipped() {
        let csv = "id,name,role,age\nx,Bad,batter,30\n3,Good,batter,24\n";
        let players = load_players_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, 3);
    }

    // ---- pitching ----

    #[test]
    fn pitching_rows_parse_levels_and_innings() {
        let csv = "player_id,year,level,ip,gs,k,bb,hr,er\n\
                   1,2024,MLB,180.1,30,190,50,20,70\n\
                   1,2023,AAA,60.2,11,70,20,5,25\n\
                   1,2022,Double-A,50,9,50,20,5,25\n";
        let rows = load_pitching_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].level, Level::Mlb);
        assert!(approx_eq(rows[0].ip, 180.0 + 1.0 / 3.0, 1e-12));
        assert_eq!(rows[1].level, Level::Aaa);
        assert_eq!(rows[1].gs, 11);
    }

    #[test]
    fn pitching_optional_columns_default() {
        let csv = "player_id,year,level,ip,k,bb,hr\n4,2024,A,40,45,12,3\n";
        let rows = load_pitching_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gs, 0);
        assert_eq!(rows[0].er, 0);
    }

    // ---- batting ----

    #[test]
    fn batting_rows_parse_with_defaults() {
        let csv = "player_id,year,level,pa,h,doubles,triples,hr,bb\n7,2024,MLB,600,150,30,3,25,60\n";
        let rows = load_batting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].singles(), 92);
        assert_eq!(rows[0].sb, 0);
        assert_eq!(rows[0].hbp, 0);
    }

    #[test]
    fn batting_impossible_totals_skipped() {
        let csv = "player_id,year,level,pa,h,doubles,triples,hr,bb\n\
                   7,2024,MLB,100,20,15,5,5,10\n\
                   8,2024,MLB,100,90,5,0,5,20\n\
                   9,2024,MLB,100,25,5,0,5,10\n";
        let rows = load_batting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, 9);
    }

    #[test]
    fn batting_overflowing_counts_skipped() {
        let csv = "player_id,year,level,pa,h,doubles,triples,hr,bb\n\
                   7,2024,MLB,100,4294967295,0,0,0,10\n\
                   8,2024,MLB,100,20,4294967295,1,0,10\n\
                   9,2024,MLB,100,25,5,0,5,10\n";
        let rows = load_batting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, 9);
    }

    // ---- scouting ----

    #[test]
    fn scouting_row_keeps_only_role_axes() {
        let csv = "player_id,source,role,stuff,control,hra,eye,power,pot_stuff,stamina,injury,ovr,pot,pitches\n\
                   1,my,pitcher,60,55,50,70,70,70,65,Durable,3.0,4.5,FB:65;SL:60;CH:40\n";
        let rows = load_scouting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.source, ScoutSource::My);
        assert_eq!(row.grades.len(), 3);
        assert_eq!(row.grade(Skill::Stuff), 60.0);
        assert!(!row.grades.contains_key(&Skill::Eye));
        assert_eq!(row.potential_grade(Skill::Stuff), 70.0);
        assert_eq!(row.potential_grade(Skill::Control), 55.0);
        assert_eq!(row.injury, Some(InjuryGrade::Durable));
        assert_eq!(row.star_gap(), 1.5);
        assert_eq!(row.usable_pitches(45.0), 2);
    }

    #[test]
    fn scouting_empty_cells_are_absent() {
        let csv = "player_id,source,role,eye,contact,gap,speed,power,stamina,injury,ovr,pot\n\
                   2,osa,batter,55,,50,45,60,,,2.5,\n";
        let rows = load_scouting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.source, ScoutSource::Osa);
        assert_eq!(row.grades.len(), 4);
        assert_eq!(row.grade(Skill::Contact), 50.0);
        assert_eq!(row.stamina, None);
        assert_eq!(row.injury, None);
        assert_eq!(row.potential_stars, None);
        assert!(row.repertoire.is_empty());
    }

    #[test]
    fn scouting_unknown_source_skipped() {
        let csv = "player_id,source,role,stuff\n1,rumor,pitcher,60\n2,my,pitcher,55\n";
        let rows = load_scouting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player_id, 2);
    }

    #[test]
    fn scouting_unknown_injury_is_absent() {
        let csv = "player_id,source,role,stuff,injury\n1,my,pitcher,60,Glass\n";
        let rows = load_scouting_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].injury, None);
    }

    // ---- league ----

    #[test]
    fn league_row_overlays_derived_context() {
        let csv = "season,fip_constant,k9,woba_scale\n2024,3.10,8.5,1.25\n";
        let rows = load_league_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        let ctx = rows[0].apply(LeagueContext::default());
        assert_eq!(ctx.season, 2024);
        assert_eq!(ctx.fip_constant, 3.10);
        assert_eq!(ctx.rates.k9, 8.5);
        assert_eq!(ctx.woba_scale, 1.25);
        assert_eq!(ctx.rates.bb9, LeagueContext::default().rates.bb9);
        let expected_fip = scoutline_core::value::fip(&ctx.league_rates(Role::Pitcher), 3.10);
        assert!(approx_eq(ctx.league_fip, expected_fip, 1e-12));
    }

    #[test]
    fn league_context_prefers_table_row_for_season() {
        let data = LoadedData {
            league: vec![LeagueRow {
                season: 2024,
                fip_constant: Some(3.0),
                league_era: None,
                league_woba: Some(0.320),
                woba_scale: None,
                runs_per_win: None,
                k9: None,
                bb9: None,
                hr9: None,
                bb_rate: None,
                single_rate: None,
                double_rate: None,
                triple_rate: None,
                hr_rate: None,
            }],
            ..LoadedData::default()
        };
        let ctx = data.league_context(2024, 50.0);
        assert_eq!(ctx.fip_constant, 3.0);
        assert_eq!(ctx.league_woba, 0.320);

        let other = data.league_context(2023, 50.0);
        assert_eq!(other.season, 2023);
        assert_eq!(other.fip_constant, scoutline_core::league::DEFAULT_FIP_CONSTANT);
    }

    #[test]
    fn empty_csv_returns_empty_vec() {
        let rows = load_pitching_from_reader("player_id,year,level,ip,gs,k,bb,hr,er\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }
}
