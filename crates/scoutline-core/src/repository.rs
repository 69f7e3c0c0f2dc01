// Read-only access to players, stat rows, and scouting rows.

use std::collections::HashMap;

use crate::model::{BattingSeason, PitchingSeason, Player, PlayerId, Role, ScoutSource, ScoutingRow};

/// Injected snapshot the engine reads from. Implementations must not change
/// while a computation is running.
pub trait StatsRepository: Sync {
    /// Players of `role`, ordered by id.
    fn players(&self, role: Role) -> Vec<&Player>;

    fn player(&self, id: PlayerId) -> Option<&Player>;

    /// Pitching rows for a player, most recent first.
    fn pitching_seasons(&self, id: PlayerId) -> &[PitchingSeason];

    /// Batting rows for a player, most recent first.
    fn batting_seasons(&self, id: PlayerId) -> &[BattingSeason];

    /// Preferred scouting row for a player.
    fn scouting(&self, id: PlayerId) -> Option<&ScoutingRow>;
}

/// `StatsRepository` backed by in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    players: HashMap<PlayerId, Player>,
    pitching: HashMap<PlayerId, Vec<PitchingSeason>>,
    batting: HashMap<PlayerId, Vec<BattingSeason>>,
    scouting: HashMap<PlayerId, ScoutingRow>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flat tables. When a player has both an own-scout and a
    /// shared-service row, the own-scout row wins.
    pub fn from_parts(
        players: Vec<Player>,
        pitching: Vec<PitchingSeason>,
        batting: Vec<BattingSeason>,
        scouting: Vec<ScoutingRow>,
    ) -> Self {
        let mut repo = InMemoryRepository::new();
        for p in players {
            repo.add_player(p);
        }
        for row in pitching {
            repo.add_pitching(row);
        }
        for row in batting {
            repo.add_batting(row);
        }
        for row in scouting {
            repo.add_scouting(row);
        }
        repo
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn add_pitching(&mut self, row: PitchingSeason) {
        let rows = self.pitching.entry(row.player_id).or_default();
        rows.push(row);
        rows.sort_by(|a, b| b.year.cmp(&a.year));
    }

    pub fn add_batting(&mut self, row: BattingSeason) {
        let rows = self.batting.entry(row.player_id).or_default();
        rows.push(row);
        rows.sort_by(|a, b| b.year.cmp(&a.year));
    }

    pub fn add_scouting(&mut self, row: ScoutingRow) {
        match self.scouting.get(&row.player_id) {
            Some(existing) if existing.source == ScoutSource::My && row.source != ScoutSource::My => {}
            _ => {
                self.scouting.insert(row.player_id, row);
            }
        }
    }
}

impl StatsRepository for InMemoryRepository {
    fn players(&self, role: Role) -> Vec<&Player> {
        let mut out: Vec<&Player> = self.players.values().filter(|p| p.role == role).collect();
        out.sort_by_key(|p| p.id);
        out
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    fn pitching_seasons(&self, id: PlayerId) -> &[PitchingSeason] {
        self.pitching.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn batting_seasons(&self, id: PlayerId) -> &[BattingSeason] {
        self.batting.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn scouting(&self, id: PlayerId) -> Option<&ScoutingRow> {
        self.scouting.get(&id)
    }
}
