use crate::platform::KeyValueStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameId {
    Snake,
    Pong,
}

impl GameId {
    pub const ALL: [GameId; 2] = [GameId::Snake, GameId::Pong];
    pub const COUNT: usize = Self::ALL.len();

    pub const fn index(self) -> usize {
        match self {
            GameId::Snake => 0,
            GameId::Pong => 1,
        }
    }

    /// Key the best score is persisted under.
    pub const fn storage_key(self) -> &'static str {
        match self {
            GameId::Snake => "hs_snake",
            GameId::Pong => "hs_pong",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            GameId::Snake => "SNAKE",
            GameId::Pong => "PONG",
        }
    }
}

/// Best score per game. Only ever grows, and every increase is written
/// through to storage immediately.
#[derive(Clone, Debug)]
pub struct HighScoreTable {
    best: [u32; GameId::COUNT],
    ceiling: u32,
}

impl HighScoreTable {
    /// Reads both scores. Missing entries count as 0; entries outside
    /// `0..=ceiling` are treated as corrupt, reset to 0 and rewritten.
    pub fn load<S: KeyValueStore>(store: &mut S, ceiling: i32) -> Self {
        let ceiling = ceiling.max(0);
        let mut best = [0; GameId::COUNT];
        for id in GameId::ALL {
            match store.get(id.storage_key()) {
                Some(value) if (0..=ceiling).contains(&value) => best[id.index()] = value as u32,
                Some(value) => {
                    warn!("discarding corrupt {} high score {}", id.title(), value);
                    store.set(id.storage_key(), 0);
                }
                None => {}
            }
        }
        info!("high scores: snake={} pong={}", best[0], best[1]);
        HighScoreTable {
            best,
            ceiling: ceiling as u32,
        }
    }

    pub fn get(&self, id: GameId) -> u32 {
        self.best[id.index()]
    }

    /// Offers a finished game's score. Returns true when it beat the
    /// stored best, in which case it has also been persisted. Scores past
    /// the ceiling are stored as the ceiling so they reload cleanly.
    pub fn record<S: KeyValueStore>(&mut self, store: &mut S, id: GameId, score: u32) -> bool {
        let score = score.min(self.ceiling);
        if score <= self.best[id.index()] {
            return false;
        }
        self.best[id.index()] = score;
        store.set(id.storage_key(), score as i32);
        info!("new {} high score {}", id.title(), score);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    const CEILING: i32 = 99_999;

    #[test]
    fn missing_scores_load_as_zero_without_writes() {
        let mut store = MemoryStore::new();
        let table = HighScoreTable::load(&mut store, CEILING);
        assert_eq!(table.get(GameId::Snake), 0);
        assert_eq!(table.get(GameId::Pong), 0);
        assert_eq!(store.writes().count(), 0);
    }

    #[test]
    fn corrupt_scores_are_sanitised() {
        let mut store = MemoryStore::new();
        store.preload("hs_snake", -4);
        store.preload("hs_pong", 1_000_000);
        let table = HighScoreTable::load(&mut store, CEILING);
        assert_eq!(table.get(GameId::Snake), 0);
        assert_eq!(table.get(GameId::Pong), 0);
        assert_eq!(store.get("hs_snake"), Some(0));
        assert_eq!(store.get("hs_pong"), Some(0));
    }

    #[test]
    fn valid_scores_survive_a_reload() {
        let mut store = MemoryStore::new();
        store.preload("hs_snake", 42);
        store.preload("hs_pong", CEILING);
        let table = HighScoreTable::load(&mut store, CEILING);
        assert_eq!(table.get(GameId::Snake), 42);
        assert_eq!(table.get(GameId::Pong), CEILING as u32);
        assert_eq!(store.writes().count(), 0);
    }

    #[test]
    fn best_is_the_running_maximum() {
        let mut store = MemoryStore::new();
        store.preload("hs_pong", 7);
        let mut table = HighScoreTable::load(&mut store, CEILING);
        let scores = [3, 9, 9, 2, 15, 11, 15, 16];
        let improved = scores
            .iter()
            .filter(|&&s| table.record(&mut store, GameId::Pong, s))
            .count();
        assert_eq!(table.get(GameId::Pong), 16);
        assert_eq!(improved, 3);
        assert_eq!(store.write_count("hs_pong"), 3);
        assert_eq!(store.writes().last(), Some(("hs_pong", 16)));
        assert_eq!(table.get(GameId::Snake), 0);
    }

    #[test]
    fn scores_past_the_ceiling_are_clamped() {
        let mut store = MemoryStore::new();
        let mut table = HighScoreTable::load(&mut store, 100);
        assert!(table.record(&mut store, GameId::Snake, 250));
        assert_eq!(table.get(GameId::Snake), 100);
        assert!(!table.record(&mut store, GameId::Snake, 300));
        assert_eq!(store.get("hs_snake"), Some(100));
    }
}
