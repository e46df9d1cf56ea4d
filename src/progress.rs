//! Level unlocks and best times
//!
//! Process-lifetime only: a fresh run starts with level 1 unlocked.

use serde::{Deserialize, Serialize};

/// Best completion for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    pub level: u32,
    /// Seconds of simulated play
    pub best_secs: f32,
    pub completions: u32,
}

/// Which levels can be played, and how fast each was cleared
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelProgress {
    level_count: u32,
    highest_unlocked: u32,
    records: Vec<LevelRecord>,
}

impl LevelProgress {
    /// Only level 1 unlocked
    pub fn new(level_count: u32) -> Self {
        Self {
            level_count: level_count.max(1),
            highest_unlocked: 1,
            records: Vec::new(),
        }
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    /// Whether `level` names one of the playable levels
    pub fn is_valid_level(&self, level: u32) -> bool {
        (1..=self.level_count).contains(&level)
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.highest_unlocked
    }

    /// Unlock `level` (and everything before it). Out-of-range ids are ignored.
    pub fn unlock(&mut self, level: u32) {
        if self.is_valid_level(level) && level > self.highest_unlocked {
            self.highest_unlocked = level;
            log::info!("Level {} unlocked", level);
        }
    }

    /// Record a win. Unlocks the next level; returns true on a new best time.
    pub fn record_completion(&mut self, level: u32, secs: f32) -> bool {
        self.unlock(level.saturating_add(1));

        match self.records.iter_mut().find(|r| r.level == level) {
            Some(record) => {
                record.completions += 1;
                if secs < record.best_secs {
                    record.best_secs = secs;
                    true
                } else {
                    false
                }
            }
            None => {
                // Keep sorted by level
                let pos = self
                    .records
                    .iter()
                    .position(|r| r.level > level)
                    .unwrap_or(self.records.len());
                self.records.insert(
                    pos,
                    LevelRecord {
                        level,
                        best_secs: secs,
                        completions: 1,
                    },
                );
                true
            }
        }
    }

    pub fn best_time(&self, level: u32) -> Option<f32> {
        self.records
            .iter()
            .find(|r| r.level == level)
            .map(|r| r.best_secs)
    }

    pub fn records(&self) -> &[LevelRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_level_unlocked_initially() {
        let p = LevelProgress::new(6);
        assert!(p.is_unlocked(1));
        assert!(!p.is_unlocked(2));
        assert!(!p.is_unlocked(0));
    }

    #[test]
    fn test_completion_unlocks_next() {
        let mut p = LevelProgress::new(6);
        assert!(p.record_completion(1, 12.0));
        assert!(p.is_unlocked(2));
        assert!(!p.is_unlocked(3));
    }

    #[test]
    fn test_last_level_does_not_unlock_past_end() {
        let mut p = LevelProgress::new(2);
        p.record_completion(1, 5.0);
        p.record_completion(2, 5.0);
        assert!(p.is_unlocked(2));
        assert!(!p.is_unlocked(3));
    }

    #[test]
    fn test_best_time_tracking() {
        let mut p = LevelProgress::new(6);
        assert!(p.record_completion(3, 20.0));
        assert!(!p.record_completion(3, 25.0));
        assert!(p.record_completion(3, 18.5));
        assert!(p.record_completion(1, 9.0));
        assert_eq!(p.best_time(3), Some(18.5));
        assert_eq!(p.best_time(2), None);
        assert_eq!(p.records()[0].level, 1);
        assert_eq!(p.records()[1].completions, 3);
    }

    #[test]
    fn test_valid_level_range() {
        let p = LevelProgress::new(6);
        assert_eq!(p.level_count(), 6);
        assert!(p.is_valid_level(1));
        assert!(p.is_valid_level(6));
        assert!(!p.is_valid_level(0));
        assert!(!p.is_valid_level(7));
        assert_eq!(LevelProgress::new(0).level_count(), 1);
    }
}
