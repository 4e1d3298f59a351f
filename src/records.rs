//! Per-level results and the end-of-run summary

use serde::{Deserialize, Serialize};

use crate::percent;

/// Outcome of one completed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// Level number (1-indexed)
    pub level: u32,
    /// Targets popped
    pub killed: u32,
    /// Targets that left through the top
    pub escaped: u32,
    /// killed / (killed + escaped), as a whole percentage
    pub efficiency_pct: u32,
    /// Running time spent on the level (seconds, pauses excluded)
    pub elapsed_sec: f64,
}

impl LevelRecord {
    pub fn new(level: u32, killed: u32, escaped: u32, elapsed_sec: f64) -> Self {
        Self {
            level,
            killed,
            escaped,
            efficiency_pct: percent(killed, killed + escaped),
            elapsed_sec,
        }
    }
}

/// Aggregate over every completed level of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunSummary {
    pub levels: Vec<LevelRecord>,
    pub total_killed: u32,
    pub total_escaped: u32,
    pub efficiency_pct: u32,
    pub elapsed_sec: f64,
}

impl RunSummary {
    pub fn from_records(records: &[LevelRecord]) -> Self {
        let total_killed = records.iter().map(|r| r.killed).sum();
        let total_escaped = records.iter().map(|r| r.escaped).sum();
        Self {
            levels: records.to_vec(),
            total_killed,
            total_escaped,
            efficiency_pct: percent(total_killed, total_killed + total_escaped),
            elapsed_sec: records.iter().map(|r| r.elapsed_sec).sum(),
        }
    }

    /// Best single-level efficiency, if any level finished
    pub fn best_level(&self) -> Option<&LevelRecord> {
        self.levels
            .iter()
            .max_by_key(|r| (r.efficiency_pct, std::cmp::Reverse(r.level)))
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_efficiency() {
        assert_eq!(LevelRecord::new(1, 7, 3, 12.0).efficiency_pct, 70);
        assert_eq!(LevelRecord::new(1, 0, 10, 12.0).efficiency_pct, 0);
        assert_eq!(LevelRecord::new(1, 2, 1, 12.0).efficiency_pct, 67);
        assert_eq!(LevelRecord::new(1, 0, 0, 0.0).efficiency_pct, 0);
    }

    #[test]
    fn test_summary_aggregates() {
        let records = vec![
            LevelRecord::new(1, 10, 0, 8.5),
            LevelRecord::new(2, 6, 4, 9.0),
            LevelRecord::new(3, 4, 6, 7.5),
        ];
        let summary = RunSummary::from_records(&records);

        assert_eq!(summary.total_killed, 20);
        assert_eq!(summary.total_escaped, 10);
        assert_eq!(summary.efficiency_pct, 67);
        assert!((summary.elapsed_sec - 25.0).abs() < 1e-9);
        assert_eq!(summary.levels.len(), 3);
        assert_eq!(summary.best_level().map(|r| r.level), Some(1));
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::from_records(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.efficiency_pct, 0);
        assert!(summary.best_level().is_none());
    }

    #[test]
    fn test_summary_json_roundtrip_fields() {
        let summary = RunSummary::from_records(&[LevelRecord::new(1, 3, 7, 4.0)]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total_killed"], 3);
        assert_eq!(json["levels"][0]["efficiency_pct"], 30);
    }
}
