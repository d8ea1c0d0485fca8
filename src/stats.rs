use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::KeyBindings;

/// Aggregated decision statistics, serialized under the `stats` key of the
/// tournament snapshot. Selection counts are keyed by the input key label
/// so the collaborator can show which buttons carried the session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_decision_time: f64,
    #[serde(default)]
    pub num_decisions: u64,
    #[serde(default)]
    pub num_undos: u64,
    #[serde(default)]
    pub selection_counts: BTreeMap<String, u64>,
}

impl Stats {
    /// Fresh counters with every recognized option key present at zero.
    pub fn new(keys: &KeyBindings) -> Self {
        let mut selection_counts = BTreeMap::new();
        for label in keys.option_labels() {
            selection_counts.insert(label, 0);
        }
        Stats {
            selection_counts,
            ..Stats::default()
        }
    }

    pub fn record_decision(&mut self, elapsed_secs: f64, key: Option<char>) {
        self.total_decision_time += elapsed_secs;
        self.num_decisions += 1;
        if let Some(key) = key {
            *self.selection_counts.entry(key.to_string()).or_insert(0) += 1;
        }
    }

    pub fn record_undo(&mut self) {
        self.num_undos += 1;
    }

    pub fn average_decision_time(&self) -> f64 {
        if self.num_decisions == 0 {
            return 0.0;
        }
        self.total_decision_time / self.num_decisions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroes_every_option_key() {
        let stats = Stats::new(&KeyBindings::default());
        assert_eq!(stats.selection_counts.len(), 4);
        for key in ["d", "f", "j", "k"] {
            assert_eq!(stats.selection_counts.get(key), Some(&0));
        }
        assert_eq!(stats.num_decisions, 0);
    }

    #[test]
    fn test_record_decision_accumulates() {
        let mut stats = Stats::new(&KeyBindings::default());
        stats.record_decision(1.5, Some('d'));
        stats.record_decision(0.5, Some('f'));
        stats.record_decision(2.0, Some('d'));
        assert_eq!(stats.num_decisions, 3);
        assert!((stats.total_decision_time - 4.0).abs() < f64::EPSILON);
        assert_eq!(stats.selection_counts.get("d"), Some(&2));
        assert_eq!(stats.selection_counts.get("f"), Some(&1));
        assert!((stats.average_decision_time() - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_undo() {
        let mut stats = Stats::new(&KeyBindings::default());
        stats.record_undo();
        stats.record_undo();
        assert_eq!(stats.num_undos, 2);
        assert_eq!(stats.num_decisions, 0);
    }

    #[test]
    fn test_stats_serde_field_names() {
        let stats = Stats::new(&KeyBindings::default());
        let value = serde_json::to_value(&stats).unwrap();
        for key in [
            "total_decision_time",
            "num_decisions",
            "num_undos",
            "selection_counts",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
