//! Set difference between two membership snapshots of one index.

use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl IndexDiff {
    /// `added = current - previous`, `removed = previous - current`.
    pub fn compute(previous: &BTreeSet<String>, current: &BTreeSet<String>) -> Self {
        Self {
            added: current.difference(previous).cloned().collect(),
            removed: previous.difference(current).cloned().collect(),
        }
    }

    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn added_and_removed_are_reported() {
        let prev = set(&["AAPL", "MSFT", "XOM"]);
        let curr = set(&["AAPL", "MSFT", "PLTR"]);
        let d = IndexDiff::compute(&prev, &curr);
        assert!(d.changed());
        assert_eq!(d.added, set(&["PLTR"]));
        assert_eq!(d.removed, set(&["XOM"]));
    }

    #[test]
    fn identical_sets_are_unchanged() {
        let s = set(&["AAPL", "MSFT"]);
        let d = IndexDiff::compute(&s, &s);
        assert!(!d.changed());
        // second comparison with the same input stays quiet
        assert_eq!(IndexDiff::compute(&s, &s), d);
    }

    #[test]
    fn partition_reconstructs_current() {
        let prev = set(&["A", "B", "C", "D"]);
        let curr = set(&["C", "D", "E", "F", "G"]);
        let d = IndexDiff::compute(&prev, &curr);

        assert!(d.added.is_disjoint(&d.removed));
        let kept: BTreeSet<String> = prev.intersection(&curr).cloned().collect();
        let rebuilt: BTreeSet<String> = kept.union(&d.added).cloned().collect();
        assert_eq!(rebuilt, curr);
    }

    #[test]
    fn sorted_output_for_display() {
        let prev = set(&[]);
        let curr = set(&["ZS", "ABNB", "MDB"]);
        let d = IndexDiff::compute(&prev, &curr);
        let order: Vec<&str> = d.added.iter().map(String::as_str).collect();
        assert_eq!(order, vec!["ABNB", "MDB", "ZS"]);
    }
}
