// tests/diff_properties.rs
use index_watch::{IndexDiff, IndexId, MembershipSnapshot};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn symbols() -> impl Strategy<Value = BTreeSet<String>> {
    btree_set("[A-Z]{1,4}(\\.[A-Z])?", 0..40)
}

proptest! {
    #[test]
    fn added_and_removed_partition_the_change(prev in symbols(), curr in symbols()) {
        let d = IndexDiff::compute(&prev, &curr);

        prop_assert!(d.added.is_disjoint(&d.removed));
        prop_assert!(d.added.is_disjoint(&prev));
        prop_assert!(d.removed.is_subset(&prev));

        let kept: BTreeSet<String> = prev.difference(&d.removed).cloned().collect();
        let rebuilt: BTreeSet<String> = kept.union(&d.added).cloned().collect();
        prop_assert_eq!(rebuilt, curr.clone());
        prop_assert_eq!(d.changed(), prev != curr);
    }

    #[test]
    fn identical_sets_report_no_change(s in symbols()) {
        let d = IndexDiff::compute(&s, &s);
        prop_assert!(!d.changed());
        prop_assert!(d.added.is_empty() && d.removed.is_empty());
    }

    #[test]
    fn snapshot_json_keeps_membership(
        sp in symbols(),
        ndx in symbols(),
        links in vec("https://example\\.test/[a-z0-9]{1,12}", 0..20),
    ) {
        let mut snap = MembershipSnapshot::default();
        snap.set_members(IndexId::Sp500, sp.clone());
        snap.set_members(IndexId::Nasdaq100, ndx.clone());
        snap.record_links(links, 500);

        let json = serde_json::to_string(&snap).unwrap();
        let back: MembershipSnapshot = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.members(IndexId::Sp500), &sp);
        prop_assert_eq!(back.members(IndexId::Nasdaq100), &ndx);
        prop_assert_eq!(back, snap);
    }
}
