//! Sequence diffing.

/// The common/inserted/deleted partition between two ordered sequences.
///
/// Membership is decided by value equality (identity, for id-keyed
/// wrappers), *not* by position: an element that merely moved is reported
/// as common with its index in `left`, never as a delete/insert pair, and a
/// pure reordering has no updates at all. The reconciler consequently does
/// not reorder rows whose identity persisted but whose position changed.
///
/// Inputs must be free of duplicates (by equality). Callers de-duplicate
/// upstream; for violated inputs the first-match index lookup silently
/// collapses duplicates onto the first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff<T> {
    /// Elements present in both sequences, with their index in `left`,
    /// preserving `left`'s order.
    pub common: Vec<(usize, T)>,
    /// Elements only in `right`, with their index in `right`, preserving
    /// `right`'s order.
    pub inserted: Vec<(usize, T)>,
    /// Elements only in `left`, with their index in `left`, preserving
    /// `left`'s order.
    pub deleted: Vec<(usize, T)>,
}

fn first_index<T: PartialEq>(slice: &[T], item: &T) -> usize {
    slice.iter().position(|other| other == item).unwrap()
}

impl<T: PartialEq + Clone> Diff<T> {
    pub fn new(left: &[T], right: &[T]) -> Diff<T> {
        let common = left
            .iter()
            .filter(|item| right.contains(item))
            .map(|item| (first_index(left, item), item.clone()))
            .collect();
        let inserted = right
            .iter()
            .filter(|item| !left.contains(item))
            .map(|item| (first_index(right, item), item.clone()))
            .collect();
        let deleted = left
            .iter()
            .filter(|item| !right.contains(item))
            .map(|item| (first_index(left, item), item.clone()))
            .collect();
        Diff {
            common,
            inserted,
            deleted,
        }
    }

    /// True iff anything was inserted or deleted. A pure reordering
    /// reports no updates.
    pub fn has_updates(&self) -> bool {
        !self.deleted.is_empty() || !self.inserted.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn abc_to_acd() {
        let diff = Diff::new(&['a', 'b', 'c'], &['a', 'c', 'd']);
        assert_eq!(diff.common, vec![(0, 'a'), (2, 'c')]);
        assert_eq!(diff.deleted, vec![(1, 'b')]);
        assert_eq!(diff.inserted, vec![(2, 'd')]);
        assert!(diff.has_updates());
    }

    #[test]
    fn identical_sequences_have_no_updates() {
        let diff = Diff::new(&[1, 2, 3], &[1, 2, 3]);
        assert!(!diff.has_updates());
        assert_eq!(diff.common.len(), 3);
    }

    #[test]
    fn pure_reorder_is_reported_as_common() {
        let diff = Diff::new(&[1, 2, 3], &[3, 1, 2]);
        assert!(!diff.has_updates());
        // Common indices refer to `left`.
        assert_eq!(diff.common, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn disjoint_sequences() {
        let diff = Diff::new(&[1, 2], &[3, 4]);
        assert_eq!(diff.common, vec![]);
        assert_eq!(diff.deleted, vec![(0, 1), (1, 2)]);
        assert_eq!(diff.inserted, vec![(0, 3), (1, 4)]);
    }

    #[test]
    fn empty_left() {
        let diff = Diff::new(&[], &[1, 2]);
        assert_eq!(diff.inserted, vec![(0, 1), (1, 2)]);
        assert!(diff.deleted.is_empty());
    }

    #[test]
    fn empty_right() {
        let diff = Diff::new(&[1, 2], &[]);
        assert_eq!(diff.deleted, vec![(0, 1), (1, 2)]);
        assert!(diff.inserted.is_empty());
    }

    fn unique(values: Vec<u16>) -> Vec<u16> {
        let mut seen = std::collections::HashSet::new();
        values.into_iter().filter(|v| seen.insert(*v)).collect()
    }

    proptest! {
        #[test]
        fn counts_partition_both_sides(
            left in prop::collection::vec(0u16..64, 0..16),
            right in prop::collection::vec(0u16..64, 0..16),
        ) {
            let left = unique(left);
            let right = unique(right);
            let diff = Diff::new(&left, &right);

            prop_assert_eq!(diff.common.len() + diff.deleted.len(), left.len());
            prop_assert_eq!(diff.common.len() + diff.inserted.len(), right.len());
        }

        #[test]
        fn self_diff_is_empty(values in prop::collection::vec(0u16..64, 0..16)) {
            let values = unique(values);
            let diff = Diff::new(&values, &values);
            prop_assert!(!diff.has_updates());
            prop_assert_eq!(diff.common.len(), values.len());
        }

        #[test]
        fn replay_reproduces_right_multiset(
            left in prop::collection::vec(0u16..64, 0..16),
            right in prop::collection::vec(0u16..64, 0..16),
        ) {
            let left = unique(left);
            let right = unique(right);
            let diff = Diff::new(&left, &right);

            // Delete-then-insert over the left multiset must reproduce the
            // right multiset exactly.
            let mut result: Vec<u16> = left.clone();
            for (_, item) in &diff.deleted {
                let pos = result.iter().position(|v| v == item).unwrap();
                result.remove(pos);
            }
            for (_, item) in &diff.inserted {
                result.push(*item);
            }

            let mut result_sorted = result;
            result_sorted.sort_unstable();
            let mut right_sorted = right;
            right_sorted.sort_unstable();
            prop_assert_eq!(result_sorted, right_sorted);

            // Surviving items keep their relative left order.
            let common_values: Vec<u16> = diff.common.iter().map(|(_, v)| *v).collect();
            let left_filtered: Vec<u16> = left
                .iter()
                .copied()
                .filter(|v| common_values.contains(v))
                .collect();
            prop_assert_eq!(common_values, left_filtered);
        }
    }
}
