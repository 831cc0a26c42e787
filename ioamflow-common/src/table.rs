//! The per-flow counter table seam.
//!
//! The decode path never names a concrete store; it sees lookup and
//! insert-if-absent through [`FlowTable`]. The XDP program backs the trait
//! with a BPF hash map, tests with an in-memory table.

use crate::ProbeKey;

pub trait FlowTable {
    /// Returns the counter slot for `key`, if present.
    fn lookup(&mut self, key: &ProbeKey) -> Option<&mut u64>;

    /// Inserts `key -> count` only if no entry exists yet. Returns false
    /// when the entry could not be created (capacity, or a racing insert
    /// that got there first).
    fn insert_if_absent(&mut self, key: &ProbeKey, count: u64) -> bool;
}

/// Counts one observation of `key`: lookup, insert-if-absent at zero,
/// re-lookup, increment.
///
/// Losing the insert race to a concurrent observer is fine -- the re-lookup
/// picks up whichever entry won. Returns false when the table cannot hold
/// the key; the frame then goes uncounted, an accepted lost update.
pub fn observe<T: FlowTable>(table: &mut T, key: &ProbeKey) -> bool {
    if table.lookup(key).is_none() {
        let _ = table.insert_if_absent(key, 0);
    }
    match table.lookup(key) {
        Some(count) => {
            *count = count.wrapping_add(1);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::vec::Vec;

    use super::*;

    struct FixedTable {
        capacity: usize,
        entries: Vec<(ProbeKey, u64)>,
    }

    impl FixedTable {
        fn with_capacity(capacity: usize) -> Self {
            FixedTable {
                capacity,
                entries: Vec::new(),
            }
        }
    }

    impl FlowTable for FixedTable {
        fn lookup(&mut self, key: &ProbeKey) -> Option<&mut u64> {
            self.entries
                .iter_mut()
                .find(|(k, _)| k == key)
                .map(|(_, count)| count)
        }

        fn insert_if_absent(&mut self, key: &ProbeKey, count: u64) -> bool {
            if self.entries.iter().any(|(k, _)| k == key) {
                return false;
            }
            if self.entries.len() >= self.capacity {
                return false;
            }
            self.entries.push((*key, count));
            true
        }
    }

    fn key_with_tag(tag: u16) -> ProbeKey {
        let mut key = ProbeKey::zeroed();
        key.tag = tag;
        key
    }

    #[test]
    fn first_observation_creates_an_entry_at_one() {
        let mut table = FixedTable::with_capacity(8);
        assert!(observe(&mut table, &key_with_tag(1)));
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].1, 1);
    }

    #[test]
    fn repeat_observations_increment_by_exactly_one() {
        let mut table = FixedTable::with_capacity(8);
        let key = key_with_tag(1);
        for _ in 0..3 {
            assert!(observe(&mut table, &key));
        }
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].1, 3);
    }

    #[test]
    fn distinct_keys_count_separately() {
        let mut table = FixedTable::with_capacity(8);
        observe(&mut table, &key_with_tag(1));
        observe(&mut table, &key_with_tag(2));
        observe(&mut table, &key_with_tag(1));
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].1, 2);
        assert_eq!(table.entries[1].1, 1);
    }

    #[test]
    fn full_table_drops_the_update() {
        let mut table = FixedTable::with_capacity(1);
        assert!(observe(&mut table, &key_with_tag(1)));

        // a new key no longer fits; the old entry is left alone
        assert!(!observe(&mut table, &key_with_tag(2)));
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].1, 1);

        // the existing key still counts
        assert!(observe(&mut table, &key_with_tag(1)));
        assert_eq!(table.entries[0].1, 2);
    }

    #[test]
    fn counter_wraps_instead_of_overflowing() {
        let mut table = FixedTable::with_capacity(1);
        let key = key_with_tag(1);
        table.entries.push((key, u64::MAX));
        assert!(observe(&mut table, &key));
        assert_eq!(table.entries[0].1, 0);
    }
}
