#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect slot
// states alongside the public surface.

use crate::error::TableError;
use crate::record::ValueRecord;
use crate::slot::SlotState;
use crate::table::{PlacementKind, Table, TableConfig, TombstonePolicy};
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;

// Pool-indexed operations so shrinking moves toward earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, u16),
    Search(usize),
    Remove(usize),
    Contains(String),
    Iterate,
}

fn arb_scenario(pool_max: usize) -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z0-9]{1,4}", 1..=pool_max).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<u16>()).prop_map(|(i, p)| Op::Insert(i, p)),
            2 => idx.clone().prop_map(Op::Search),
            1 => idx.clone().prop_map(Op::Remove),
            1 => "[a-z0-9]{1,4}".prop_map(Op::Contains),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn record(key: &str, p: u16) -> ValueRecord {
    ValueRecord::new(key, f32::from(p) / 100.0)
}

// State-machine equivalence against a HashMap of head-first record lists.
// Invariants exercised across random operation sequences:
// - search returns exactly the model's records, most recent first.
// - A key occupies at most one slot; len() counts distinct keys.
// - TableFull happens only when no reachable slot is left for a new key,
//   and leaves every slot unchanged.
// - Removed keys are not found while other keys stay reachable through
//   their tombstones.
// - Slot state counts agree with len() and tombstones().
fn run(config: TableConfig, pool: Vec<String>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let policy = config.tombstone_policy();
    let mut sut = Table::with_config(config).expect("valid config");
    let m = sut.capacity();
    let mut model: HashMap<String, Vec<ValueRecord>> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(i, p) => {
                let k = &pool[i];
                let v = record(k, p);
                let existed = model.contains_key(k);
                let (len, tombs) = (sut.len(), sut.tombstones());
                let before: Vec<_> = (0..m).map(|j| sut.slot_state(j)).collect();
                match sut.insert(k, v.clone()) {
                    Ok(placed) => {
                        prop_assert_eq!(placed.kind == PlacementKind::Chained, existed);
                        if placed.kind == PlacementKind::ReusedTombstone {
                            prop_assert_eq!(policy, TombstonePolicy::ReuseFirstRemoved);
                        }
                        prop_assert!(placed.attempts < m);
                        prop_assert_eq!(sut.slot_state(placed.index), Some(SlotState::Occupied));
                        model.entry(k.clone()).or_default().insert(0, v);
                    }
                    Err(TableError::TableFull { capacity }) => {
                        prop_assert_eq!(capacity, m);
                        prop_assert!(!existed, "existing keys always chain");
                        match policy {
                            TombstonePolicy::SkipTombstones => prop_assert_eq!(len + tombs, m),
                            TombstonePolicy::ReuseFirstRemoved => prop_assert_eq!(len, m),
                        }
                        let after: Vec<_> = (0..m).map(|j| sut.slot_state(j)).collect();
                        prop_assert_eq!(before, after);
                    }
                    Err(e) => prop_assert!(false, "unexpected error: {}", e),
                }
            }
            Op::Search(i) => {
                let k = &pool[i];
                let got = sut.search(k).map(|c| c.to_vec());
                prop_assert_eq!(got.as_ref(), model.get(k));
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove(k).expect("live table");
                prop_assert_eq!(got, model.remove(k));
                prop_assert!(sut.search(k).is_none());
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            Op::Iterate => {
                let keys: Vec<&str> = sut.keys().collect();
                let unique: BTreeSet<&str> = keys.iter().copied().collect();
                prop_assert_eq!(keys.len(), unique.len(), "a key occupies one slot");
                let expected: BTreeSet<&str> = model.keys().map(String::as_str).collect();
                prop_assert_eq!(unique, expected);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        let occupied = (0..m)
            .filter(|&j| sut.slot_state(j) == Some(SlotState::Occupied))
            .count();
        let removed = (0..m)
            .filter(|&j| sut.slot_state(j) == Some(SlotState::Removed))
            .count();
        prop_assert_eq!(occupied, sut.len());
        prop_assert_eq!(removed, sut.tombstones());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine_default_table((pool, ops) in arb_scenario(12)) {
        run(TableConfig::new(), pool, ops)?;
    }

    // Eleven slots and up to sixteen keys: collisions, tombstones and
    // fullness all happen routinely.
    #[test]
    fn prop_state_machine_tiny_skip((pool, ops) in arb_scenario(16)) {
        let cfg = TableConfig::new()
            .with_capacity(11)
            .with_tombstone_policy(TombstonePolicy::SkipTombstones);
        run(cfg, pool, ops)?;
    }

    #[test]
    fn prop_state_machine_tiny_reuse((pool, ops) in arb_scenario(16)) {
        let cfg = TableConfig::new()
            .with_capacity(11)
            .with_tombstone_policy(TombstonePolicy::ReuseFirstRemoved);
        run(cfg, pool, ops)?;
    }
}
