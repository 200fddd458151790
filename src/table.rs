//! Table: fixed-capacity open addressing with double hashing, tombstones
//! and per-key value chains.

use crate::chain::{Chain, ValueChain};
use crate::error::{Result, TableError};
use crate::probe::ProbeSeq;
use crate::record::ValueRecord;
use crate::slot::{Slot, SlotState};
use log::{debug, info, warn};

/// First prime after 1200.
pub const DEFAULT_CAPACITY: usize = 1201;

/// What insert does with tombstones met on the way to a free slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TombstonePolicy {
    /// Tombstones are skipped and never reclaimed; new keys land on the
    /// first `Free` slot of their sequence.
    #[default]
    SkipTombstones,
    /// Once the key is known to be absent, land on the first tombstone of
    /// its sequence if there was one.
    ReuseFirstRemoved,
}

/// Construction parameters for [`Table`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    capacity: usize,
    tombstone_policy: TombstonePolicy,
}

impl TableConfig {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            tombstone_policy: TombstonePolicy::default(),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_tombstone_policy(mut self, policy: TombstonePolicy) -> Self {
        self.tombstone_policy = policy;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn tombstone_policy(&self) -> TombstonePolicy {
        self.tombstone_policy
    }

    /// Reject capacities the step function cannot serve. A composite
    /// capacity is accepted with a warning: some probe sequences will then
    /// cycle through only part of the table.
    pub fn validate(&self) -> Result<()> {
        if self.capacity < 2 {
            return Err(TableError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if !is_prime(self.capacity) {
            warn!(
                "capacity {} is not prime; probe sequences may not cover the table",
                self.capacity
            );
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Lifecycle {
    Live,
    Released,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PlacementKind {
    /// The key was new and took a `Free` slot.
    NewKey,
    /// The key was new and took a tombstone.
    ReusedTombstone,
    /// The key existed; its chain grew by one.
    Chained,
}

/// Outcome of a successful insert.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Placement {
    /// Probe attempt that settled the insert; 0 means no collision.
    pub attempts: usize,
    /// Slot index holding the key.
    pub index: usize,
    pub kind: PlacementKind,
}

/// Counts returned by [`Table::release`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReleaseStats {
    pub keys: usize,
    pub records: usize,
}

/// Fixed-capacity map from string keys to chains of [`ValueRecord`]s.
///
/// The slot array is allocated once and never resized. Each occupied slot
/// owns its key and its chain; dropping the table frees all of them.
#[derive(Debug)]
pub struct Table {
    slots: Box<[Slot]>,
    config: TableConfig,
    len: usize,
    tombstones: usize,
    lifecycle: Lifecycle,
}

impl Table {
    /// An initialized table of [`DEFAULT_CAPACITY`] slots.
    pub fn new() -> Self {
        let config = TableConfig::new();
        let slots = (0..config.capacity).map(|_| Slot::Free).collect();
        Self::with_slots(config, slots)
    }

    /// A table built from `config`. Fails on an invalid capacity, or with
    /// [`TableError::Allocation`] when the slot array cannot be reserved.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Self::from_valid_config(config)
    }

    pub(crate) fn from_valid_config(config: TableConfig) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(config.capacity)?;
        slots.resize_with(config.capacity, || Slot::Free);
        Ok(Self::with_slots(config, slots.into_boxed_slice()))
    }

    fn with_slots(config: TableConfig, slots: Box<[Slot]>) -> Self {
        Self {
            slots,
            config,
            len: 0,
            tombstones: 0,
            lifecycle: Lifecycle::Live,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots (distinct keys).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn slot_state(&self, index: usize) -> Option<SlotState> {
        self.slots.get(index).map(Slot::state)
    }

    /// Reset every slot to `Free` and make the table live again. Anything
    /// still stored is dropped.
    pub fn initialize(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::Free;
        }
        self.len = 0;
        self.tombstones = 0;
        self.lifecycle = Lifecycle::Live;
        info!("table initialized with {} slots", self.slots.len());
    }

    /// File `value` under `key`.
    ///
    /// An existing key gets `value` pushed on the head of its chain. A new
    /// key takes the first `Free` slot of its probe sequence, or the first
    /// tombstone under [`TombstonePolicy::ReuseFirstRemoved`]. Nothing is
    /// modified when an error is returned.
    pub fn insert(&mut self, key: &str, value: ValueRecord) -> Result<Placement> {
        self.ensure_live()?;
        if key.is_empty() {
            return Err(TableError::EmptyKey);
        }
        let m = self.slots.len();
        let mut first_removed: Option<(usize, usize)> = None;
        let mut first_free: Option<(usize, usize)> = None;

        for (attempt, idx) in ProbeSeq::new(key, m) {
            match &mut self.slots[idx] {
                Slot::Occupied { key: k, chain } if &**k == key => {
                    chain.try_push_head(value)?;
                    debug!("chained record under {key:?} at slot {idx} (attempt {attempt})");
                    return Ok(Placement {
                        attempts: attempt,
                        index: idx,
                        kind: PlacementKind::Chained,
                    });
                }
                Slot::Occupied { .. } => {}
                Slot::Free => {
                    first_free = Some((attempt, idx));
                    break;
                }
                Slot::Removed => {
                    if first_removed.is_none() {
                        first_removed = Some((attempt, idx));
                    }
                }
            }
        }

        let ((attempt, idx), kind) = match (self.config.tombstone_policy, first_removed, first_free)
        {
            (TombstonePolicy::ReuseFirstRemoved, Some(at), _) => {
                (at, PlacementKind::ReusedTombstone)
            }
            (_, _, Some(at)) => (at, PlacementKind::NewKey),
            _ => {
                warn!("table full: key {key:?} cannot be inserted");
                return Err(TableError::TableFull { capacity: m });
            }
        };

        let slot = Slot::Occupied {
            key: copy_key(key)?,
            chain: ValueChain::try_with_head(value)?,
        };
        self.slots[idx] = slot;
        if kind == PlacementKind::ReusedTombstone {
            self.tombstones -= 1;
        }
        self.len += 1;
        debug!("placed {key:?} at slot {idx} after {attempt} collisions");
        Ok(Placement {
            attempts: attempt,
            index: idx,
            kind,
        })
    }

    /// Records under `key`, most recent first. `None` when the key is not
    /// stored, including on a released table.
    pub fn search(&self, key: &str) -> Option<Chain<'_>> {
        let idx = self.find_index(key)?;
        match &self.slots[idx] {
            Slot::Occupied { chain, .. } => Some(chain.view()),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_index(key).is_some()
    }

    fn find_index(&self, key: &str) -> Option<usize> {
        if self.lifecycle == Lifecycle::Released {
            return None;
        }
        for (_, idx) in ProbeSeq::new(key, self.slots.len()) {
            let slot = &self.slots[idx];
            match slot.state() {
                SlotState::Free => return None,
                SlotState::Occupied if slot.holds(key) => return Some(idx),
                SlotState::Occupied | SlotState::Removed => {}
            }
        }
        None
    }

    /// Delete `key`, leaving a tombstone so other keys' probe walks still
    /// pass through. Returns its records, most recent first.
    pub fn remove(&mut self, key: &str) -> Result<Option<Vec<ValueRecord>>> {
        self.ensure_live()?;
        let Some(idx) = self.find_index(key) else {
            return Ok(None);
        };
        match std::mem::replace(&mut self.slots[idx], Slot::Removed) {
            Slot::Occupied { chain, .. } => {
                self.len -= 1;
                self.tombstones += 1;
                debug!("removed {key:?} from slot {idx}");
                Ok(Some(chain.into_records()))
            }
            other => {
                // find_index only yields occupied slots
                self.slots[idx] = other;
                Ok(None)
            }
        }
    }

    /// Drop every key and chain. The table refuses further inserts and
    /// removals until [`Table::initialize`] runs; a second release is an
    /// error.
    pub fn release(&mut self) -> Result<ReleaseStats> {
        if self.lifecycle == Lifecycle::Released {
            return Err(TableError::DoubleRelease);
        }
        let mut stats = ReleaseStats::default();
        for slot in self.slots.iter_mut() {
            if let Slot::Occupied { chain, .. } = std::mem::take(slot) {
                stats.keys += 1;
                stats.records += chain.len();
            }
        }
        self.len = 0;
        self.tombstones = 0;
        self.lifecycle = Lifecycle::Released;
        info!(
            "table released: {} keys, {} records",
            stats.keys, stats.records
        );
        Ok(stats)
    }

    /// Occupied entries in slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(k, _)| k)
    }

    fn ensure_live(&self) -> Result<()> {
        match self.lifecycle {
            Lifecycle::Live => Ok(()),
            Lifecycle::Released => Err(TableError::Released),
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

fn copy_key(key: &str) -> Result<Box<str>> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}

/// Iterator over occupied entries of a [`Table`].
pub struct Iter<'a> {
    it: core::slice::Iter<'a, Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, Chain<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied { key, chain } = slot {
                return Some((&**key, chain.view()));
            }
        }
        None
    }
}
