//! Slot states of the open-addressing array.

use crate::chain::ValueChain;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum Slot {
    /// Never used since the last initialize.
    #[default]
    Free,
    /// Holds a key and a non-empty chain.
    Occupied { key: Box<str>, chain: ValueChain },
    /// Tombstone: skipped by lookups, never ends a probe walk.
    Removed,
}

impl Slot {
    pub(crate) fn state(&self) -> SlotState {
        match self {
            Slot::Free => SlotState::Free,
            Slot::Occupied { .. } => SlotState::Occupied,
            Slot::Removed => SlotState::Removed,
        }
    }

    pub(crate) fn holds(&self, q: &str) -> bool {
        matches!(self, Slot::Occupied { key, .. } if &**key == q)
    }
}

/// Public state tag of a slot, for introspection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SlotState {
    Free,
    Occupied,
    Removed,
}
