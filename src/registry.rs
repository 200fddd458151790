//! Registry: owns independent tables behind generational handles and
//! exposes the four host-facing entry points (initialize, add, search,
//! release) without any process-wide state.

use crate::chain::Chain;
use crate::error::{Result, TableError};
use crate::record::ValueRecord;
use crate::table::{Placement, ReleaseStats, Table, TableConfig};
use hashbrown::HashSet;
use log::{info, warn};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct TableKey;
}

/// Handle to a table owned by a [`Registry`].
///
/// Handles are generational: once the table is released the handle stays
/// dead even if its storage is reused for a later table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TableHandle(TableKey);

impl TableHandle {
    pub fn table<'a>(&self, registry: &'a Registry) -> Option<&'a Table> {
        registry.tables.get(self.0)
    }

    pub fn table_mut<'a>(&self, registry: &'a mut Registry) -> Option<&'a mut Table> {
        registry.tables.get_mut(self.0)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    config: TableConfig,
    tables: SlotMap<TableKey, Table>,
    // Every handle released through this registry, all generations kept,
    // so a second release can be told apart from a foreign handle.
    released: HashSet<TableKey>,
}

impl Registry {
    /// A registry whose tables use the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose tables all use `config`.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tables: SlotMap::with_key(),
            released: HashSet::new(),
        })
    }

    /// Number of live tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Create an all-free table and return its handle.
    pub fn initialize(&mut self) -> Result<TableHandle> {
        let table = Table::from_valid_config(self.config.clone())?;
        let key = self.tables.insert(table);
        info!("registry: table {:?} initialized", key);
        Ok(TableHandle(key))
    }

    /// Build a record from `name` and `price` (name truncated to the record
    /// bound) and file it under `key`.
    pub fn add_product(
        &mut self,
        handle: TableHandle,
        key: &str,
        name: &str,
        price: f32,
    ) -> Result<Placement> {
        let record = ValueRecord::try_new(name, price)?;
        let table = self.live_mut(handle)?;
        table.insert(key, record).map_err(|e| {
            warn!("registry: could not add {name:?} under {key:?}: {e}");
            e
        })
    }

    /// Records under `key`, most recent first; `Ok(None)` when absent.
    pub fn search(&self, handle: TableHandle, key: &str) -> Result<Option<Chain<'_>>> {
        Ok(self.live(handle)?.search(key))
    }

    /// Drop the table and everything it owns. The handle is dead afterwards;
    /// releasing it again yields [`TableError::DoubleRelease`].
    pub fn release(&mut self, handle: TableHandle) -> Result<ReleaseStats> {
        let Some(mut table) = self.tables.remove(handle.0) else {
            return Err(self.dead_handle_error(handle));
        };
        self.released.insert(handle.0);
        let stats = table.release()?;
        info!(
            "registry: table {:?} released ({} keys, {} records)",
            handle.0, stats.keys, stats.records
        );
        Ok(stats)
    }

    fn live(&self, handle: TableHandle) -> Result<&Table> {
        self.tables
            .get(handle.0)
            .ok_or_else(|| self.dead_handle_error(handle))
    }

    fn live_mut(&mut self, handle: TableHandle) -> Result<&mut Table> {
        let err = self.dead_handle_error(handle);
        self.tables.get_mut(handle.0).ok_or(err)
    }

    fn dead_handle_error(&self, handle: TableHandle) -> TableError {
        if self.released.contains(&handle.0) {
            TableError::DoubleRelease
        } else {
            TableError::UnknownTable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_independent() {
        let mut reg = Registry::new();
        let a = reg.initialize().unwrap();
        let b = reg.initialize().unwrap();
        assert_ne!(a, b);
        reg.add_product(a, "maca", "Maca Gala (kg)", 9.5).unwrap();
        assert!(reg.search(a, "maca").unwrap().is_some());
        assert!(reg.search(b, "maca").unwrap().is_none());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn released_handle_stays_dead_after_slot_reuse() {
        let mut reg = Registry::new();
        let old = reg.initialize().unwrap();
        reg.add_product(old, "uva", "Uva Niagara (kg)", 11.0).unwrap();
        let stats = reg.release(old).unwrap();
        assert_eq!(stats.records, 1);

        // Likely reuses the freed slot with a bumped generation.
        let new = reg.initialize().unwrap();
        assert_ne!(old, new);
        assert!(old.table(&reg).is_none());
        assert!(matches!(reg.release(old), Err(TableError::DoubleRelease)));
        assert!(matches!(reg.search(old, "uva"), Err(TableError::DoubleRelease)));
        assert!(matches!(
            reg.add_product(old, "uva", "x", 1.0),
            Err(TableError::DoubleRelease)
        ));
        assert!(reg.search(new, "uva").unwrap().is_none());
    }

    #[test]
    fn every_released_generation_stays_a_double_release() {
        let mut reg = Registry::new();
        let old = reg.initialize().unwrap();
        reg.release(old).unwrap();
        let new = reg.initialize().unwrap();
        reg.add_product(new, "kiwi", "Kiwi (un)", 2.0).unwrap();
        assert_eq!(reg.release(new).unwrap().keys, 1);

        assert!(matches!(reg.release(old), Err(TableError::DoubleRelease)));
        assert!(matches!(reg.release(new), Err(TableError::DoubleRelease)));
        assert!(matches!(reg.search(old, "kiwi"), Err(TableError::DoubleRelease)));
        assert!(reg.is_empty());
    }

    #[test]
    fn foreign_handle_is_unknown() {
        let mut other = Registry::new();
        let _ = other.initialize().unwrap();
        let _ = other.initialize().unwrap();
        let foreign = other.initialize().unwrap();
        let reg = Registry::new();
        assert!(matches!(
            reg.search(foreign, "x"),
            Err(TableError::UnknownTable)
        ));
    }

    #[test]
    fn add_product_truncates_name() {
        let mut reg = Registry::new();
        let h = reg.initialize().unwrap();
        let long = "n".repeat(150);
        reg.add_product(h, "nabo", &long, 3.0).unwrap();
        let chain = reg.search(h, "nabo").unwrap().unwrap();
        assert_eq!(chain.head().unwrap().name().len(), crate::record::NAME_CAPACITY);
    }

    #[test]
    fn config_is_applied_to_every_table() {
        let cfg = TableConfig::new().with_capacity(13);
        let mut reg = Registry::with_config(cfg).unwrap();
        let h = reg.initialize().unwrap();
        assert_eq!(h.table(&reg).unwrap().capacity(), 13);
        h.table_mut(&mut reg).unwrap().initialize();
        assert!(Registry::with_config(TableConfig::new().with_capacity(1)).is_err());
    }
}
