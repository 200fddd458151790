//! double-hash-table: a fixed-capacity, open-addressing table from string
//! keys to chains of value records, resolved with double hashing.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small collision-resolution engine whose every step is
//!   deterministic and bounded, with ownership doing the memory
//!   bookkeeping.
//! - Layers:
//!   - `probe`: two pure hashes (XOR folding of 3-byte decimal blocks for
//!     the start, byte sum for the step) and the `ProbeSeq` iterator.
//!   - `Table`: slot array of `Free | Occupied | Removed` driven by the
//!     probe sequence; insert, search, remove, release, initialize.
//!   - `Registry`: generational handles over independent tables, standing
//!     in for a process-wide table shared with a host application.
//!   - `catalog` / `report`: product-file loading and collision statistics
//!     for callers that want them.
//!
//! Constraints
//! - Capacity is fixed for the life of a table; there is no rehashing.
//! - The step is `1 + (sum mod (m - 1))`, never zero, so with a prime
//!   capacity each probe sequence visits every slot exactly once. Every
//!   walk is bounded by `m` attempts.
//! - A key lives in at most one slot. Inserting it again pushes a record
//!   on the head of its chain.
//! - Single-threaded, synchronous. `Table` is `Send`; wrap it in one
//!   `Mutex` covering whole operations if it must be shared.
//!
//! Tombstones
//! - `remove` leaves `Removed` behind. Lookups walk past it and only a
//!   `Free` slot proves absence.
//! - Whether insert reclaims tombstones is a `TombstonePolicy`. The default
//!   skips them, so new keys land on the first `Free` slot and tombstones
//!   accumulate until `initialize`.
//!
//! Lifecycle
//! - `release` drops every key and chain and marks the table released;
//!   inserts and removals then fail with `Released`, searches find nothing
//!   and a second release fails with `DoubleRelease`. `initialize` makes it
//!   live again. Dropping a `Table` frees everything without ceremony.
//!
//! Failure model
//! - `TableFull` is an ordinary, reported outcome and leaves the table
//!   untouched. The slot array, key copies and chain growth use
//!   `try_reserve`, so running out of memory surfaces as
//!   `TableError::Allocation`.

mod catalog;
mod chain;
mod error;
pub mod probe;
mod record;
mod registry;
mod report;
mod slot;
mod table;
mod table_proptest;

// Public surface
pub use catalog::{load_catalog, parse_line, product_key, CatalogEntry, LoadSummary};
pub use chain::{Chain, ChainIter};
pub use error::{Result, TableError};
pub use record::{ValueRecord, NAME_CAPACITY};
pub use registry::{Registry, TableHandle};
pub use report::{BatchStats, CollisionReport, RecordOutcome, REPORT_BATCH, REPORT_MAX_KEYS};
pub use slot::SlotState;
pub use table::{
    Iter, Lifecycle, Placement, PlacementKind, ReleaseStats, Table, TableConfig, TombstonePolicy,
    DEFAULT_CAPACITY,
};
