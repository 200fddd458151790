//! Error types for table operations.

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// Errors that can occur during table operations.
#[derive(Error, Debug)]
pub enum TableError {
    /// Every slot on the key's probe sequence is taken.
    #[error("table is full (capacity: {capacity})")]
    TableFull {
        /// Fixed capacity of the table.
        capacity: usize,
    },

    /// Copying a key or growing a value chain could not reserve memory.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Keys must be non-empty.
    #[error("empty key")]
    EmptyKey,

    /// The table was released and has not been initialized again.
    #[error("table was released; initialize it before reuse")]
    Released,

    /// Release was requested for a table that is already released.
    #[error("table already released")]
    DoubleRelease,

    /// Capacity too small for the step function.
    #[error("invalid capacity {capacity}: must be at least 2")]
    InvalidCapacity { capacity: usize },

    /// The handle never referred to a table of this registry.
    #[error("unknown table handle")]
    UnknownTable,

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A catalog line could not be parsed.
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// A specialized Result type for table operations.
pub type Result<T> = std::result::Result<T, TableError>;
