//! Value record stored in each chain node.

use core::fmt;
use std::collections::TryReserveError;

/// Maximum stored length of a record name, in bytes.
pub const NAME_CAPACITY: usize = 99;

/// A product name with its price.
///
/// Names longer than [`NAME_CAPACITY`] bytes are cut silently at the last
/// character boundary that fits.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueRecord {
    name: String,
    price: f32,
}

impl ValueRecord {
    pub fn new(name: &str, price: f32) -> Self {
        Self {
            name: truncate(name, NAME_CAPACITY).to_owned(),
            price,
        }
    }

    /// Like [`ValueRecord::new`], but reports a failed name allocation
    /// instead of aborting.
    pub fn try_new(name: &str, price: f32) -> Result<Self, TryReserveError> {
        let name = truncate(name, NAME_CAPACITY);
        let mut owned = String::new();
        owned.try_reserve_exact(name.len())?;
        owned.push_str(name);
        Ok(Self { name: owned, price })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f32 {
        self.price
    }
}

impl fmt::Display for ValueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - R${:.2}", self.name, self.price)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
