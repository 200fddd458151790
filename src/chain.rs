//! Per-slot value chain and its read-only view.

use crate::record::ValueRecord;
use std::collections::TryReserveError;

/// Records filed under one key. Storage order is insertion order; every
/// public view walks it most-recent-first, so the head is the last push.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ValueChain {
    records: Vec<ValueRecord>,
}

impl ValueChain {
    /// A chain holding just `first`.
    pub(crate) fn try_with_head(first: ValueRecord) -> Result<Self, TryReserveError> {
        let mut chain = Self::default();
        chain.try_push_head(first)?;
        Ok(chain)
    }

    /// Push `record` as the new head. The chain is untouched on failure.
    pub(crate) fn try_push_head(&mut self, record: ValueRecord) -> Result<(), TryReserveError> {
        self.records.try_reserve(1)?;
        self.records.push(record);
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn view(&self) -> Chain<'_> {
        Chain {
            records: &self.records,
        }
    }

    pub(crate) fn into_records(self) -> Vec<ValueRecord> {
        let mut records = self.records;
        records.reverse();
        records
    }
}

/// Shared view of the records under one key, most recent first.
///
/// Borrowed from the table; it cannot outlive the next mutation.
#[derive(Clone, Copy, Debug)]
pub struct Chain<'a> {
    records: &'a [ValueRecord],
}

impl<'a> Chain<'a> {
    /// Most recently inserted record, `None` only for an empty view.
    pub fn head(&self) -> Option<&'a ValueRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> ChainIter<'a> {
        ChainIter {
            it: self.records.iter().rev(),
        }
    }

    pub fn to_vec(&self) -> Vec<ValueRecord> {
        self.iter().cloned().collect()
    }
}

impl<'a> IntoIterator for Chain<'a> {
    type Item = &'a ValueRecord;
    type IntoIter = ChainIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Chain`], head to tail.
#[derive(Clone, Debug)]
pub struct ChainIter<'a> {
    it: core::iter::Rev<core::slice::Iter<'a, ValueRecord>>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a ValueRecord;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl ExactSizeIterator for ChainIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chain: Chain<'_>) -> Vec<&str> {
        chain.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn head_is_most_recent() {
        let mut c = ValueChain::try_with_head(ValueRecord::new("Apple", 1.5)).unwrap();
        assert_eq!(c.view().head().unwrap().name(), "Apple");
        c.try_push_head(ValueRecord::new("Banana", 2.0)).unwrap();
        c.try_push_head(ValueRecord::new("Cherry", 9.0)).unwrap();
        assert_eq!(c.len(), 3);
        assert_eq!(c.view().head().unwrap().name(), "Cherry");
        assert_eq!(names(c.view()), ["Cherry", "Banana", "Apple"]);
    }

    #[test]
    fn empty_view_has_no_head() {
        let c = ValueChain::default();
        let v = c.view();
        assert!(v.is_empty());
        assert!(v.head().is_none());
        assert_eq!(v.iter().count(), 0);
    }

    #[test]
    fn into_records_keeps_view_order() {
        let mut c = ValueChain::try_with_head(ValueRecord::new("a", 1.0)).unwrap();
        c.try_push_head(ValueRecord::new("b", 2.0)).unwrap();
        let view_order = c.view().to_vec();
        assert_eq!(c.into_records(), view_order);
    }

    #[test]
    fn view_iterator_is_exact_and_reusable() {
        let mut c = ValueChain::try_with_head(ValueRecord::new("a", 1.0)).unwrap();
        c.try_push_head(ValueRecord::new("b", 2.0)).unwrap();
        let v = c.view();
        assert_eq!(v.iter().len(), 2);
        assert!(!v.is_empty());
        let first: Vec<_> = v.into_iter().collect();
        let second: Vec<_> = v.iter().collect();
        assert_eq!(first, second);
    }
}
