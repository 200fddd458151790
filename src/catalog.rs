//! Product catalog glue: key derivation and the line-oriented product file
//! (`<name> - R$ <price>`, one product per line).

use crate::error::{Result, TableError};
use crate::record::ValueRecord;
use crate::table::{Placement, Table};
use log::{info, warn};
use std::io::BufRead;

const PRICE_SEPARATOR: &str = " - R$ ";

/// Lookup key for a product name: the first space-separated word, with
/// everything but alphabetic characters dropped, lowercased.
///
/// `"Banana Prata (kg)"` and `"banana"` both map to `"banana"`.
pub fn product_key(full_name: &str) -> String {
    full_name
        .split(' ')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// One parsed catalog line.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub key: String,
    pub record: ValueRecord,
}

/// Parse `"<name> - R$ <price>"`. A decimal comma is accepted.
pub fn parse_line(line: &str, line_no: usize) -> Result<CatalogEntry> {
    let line = line.trim();
    let mut parts = line.split(PRICE_SEPARATOR);
    let (Some(name), Some(price), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TableError::Parse {
            line: line_no,
            reason: format!("expected `<name>{PRICE_SEPARATOR}<price>`"),
        });
    };
    let price: f32 = price
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|e| TableError::Parse {
            line: line_no,
            reason: format!("bad price {price:?}: {e}"),
        })?;
    let key = product_key(name);
    if key.is_empty() {
        return Err(TableError::Parse {
            line: line_no,
            reason: format!("no key can be derived from {name:?}"),
        });
    }
    Ok(CatalogEntry {
        key,
        record: ValueRecord::try_new(name, price)?,
    })
}

/// Result of [`load_catalog`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadSummary {
    /// Records stored in the table.
    pub loaded: usize,
    /// Malformed lines that were skipped.
    pub skipped: usize,
    /// Well-formed lines the table had no room for.
    pub rejected: usize,
    /// Placement of every stored record, in file order.
    pub placements: Vec<Placement>,
}

/// Load every well-formed line of `reader` into `table`.
///
/// Malformed lines and inserts refused for lack of room are logged and
/// counted; I/O errors and allocation failures abort the load.
pub fn load_catalog<R: BufRead>(reader: R, table: &mut Table) -> Result<LoadSummary> {
    let mut summary = LoadSummary::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        if line.trim().is_empty() {
            continue;
        }
        let entry = match parse_line(&line, line_no) {
            Ok(entry) => entry,
            Err(TableError::Parse { line, reason }) => {
                warn!("catalog: skipping line {line}: {reason}");
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        match table.insert(&entry.key, entry.record) {
            Ok(p) => {
                summary.loaded += 1;
                summary.placements.push(p);
            }
            Err(TableError::TableFull { .. }) => summary.rejected += 1,
            Err(e) => return Err(e),
        }
    }
    info!(
        "catalog: {} products loaded, {} lines skipped, {} rejected",
        summary.loaded, summary.skipped, summary.rejected
    );
    Ok(summary)
}
