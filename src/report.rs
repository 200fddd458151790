//! Collision statistics over a run of inserts, grouped in fixed-size
//! batches and rendered as plain text.

use crate::error::{Result, TableError};
use crate::table::Placement;
use std::io::Write;

/// Inserts tracked by one report; later outcomes are ignored.
pub const REPORT_MAX_KEYS: usize = 1000;
/// Inserts per batch line.
pub const REPORT_BATCH: usize = 100;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct BatchStats {
    pub inserts: usize,
    /// Inserts that needed at least one extra probe.
    pub collided: usize,
    /// Extra probes summed over the batch.
    pub probes: usize,
    pub longest: usize,
    pub failures: usize,
}

impl BatchStats {
    fn add(&mut self, outcome: &Result<Placement>) {
        self.inserts += 1;
        match outcome {
            Ok(p) => {
                if p.attempts > 0 {
                    self.collided += 1;
                }
                self.probes += p.attempts;
                self.longest = self.longest.max(p.attempts);
            }
            Err(_) => self.failures += 1,
        }
    }

    fn merge(&mut self, other: &BatchStats) {
        self.inserts += other.inserts;
        self.collided += other.collided;
        self.probes += other.probes;
        self.longest = self.longest.max(other.longest);
        self.failures += other.failures;
    }
}

/// What [`CollisionReport::record`] did with an outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RecordOutcome {
    Recorded,
    /// Not collision data (an error other than table-full).
    Ignored,
    /// [`REPORT_MAX_KEYS`] outcomes are already recorded.
    Capped,
}

/// Accumulates insert outcomes in batches of [`REPORT_BATCH`].
#[derive(Clone, Debug, Default)]
pub struct CollisionReport {
    batches: Vec<BatchStats>,
    seen: usize,
}

impl CollisionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one insert outcome. Only [`TableError::TableFull`] counts as
    /// a failure; other errors are not collision data and are ignored.
    pub fn record(&mut self, outcome: &Result<Placement>) -> RecordOutcome {
        if self.seen >= REPORT_MAX_KEYS {
            return RecordOutcome::Capped;
        }
        if let Err(e) = outcome {
            if !matches!(e, TableError::TableFull { .. }) {
                return RecordOutcome::Ignored;
            }
        }
        if self.seen % REPORT_BATCH == 0 {
            self.batches.push(BatchStats::default());
        }
        if let Some(batch) = self.batches.last_mut() {
            batch.add(outcome);
        }
        self.seen += 1;
        RecordOutcome::Recorded
    }

    pub fn batches(&self) -> &[BatchStats] {
        &self.batches
    }

    pub fn total(&self) -> BatchStats {
        let mut total = BatchStats::default();
        for b in &self.batches {
            total.merge(b);
        }
        total
    }

    /// Write one line per batch followed by a totals line.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        writeln!(out, "batch\tinserts\tcollided\tprobes\tlongest\tfailures")?;
        for (i, b) in self.batches.iter().enumerate() {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                i + 1,
                b.inserts,
                b.collided,
                b.probes,
                b.longest,
                b.failures
            )?;
        }
        let t = self.total();
        writeln!(
            out,
            "total\t{}\t{}\t{}\t{}\t{}",
            t.inserts, t.collided, t.probes, t.longest, t.failures
        )?;
        Ok(())
    }
}
