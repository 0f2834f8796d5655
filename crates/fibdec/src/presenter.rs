//! Result presenters: plain text and JSON lines.

use std::io::{self, Write};
use std::time::Duration;

use fibdec_core::decimal::DecimalBig;
use fibdec_core::estimate::StorageEstimate;
use fibdec_memory::stats::AllocStats;
use serde::Serialize;

use crate::output::{format_duration, format_number, format_result};

/// A computed value ready for presentation.
#[derive(Debug)]
pub struct ResultRecord {
    /// Calculator that produced the value.
    pub algorithm: String,
    /// Fibonacci index.
    pub index: u64,
    /// F(index).
    pub value: DecimalBig,
    /// Computation time.
    pub duration: Duration,
    /// Buffer activity, when the value was computed on this thread.
    pub stats: Option<AllocStats>,
}

/// Presents results to the user.
pub trait ResultPresenter {
    /// Present one result.
    fn present_result(&self, out: &mut dyn Write, record: &ResultRecord) -> io::Result<()>;

    /// Present a summary line after several results.
    fn present_summary(&self, out: &mut dyn Write, records: &[ResultRecord]) -> io::Result<()>;
}

/// Plain-text presenter.
pub struct CliResultPresenter {
    verbose: bool,
    quiet: bool,
    details: bool,
}

impl CliResultPresenter {
    /// Create a plain-text presenter.
    #[must_use]
    pub fn new(verbose: bool, quiet: bool, details: bool) -> Self {
        Self {
            verbose,
            quiet,
            details,
        }
    }
}

impl ResultPresenter for CliResultPresenter {
    fn present_result(&self, out: &mut dyn Write, record: &ResultRecord) -> io::Result<()> {
        let digits = record.value.to_string();
        if self.quiet {
            return writeln!(out, "{digits}");
        }

        writeln!(out, "Algorithm: {}", record.algorithm)?;
        writeln!(out, "N: {}", format_number(record.index))?;
        writeln!(out, "Duration: {}", format_duration(record.duration))?;

        if self.details {
            let estimate = StorageEstimate::estimate(record.index);
            writeln!(out, "Result digits: {}", record.value.len())?;
            writeln!(out, "Estimated digits: {}", estimate.digits)?;
            writeln!(
                out,
                "Storage: {}",
                if record.value.is_inline() {
                    "inline".to_string()
                } else {
                    format!("heap ({} digit capacity)", record.value.capacity())
                }
            )?;
            if let Some(stats) = &record.stats {
                writeln!(
                    out,
                    "Heap blocks: {} ({} bytes), promotions: {}, extensions: {}",
                    stats.heap_blocks, stats.heap_bytes, stats.promotions, stats.extensions
                )?;
            }
        }

        writeln!(
            out,
            "F({}) = {}",
            format_number(record.index),
            format_result(&digits, self.verbose)
        )
    }

    fn present_summary(&self, out: &mut dyn Write, records: &[ResultRecord]) -> io::Result<()> {
        if self.quiet || records.len() < 2 {
            return Ok(());
        }
        let total: Duration = records.iter().map(|r| r.duration).sum();
        writeln!(
            out,
            "\nComputed {} values in {}",
            records.len(),
            format_duration(total)
        )
    }
}

#[derive(Serialize)]
struct JsonStats {
    promotions: u64,
    extensions: u64,
    heap_blocks: u64,
    heap_bytes: u64,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    index: u64,
    algorithm: &'a str,
    digits: usize,
    duration_us: u64,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<JsonStats>,
}

/// JSON-lines presenter: one object per result.
pub struct JsonResultPresenter {
    details: bool,
}

impl JsonResultPresenter {
    /// Create a JSON presenter.
    #[must_use]
    pub fn new(details: bool) -> Self {
        Self { details }
    }
}

impl ResultPresenter for JsonResultPresenter {
    fn present_result(&self, out: &mut dyn Write, record: &ResultRecord) -> io::Result<()> {
        let json = JsonRecord {
            index: record.index,
            algorithm: &record.algorithm,
            digits: record.value.len(),
            duration_us: u64::try_from(record.duration.as_micros()).unwrap_or(u64::MAX),
            value: record.value.to_string(),
            stats: record.stats.filter(|_| self.details).map(|s| JsonStats {
                promotions: s.promotions,
                extensions: s.extensions,
                heap_blocks: s.heap_blocks,
                heap_bytes: s.heap_bytes,
            }),
        };
        serde_json::to_writer(&mut *out, &json)?;
        writeln!(out)
    }

    fn present_summary(&self, _out: &mut dyn Write, _records: &[ResultRecord]) -> io::Result<()> {
        Ok(())
    }
}
