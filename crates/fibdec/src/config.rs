//! Application configuration from CLI flags and environment.

use std::ops::RangeInclusive;

use clap::Parser;
use fibdec_core::calculator::FibError;
use fibdec_core::constants::DEFAULT_INDEX;
use fibdec_core::options::Options;
use fibdec_memory::budget::parse_memory_limit;

/// How indices are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Calculators called directly; ranges run in parallel.
    Direct,
    /// Reads through an exclusively opened Fibonacci device.
    Device,
    /// Requests to a single worker thread.
    Service,
}

/// Arbitrary-precision decimal Fibonacci calculator.
#[derive(Parser, Debug)]
#[command(name = "fibdec", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Fibonacci index to compute (start of the range with --to).
    #[arg(short = 'n', long, default_value_t = DEFAULT_INDEX, env = "FIBDEC_INDEX")]
    pub index: u64,

    /// Compute every index from --index through this one.
    #[arg(long)]
    pub to: Option<u64>,

    /// Algorithm to use: decimal or reference.
    #[arg(long, default_value = "decimal")]
    pub algo: String,

    /// Cross-check every result against the reference calculator.
    #[arg(long)]
    pub verify: bool,

    /// Read results through the Fibonacci device (indices up to 500).
    #[arg(long, conflicts_with = "service")]
    pub device: bool,

    /// Read buffer size in bytes for --device.
    #[arg(long, default_value_t = 128)]
    pub buffer_size: usize,

    /// Compute on a single background worker.
    #[arg(long)]
    pub service: bool,

    /// Largest heap block a value may use (e.g., "64K", "1M").
    #[arg(long, default_value = "")]
    pub memory_limit: String,

    /// Print results as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (only output the number).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output: full values and debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show detailed information.
    #[arg(short, long)]
    pub details: bool,

    /// Output file path.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Selected backend.
    #[must_use]
    pub fn backend(&self) -> Backend {
        if self.device {
            Backend::Device
        } else if self.service {
            Backend::Service
        } else {
            Backend::Direct
        }
    }

    /// Indices to compute.
    pub fn indices(&self) -> Result<RangeInclusive<u64>, FibError> {
        let end = self.to.unwrap_or(self.index);
        if end < self.index {
            return Err(FibError::Config(format!(
                "range end {end} is below start {}",
                self.index
            )));
        }
        Ok(self.index..=end)
    }

    /// Calculation options from the flags.
    pub fn options(&self) -> Result<Options, FibError> {
        let memory_limit = parse_memory_limit(&self.memory_limit).map_err(FibError::Config)?;
        Ok(Options {
            memory_limit,
            ..Options::default()
        })
    }
}
