//! Parallel range computation and cross-validation.
//!
//! Parallelism is only across independent computations: every index, and
//! every calculator, gets its own values on its own rayon worker.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::{Duration, Instant};

use fibdec_core::calculator::{Calculator, FibError};
use fibdec_core::decimal::DecimalBig;
use fibdec_core::options::Options;
use rayon::iter::{IntoParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, warn};

/// Result of a single calculation.
#[derive(Debug)]
pub struct CalculationResult {
    /// Index computed.
    pub index: u64,
    /// Algorithm name.
    pub algorithm: String,
    /// The computed value or a structured error.
    pub outcome: Result<DecimalBig, FibError>,
    /// Computation duration.
    pub duration: Duration,
}

fn run_one(calc: &dyn Calculator, index: u64, opts: &Options) -> CalculationResult {
    let start = Instant::now();
    let outcome = calc.calculate(index, opts);
    CalculationResult {
        index,
        algorithm: calc.name().to_string(),
        outcome,
        duration: start.elapsed(),
    }
}

/// Compute F(k) for every k in `range` in parallel.
///
/// `on_done` is called from worker threads as each index finishes, in no
/// particular order. The returned results are in index order.
pub fn compute_range<F>(
    calc: &dyn Calculator,
    range: RangeInclusive<u64>,
    opts: &Options,
    on_done: F,
) -> Vec<CalculationResult>
where
    F: Fn(&CalculationResult) + Sync,
{
    debug!(
        calculator = calc.name(),
        start = range.start(),
        end = range.end(),
        "computing range"
    );
    range
        .into_par_iter()
        .map(|index| {
            let result = run_one(calc, index, opts);
            on_done(&result);
            result
        })
        .collect()
}

/// Run every calculator on index `n`, in parallel when there are several.
pub fn execute_calculations(
    calculators: &[Arc<dyn Calculator>],
    n: u64,
    opts: &Options,
) -> Vec<CalculationResult> {
    if let [calc] = calculators {
        return vec![run_one(calc.as_ref(), n, opts)];
    }
    calculators
        .par_iter()
        .map(|calc| run_one(calc.as_ref(), n, opts))
        .collect()
}

/// Check that all successful results agree.
pub fn analyze_comparison_results(results: &[CalculationResult]) -> Result<(), FibError> {
    let mut valid = results
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().map(|value| (r, value)));

    let Some((first, expected)) = valid.next() else {
        return Err(results
            .iter()
            .find_map(|r| r.outcome.as_ref().err().cloned())
            .unwrap_or_else(|| FibError::Calculation("no valid results".into())));
    };

    for (result, value) in valid {
        if value != expected {
            warn!(
                index = result.index,
                left = %first.algorithm,
                right = %result.algorithm,
                "calculators disagree"
            );
            return Err(FibError::Mismatch {
                index: result.index,
            });
        }
    }
    Ok(())
}

/// Compute F(`n`) with both calculators and return the primary result if
/// they agree.
pub fn cross_validate(
    primary: &Arc<dyn Calculator>,
    reference: &Arc<dyn Calculator>,
    n: u64,
    opts: &Options,
) -> Result<DecimalBig, FibError> {
    let mut results = execute_calculations(&[Arc::clone(primary), Arc::clone(reference)], n, opts);
    analyze_comparison_results(&results)?;
    let primary_result = results.swap_remove(0);
    primary_result.outcome
}
