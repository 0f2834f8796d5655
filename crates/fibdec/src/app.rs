//! Application entry point and dispatch.

use std::io::{self, SeekFrom, Write};
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use fibdec_core::calculator::{Calculator, FibError};
use fibdec_core::decimal::DecimalBig;
use fibdec_core::estimate::StorageEstimate;
use fibdec_core::options::Options;
use fibdec_core::registry::{CalculatorFactory, DefaultFactory};
use fibdec_device::batch::{compute_range, cross_validate};
use fibdec_device::{DeviceError, FibDevice, FibService, MAX_INDEX};
use fibdec_memory::stats;
use tracing::{debug, warn};

use crate::config::{AppConfig, Backend};
use crate::output::{range_progress, write_to_file};
use crate::presenter::{CliResultPresenter, JsonResultPresenter, ResultPresenter, ResultRecord};

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        crate::completion::generate_completion(&mut cmd, shell, &mut io::stdout());
        return Ok(());
    }

    let opts = config.options()?;
    let indices = config.indices()?;

    let estimate = StorageEstimate::estimate(*indices.end());
    if !estimate.fits_in(opts.block_limit()) {
        warn!(
            digits = estimate.digits,
            peak_block_bytes = estimate.peak_block_bytes,
            "memory limit is likely too small for this index"
        );
    }

    let factory = DefaultFactory::new();
    let calculator = factory.get(&config.algo)?;
    let reference = if config.verify {
        Some(factory.get("reference")?)
    } else {
        None
    };

    debug!(backend = ?config.backend(), algo = %config.algo, "running");
    let records = match config.backend() {
        Backend::Direct => run_direct(config, &calculator, reference.as_ref(), &opts, indices)?,
        Backend::Device => {
            let records = run_device(&calculator, &opts, indices, config.buffer_size)?;
            verify_records(&records, reference.as_deref(), &opts)?;
            records
        }
        Backend::Service => {
            let records = run_service(&calculator, &opts, indices)?;
            verify_records(&records, reference.as_deref(), &opts)?;
            records
        }
    };

    let presenter: Box<dyn ResultPresenter> = if config.json {
        Box::new(JsonResultPresenter::new(config.details))
    } else {
        Box::new(CliResultPresenter::new(
            config.verbose,
            config.quiet,
            config.details,
        ))
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        presenter.present_result(&mut out, record)?;
    }
    presenter.present_summary(&mut out, &records)?;
    out.flush()?;

    if let Some(path) = &config.output {
        let values: Vec<String> = records.iter().map(|r| r.value.to_string()).collect();
        write_to_file(path, values.iter().map(String::as_str))
            .with_context(|| format!("failed to write {path}"))?;
    }

    Ok(())
}

fn run_direct(
    config: &AppConfig,
    calculator: &Arc<dyn Calculator>,
    reference: Option<&Arc<dyn Calculator>>,
    opts: &Options,
    indices: RangeInclusive<u64>,
) -> Result<Vec<ResultRecord>, FibError> {
    if indices.start() == indices.end() {
        let index = *indices.start();
        stats::reset();
        let start = Instant::now();
        let value = match reference {
            Some(reference) => cross_validate(calculator, reference, index, opts)?,
            None => calculator.calculate(index, opts)?,
        };
        let duration = start.elapsed();
        // Cross-validation computes on rayon workers; only a local run has stats.
        let stats = reference.is_none().then(stats::snapshot);
        return Ok(vec![ResultRecord {
            algorithm: calculator.name().to_string(),
            index,
            value,
            duration,
            stats,
        }]);
    }

    let bar = range_progress(range_len(&indices), config.quiet || config.json);
    let results = compute_range(calculator.as_ref(), indices, opts, |_| bar.inc(1));
    bar.finish_and_clear();

    let records = results
        .into_iter()
        .map(|r| -> Result<ResultRecord, FibError> {
            Ok(ResultRecord {
                algorithm: r.algorithm,
                index: r.index,
                value: r.outcome?,
                duration: r.duration,
                stats: None,
            })
        })
        .collect::<Result<Vec<_>, FibError>>()?;
    verify_records(&records, reference.map(Arc::as_ref), opts)?;
    Ok(records)
}

/// Number of indices in `range`, saturating for the full `u64` span.
fn range_len(range: &RangeInclusive<u64>) -> u64 {
    (range.end() - range.start()).saturating_add(1)
}

fn run_device(
    calculator: &Arc<dyn Calculator>,
    opts: &Options,
    indices: RangeInclusive<u64>,
    buffer_size: usize,
) -> Result<Vec<ResultRecord>, DeviceError> {
    let device = FibDevice::with_calculator(Arc::clone(calculator), opts.clone());
    let mut handle = device.open()?;
    let mut buf = vec![0u8; buffer_size];

    indices
        .map(|index| -> Result<ResultRecord, DeviceError> {
            if handle.seek(SeekFrom::Start(index)) != index {
                return Err(FibError::IndexOutOfRange {
                    index,
                    max: MAX_INDEX,
                }
                .into());
            }
            let start = Instant::now();
            let digits = handle.read(&mut buf)?;
            let duration = start.elapsed();
            let text = std::str::from_utf8(&buf[..digits])
                .map_err(|e| FibError::Calculation(format!("device returned non-ASCII digits: {e}")))?;
            let value: DecimalBig = text.parse().map_err(FibError::from)?;
            Ok(ResultRecord {
                algorithm: format!("{} (device)", calculator.name()),
                index,
                value,
                duration,
                stats: None,
            })
        })
        .collect()
}

fn run_service(
    calculator: &Arc<dyn Calculator>,
    opts: &Options,
    indices: RangeInclusive<u64>,
) -> Result<Vec<ResultRecord>> {
    let service = FibService::spawn(Arc::clone(calculator), opts.clone())?;
    let mut records = Vec::new();
    for index in indices {
        let start = Instant::now();
        let value = service.compute(index)?;
        records.push(ResultRecord {
            algorithm: format!("{} (service)", calculator.name()),
            index,
            value,
            duration: start.elapsed(),
            stats: None,
        });
    }
    Ok(records)
}

/// Recompute every record with `reference` and fail on the first disagreement.
fn verify_records(
    records: &[ResultRecord],
    reference: Option<&dyn Calculator>,
    opts: &Options,
) -> Result<(), FibError> {
    let Some(reference) = reference else {
        return Ok(());
    };
    for record in records {
        if reference.calculate(record.index, opts)? != record.value {
            warn!(index = record.index, "result differs from reference");
            return Err(FibError::Mismatch {
                index: record.index,
            });
        }
    }
    debug!(count = records.len(), "results verified against reference");
    Ok(())
}
