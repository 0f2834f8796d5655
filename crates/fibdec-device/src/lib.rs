//! # fibdec-device
//!
//! Front ends that serialize access to the decimal engine: an exclusive-open
//! device, a single-worker service, and independent parallel computations.

pub mod batch;
pub mod device;
pub mod service;

pub use batch::{
    analyze_comparison_results, compute_range, cross_validate, execute_calculations,
    CalculationResult,
};
pub use device::{DeviceError, DeviceHandle, FibDevice, MAX_INDEX};
pub use service::{FibService, ServiceError};
