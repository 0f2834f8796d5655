//! Error handling and exit codes.

use fibdec_core::calculator::FibError;
use fibdec_core::constants::exit_codes;
use fibdec_device::{DeviceError, ServiceError};
use fibdec_memory::AllocError;

/// Exit code for a calculation error.
#[must_use]
pub fn handle_error(err: &FibError) -> i32 {
    match err {
        FibError::Allocation(_) => exit_codes::ERROR_ALLOCATION,
        FibError::Calculation(_) => exit_codes::ERROR_GENERIC,
        FibError::Config(_) | FibError::IndexOutOfRange { .. } => exit_codes::ERROR_CONFIG,
        FibError::Mismatch { .. } => exit_codes::ERROR_MISMATCH,
    }
}

/// Exit code for a device error.
#[must_use]
pub fn handle_device_error(err: &DeviceError) -> i32 {
    match err {
        DeviceError::Busy => exit_codes::ERROR_BUSY,
        DeviceError::BufferTooSmall { .. } => exit_codes::ERROR_BUFFER_TOO_SMALL,
        DeviceError::Fib(inner) => handle_error(inner),
    }
}

/// Exit code for any error returned by the application.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| {
            if let Some(e) = cause.downcast_ref::<FibError>() {
                Some(handle_error(e))
            } else if let Some(e) = cause.downcast_ref::<DeviceError>() {
                Some(handle_device_error(e))
            } else if let Some(e) = cause.downcast_ref::<ServiceError>() {
                match e {
                    ServiceError::Fib(inner) => Some(handle_error(inner)),
                    ServiceError::Disconnected | ServiceError::Spawn(_) => None,
                }
            } else {
                cause
                    .downcast_ref::<AllocError>()
                    .map(|_| exit_codes::ERROR_ALLOCATION)
            }
        })
        .unwrap_or(exit_codes::ERROR_GENERIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        let alloc = AllocError::BudgetExceeded {
            requested: 96,
            limit: 48,
        };
        assert_eq!(handle_error(&FibError::Allocation(alloc)), 2);
        assert_eq!(handle_error(&FibError::Mismatch { index: 9 }), 3);
        assert_eq!(handle_error(&FibError::Config("bad".into())), 4);
        assert_eq!(
            handle_error(&FibError::IndexOutOfRange {
                index: 600,
                max: 500
            }),
            4
        );
        assert_eq!(handle_error(&FibError::Calculation("x".into())), 1);
    }

    #[test]
    fn device_error_codes() {
        assert_eq!(handle_device_error(&DeviceError::Busy), 16);
        assert_eq!(
            handle_device_error(&DeviceError::BufferTooSmall {
                needed: 22,
                available: 8
            }),
            5
        );
    }

    #[test]
    fn exit_code_looks_through_context() {
        let err = anyhow::Error::new(DeviceError::Busy).context("opening device");
        assert_eq!(exit_code(&err), 16);

        let err = anyhow::Error::new(ServiceError::Fib(FibError::Mismatch { index: 1 }));
        assert_eq!(exit_code(&err), 3);

        assert_eq!(exit_code(&anyhow::anyhow!("something else")), 1);
    }
}
