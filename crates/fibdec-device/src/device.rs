//! A Fibonacci device: read at offset `k` yields F(k).
//!
//! Only one handle may be open at a time. The handle holds the device lock
//! for its whole lifetime, so every computation it runs is serialized.

use std::io::SeekFrom;
use std::sync::Arc;

use fibdec_core::calculator::{Calculator, FibCalculator, FibError};
use fibdec_core::fastdoubling::DecimalFastDoubling;
use fibdec_core::options::Options;
use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Largest offset the device serves; seeks are clamped to it.
pub const MAX_INDEX: u64 = 500;

/// Errors from the device.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Another handle is open.
    #[error("device is busy")]
    Busy,

    /// The read buffer cannot hold the digits and their terminator.
    #[error("buffer of {available} bytes cannot hold {needed} bytes")]
    BufferTooSmall {
        /// Bytes required, terminator included.
        needed: usize,
        /// Bytes offered.
        available: usize,
    },

    /// The computation failed.
    #[error(transparent)]
    Fib(#[from] FibError),
}

/// The device. Create one and share it; open it to use it.
pub struct FibDevice {
    lock: Mutex<()>,
    calculator: Arc<dyn Calculator>,
    opts: Options,
}

impl FibDevice {
    /// A device backed by the decimal Fast Doubling engine.
    #[must_use]
    pub fn new() -> Self {
        let calc = Arc::new(FibCalculator::new(Arc::new(DecimalFastDoubling::new())));
        Self::with_calculator(calc, Options::default())
    }

    /// A device backed by `calculator`. The index limit is always
    /// [`MAX_INDEX`]; the memory limit comes from `opts`.
    #[must_use]
    pub fn with_calculator(calculator: Arc<dyn Calculator>, opts: Options) -> Self {
        Self {
            lock: Mutex::new(()),
            calculator,
            opts: Options {
                max_index: MAX_INDEX,
                ..opts
            },
        }
    }

    /// Open the device, failing with [`DeviceError::Busy`] if it is already open.
    pub fn open(&self) -> Result<DeviceHandle<'_>, DeviceError> {
        let Some(guard) = self.lock.try_lock() else {
            warn!("fibonacci device is in use");
            return Err(DeviceError::Busy);
        };
        debug!(calculator = self.calculator.name(), "device opened");
        Ok(DeviceHandle {
            device: self,
            _guard: guard,
            position: 0,
        })
    }

    /// Whether a handle is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock.is_locked()
    }
}

impl Default for FibDevice {
    fn default() -> Self {
        Self::new()
    }
}

/// An open device. Dropping it releases the device.
pub struct DeviceHandle<'a> {
    device: &'a FibDevice,
    _guard: MutexGuard<'a, ()>,
    position: u64,
}

impl DeviceHandle<'_> {
    /// Current offset.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move the offset and return the new one, clamped to `0..=MAX_INDEX`.
    ///
    /// `SeekFrom::End` is relative to [`MAX_INDEX`].
    pub fn seek(&mut self, pos: SeekFrom) -> u64 {
        let target = match pos {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(delta) => i128::from(self.position) + i128::from(delta),
            SeekFrom::End(delta) => i128::from(MAX_INDEX) + i128::from(delta),
        };
        // Clamped into 0..=MAX_INDEX, so the conversion cannot fail.
        self.position = u64::try_from(target.clamp(0, i128::from(MAX_INDEX))).unwrap_or(0);
        debug!(position = self.position, "device seek");
        self.position
    }

    /// Compute F(offset) and copy it, NUL-terminated, into `buf`.
    ///
    /// Returns the digit count. The offset does not advance.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let value = self
            .device
            .calculator
            .calculate(self.position, &self.device.opts)?;
        let display = value.into_display_form();
        let digits = display.len();
        let bytes = display.as_bytes_with_nul();
        if buf.len() < bytes.len() {
            return Err(DeviceError::BufferTooSmall {
                needed: bytes.len(),
                available: buf.len(),
            });
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        debug!(index = self.position, digits, "device read");
        Ok(digits)
    }

    /// Writes are accepted and discarded.
    pub fn write(&mut self, _buf: &[u8]) -> usize {
        1
    }
}
