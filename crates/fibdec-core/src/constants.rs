//! Constants shared across the workspace.

/// Index computed when none is given.
pub const DEFAULT_INDEX: u64 = 100;

/// Maximum Fibonacci index that fits in a u64.
/// F(93) = 12200160415121876738
pub const MAX_FIB_U64: u64 = 93;

/// Decimal digits per unit of index, log10(phi).
pub const DIGITS_PER_INDEX: f64 = 0.208_987_640_249_978_7;

/// Precomputed Fibonacci values for n = 0..=93 (fast path).
///
/// F(94) = 19,740,274,219,868,223,167 overflows `u64::MAX`.
pub const FIB_TABLE: [u64; 94] = {
    let mut table = [0u64; 94];
    table[1] = 1;
    let mut i = 2;
    while i < 94 {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }
    table
};

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A buffer could not grow: out of memory or over the memory limit.
    pub const ERROR_ALLOCATION: i32 = 2;
    /// Algorithm results did not match during cross-validation.
    pub const ERROR_MISMATCH: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// The caller's read buffer cannot hold the result.
    pub const ERROR_BUFFER_TOO_SMALL: i32 = 5;
    /// The device is already open (EBUSY).
    pub const ERROR_BUSY: i32 = 16;
}
