#![no_main]

use libfuzzer_sys::fuzz_target;

use fibdec_core::fastdoubling;
use fibdec_core::reference::fibonacci_biguint;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // Capped for speed: the decimal product is quadratic.
    let n = u64::from(u16::from_le_bytes([data[0], data[1]])) % 5_000;

    let value = fastdoubling::fibonacci(n).unwrap();
    assert_eq!(value.to_string(), fibonacci_biguint(n).to_string(), "F({n})");
});
