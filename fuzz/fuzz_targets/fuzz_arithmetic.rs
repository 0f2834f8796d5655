#![no_main]

use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;

use fibdec_core::arith::{add, mul, sub};
use fibdec_core::reference::to_biguint;
use fibdec_core::DecimalBig;

fn decimal(bytes: &[u8]) -> DecimalBig {
    let digits: Vec<u8> = bytes.iter().map(|b| b % 10).collect();
    DecimalBig::from_raw_digits(&digits).unwrap_or_default()
}

fuzz_target!(|data: &[u8]| {
    // First byte splits the input into two operands.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (a, b) = rest.split_at(split);
    let (a, b) = (decimal(a), decimal(b));
    let (big_a, big_b) = (to_biguint(&a), to_biguint(&b));

    let mut out = DecimalBig::zero();
    add(&a, &b, &mut out).unwrap();
    assert_eq!(to_biguint(&out), &big_a + &big_b);

    mul(&a, &b, &mut out).unwrap();
    assert_eq!(to_biguint(&out), &big_a * &big_b);
    assert_eq!(out.to_string(), (&big_a * &big_b).to_string());

    match sub(&a, &b, &mut out) {
        Ok(()) => assert_eq!(to_biguint(&out), big_a - big_b),
        Err(_) => assert!(big_a < big_b),
    }
});
