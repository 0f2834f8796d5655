//! fibdec library: application logic for the decimal Fibonacci calculator.

pub mod app;
pub mod completion;
pub mod config;
pub mod errors;
pub mod output;
pub mod presenter;
