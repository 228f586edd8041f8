//! Synthetic ledgers for benchmarks and stress tests.

pub mod random_group;
