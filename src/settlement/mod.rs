//! Settlement planning and balance reporting.

pub mod engine;
pub mod report;
