//! Ledger model: timestamps, currencies, members, entries and groups.

pub mod currency;
pub mod entry;
pub mod error;
pub mod group;
pub mod member;
pub mod timestamp;
