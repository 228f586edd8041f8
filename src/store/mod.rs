//! Loading and saving groups.

pub mod document;
