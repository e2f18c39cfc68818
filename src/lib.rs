//! Aggregated price-level order book builder
//!
//! Consumes order lifecycle events for one instrument and maintains the
//! per-price aggregated book in a fixed-size sliding window of levels.

pub mod application;
pub mod domain;
pub mod interfaces;
pub mod shared;
