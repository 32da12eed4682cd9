//! Harm analysis of the Estonian traffic-accident dataset.
//!
//! Raw CSV → translated columns → typed records → area of interest →
//! per-category day aggregates → joined series with cumulative totals.

pub mod analyzers;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod schema;
pub mod stats;
