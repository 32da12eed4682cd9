//! Harm aggregation and category comparison.
//!
//! This module applies declarative category rules to the filtered accident
//! records, sums harm per calendar day, joins two categories into one
//! time-aligned series, and orchestrates a full analysis run.

pub mod aggregate;
pub mod analyzer;
pub mod join;
pub mod rules;
pub mod types;
pub mod utility;
