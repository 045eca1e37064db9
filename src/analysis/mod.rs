//! Analysis modules.
//!
//! Grouping keys, row filters and the medal aggregation engine.

pub mod aggregator;
pub mod dimension;
pub mod filter;

pub use aggregator::*;
pub use dimension::{AggregationKey, Dimension, DimensionValue};
pub use filter::RowFilter;
