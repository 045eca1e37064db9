//! MedalTally - Olympic medal tables by any combination of attributes
//!
//! Loads a table of athlete results and pivots it into per-group
//! Gold/Silver/Bronze/Total counts, or plain entry counts.
//!
//! ```no_run
//! use medaltally::analysis::{aggregate, sort_by_total_desc, top_n, AggregationKey};
//! use medaltally::data::{load_results, LoadOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let table = load_results("athlete_events.csv".as_ref(), &LoadOptions::default())?;
//! let key: AggregationKey = "Year,Season".parse()?;
//! let mut rows = aggregate(&table, &key)?;
//! sort_by_total_desc(&mut rows);
//! let top10 = top_n(rows, 10);
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod data;
pub mod error;
pub mod models;
pub mod report;
