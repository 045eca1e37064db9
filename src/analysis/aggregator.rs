//! Medal aggregation and statistics.
//!
//! This module reshapes a result table into per-group medal counts:
//! filter to podium entries, group by the key tuple, count per medal,
//! pivot to one row per group and derive the total.

use crate::analysis::dimension::{AggregationKey, DimensionValue};
use crate::error::AggregateError;
use crate::models::{Medal, ResultTable};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// What each group counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AggregationMode {
    /// Only entries that won a medal, split by medal type.
    #[default]
    MedalsOnly,
    /// Every entry regardless of outcome.
    AllEntries,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::MedalsOnly => write!(f, "medals"),
            AggregationMode::AllEntries => write!(f, "entries"),
        }
    }
}

/// A count column of a medal table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MedalColumn {
    Gold,
    Silver,
    Bronze,
    #[default]
    Total,
}

impl fmt::Display for MedalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MedalColumn::Gold => write!(f, "Gold"),
            MedalColumn::Silver => write!(f, "Silver"),
            MedalColumn::Bronze => write!(f, "Bronze"),
            MedalColumn::Total => write!(f, "Total"),
        }
    }
}

/// Medal counts for one key combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedalCountRow {
    /// Key values, in key order.
    pub key: Vec<DimensionValue>,
    pub gold: u64,
    pub silver: u64,
    pub bronze: u64,
    /// Always `gold + silver + bronze`.
    pub total: u64,
}

impl MedalCountRow {
    /// Build a row from per-medal counts in podium order.
    pub fn from_counts(key: Vec<DimensionValue>, counts: [u64; 3]) -> Self {
        let [gold, silver, bronze] = counts;
        Self {
            key,
            gold,
            silver,
            bronze,
            total: gold + silver + bronze,
        }
    }

    pub fn count(&self, column: MedalColumn) -> u64 {
        match column {
            MedalColumn::Gold => self.gold,
            MedalColumn::Silver => self.silver,
            MedalColumn::Bronze => self.bronze,
            MedalColumn::Total => self.total,
        }
    }
}

/// Entry count for one key combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCountRow {
    pub key: Vec<DimensionValue>,
    pub entries: u64,
}

/// Output of [`tally`], one variant per mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "rows", rename_all = "snake_case")]
pub enum Tally {
    Medals(Vec<MedalCountRow>),
    Entries(Vec<EntryCountRow>),
}

impl Tally {
    pub fn mode(&self) -> AggregationMode {
        match self {
            Tally::Medals(_) => AggregationMode::MedalsOnly,
            Tally::Entries(_) => AggregationMode::AllEntries,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Tally::Medals(rows) => rows.len(),
            Tally::Entries(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort descending by `column` (entry tallies sort by entry count).
    pub fn sort_desc(&mut self, column: MedalColumn) {
        match self {
            Tally::Medals(rows) => sort_by_column(rows, column),
            Tally::Entries(rows) => sort_entries_desc(rows),
        }
    }

    /// Keep only the first `n` rows.
    pub fn truncate(&mut self, n: usize) {
        match self {
            Tally::Medals(rows) => rows.truncate(n),
            Tally::Entries(rows) => rows.truncate(n),
        }
    }

    /// Apply the requested ordering, then the row limit.
    ///
    /// A limit without an explicit column sorts by Total first. Entry
    /// tallies only have one count, so any column sorts by it. Returns the
    /// column actually sorted by.
    pub fn order_and_limit(
        &mut self,
        sort_by: Option<MedalColumn>,
        top: Option<usize>,
    ) -> Option<MedalColumn> {
        let mut order = sort_by.or(top.map(|_| MedalColumn::Total));

        if let Some(column) = order {
            if self.mode() == AggregationMode::AllEntries && column != MedalColumn::Total {
                warn!("Entry counts have no {} column; sorting by entries", column);
                order = Some(MedalColumn::Total);
            }
            self.sort_desc(column);
        }
        if let Some(n) = top {
            self.truncate(n);
        }

        order
    }
}

/// Count medals per key combination.
///
/// Rows without a medal are discarded first; rows with an absent key value
/// are dropped as well. Medal types a group never won are zero-filled.
/// Output is ordered by key.
pub fn aggregate(
    table: &ResultTable,
    key: &AggregationKey,
) -> Result<Vec<MedalCountRow>, AggregateError> {
    check_schema(table, key)?;

    if table.is_empty() {
        warn!("Empty input: no result rows to aggregate by {}", key);
        return Ok(Vec::new());
    }

    let mut groups: BTreeMap<Vec<DimensionValue>, [u64; 3]> = BTreeMap::new();
    let mut without_medal = 0usize;
    let mut without_key = 0usize;

    for row in table.rows() {
        let Some(medal) = row.medal else {
            without_medal += 1;
            continue;
        };

        let Some(values) = key.values_of(row) else {
            without_key += 1;
            continue;
        };

        groups.entry(values).or_insert([0; 3])[medal.index()] += 1;
    }

    debug!(
        "Aggregated {} rows by {}: {} groups, {} without medal, {} with absent key",
        table.len(),
        key,
        groups.len(),
        without_medal,
        without_key
    );

    Ok(groups
        .into_iter()
        .map(|(values, counts)| MedalCountRow::from_counts(values, counts))
        .collect())
}

/// Count every entry per key combination, medal or not.
///
/// Rows with an absent key value are dropped. Output is ordered by key.
pub fn count_entries(
    table: &ResultTable,
    key: &AggregationKey,
) -> Result<Vec<EntryCountRow>, AggregateError> {
    check_schema(table, key)?;

    if table.is_empty() {
        warn!("Empty input: no result rows to count by {}", key);
        return Ok(Vec::new());
    }

    let mut groups: BTreeMap<Vec<DimensionValue>, u64> = BTreeMap::new();
    let mut without_key = 0usize;

    for row in table.rows() {
        match key.values_of(row) {
            Some(values) => *groups.entry(values).or_default() += 1,
            None => without_key += 1,
        }
    }

    debug!(
        "Counted {} rows by {}: {} groups, {} with absent key",
        table.len(),
        key,
        groups.len(),
        without_key
    );

    Ok(groups
        .into_iter()
        .map(|(key, entries)| EntryCountRow { key, entries })
        .collect())
}

/// Run the aggregation selected by `mode`.
pub fn tally(
    table: &ResultTable,
    key: &AggregationKey,
    mode: AggregationMode,
) -> Result<Tally, AggregateError> {
    match mode {
        AggregationMode::MedalsOnly => aggregate(table, key).map(Tally::Medals),
        AggregationMode::AllEntries => count_entries(table, key).map(Tally::Entries),
    }
}

/// Every key dimension must be a column of the table.
fn check_schema(table: &ResultTable, key: &AggregationKey) -> Result<(), AggregateError> {
    match key.dimensions().iter().find(|d| !table.has_column(**d)) {
        Some(missing) => Err(AggregateError::FieldNotFound(
            missing.column_name().to_string(),
        )),
        None => Ok(()),
    }
}

/// Sort rows by total, highest first. Ties keep their current order.
pub fn sort_by_total_desc(rows: &mut [MedalCountRow]) {
    sort_by_column(rows, MedalColumn::Total);
}

/// Sort rows by one count column, highest first. Ties keep their current order.
pub fn sort_by_column(rows: &mut [MedalCountRow], column: MedalColumn) {
    rows.sort_by_key(|r| Reverse(r.count(column)));
}

/// Sort entry rows by count, highest first. Ties keep their current order.
pub fn sort_entries_desc(rows: &mut [EntryCountRow]) {
    rows.sort_by_key(|r| Reverse(r.entries));
}

/// Keep the first `n` rows.
pub fn top_n<T>(mut rows: Vec<T>, n: usize) -> Vec<T> {
    rows.truncate(n);
    rows
}

/// Column sums over a medal table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MedalTotals {
    pub gold: u64,
    pub silver: u64,
    pub bronze: u64,
    pub total: u64,
}

impl MedalTotals {
    pub fn from_rows(rows: &[MedalCountRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, r| Self {
            gold: acc.gold + r.gold,
            silver: acc.silver + r.silver,
            bronze: acc.bronze + r.bronze,
            total: acc.total + r.total,
        })
    }

    pub fn count(&self, medal: Medal) -> u64 {
        match medal {
            Medal::Gold => self.gold,
            Medal::Silver => self.silver,
            Medal::Bronze => self.bronze,
        }
    }
}

/// Generate a text summary of medal totals.
pub fn generate_summary_text(totals: &MedalTotals) -> String {
    let mut parts: Vec<String> = Medal::ALL
        .iter()
        .map(|m| format!("{} {}: {}", m.emoji(), m, totals.count(*m)))
        .collect();
    parts.push(format!("Total: {}", totals.total));

    parts.join(" | ")
}
