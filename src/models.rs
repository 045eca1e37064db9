//! Data models for Olympic results.
//!
//! This module contains the typed records that the loader produces and the
//! aggregation engine consumes.

use crate::analysis::{Dimension, MedalTotals, Tally};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Medal outcome of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    /// All medal kinds, podium order.
    pub const ALL: [Medal; 3] = [Medal::Gold, Medal::Silver, Medal::Bronze];

    /// Position of this medal in [`Medal::ALL`].
    pub fn index(self) -> usize {
        match self {
            Medal::Gold => 0,
            Medal::Silver => 1,
            Medal::Bronze => 2,
        }
    }

    /// Returns an emoji representation of the medal.
    pub fn emoji(&self) -> &'static str {
        match self {
            Medal::Gold => "🥇",
            Medal::Silver => "🥈",
            Medal::Bronze => "🥉",
        }
    }
}

impl fmt::Display for Medal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Medal::Gold => write!(f, "Gold"),
            Medal::Silver => write!(f, "Silver"),
            Medal::Bronze => write!(f, "Bronze"),
        }
    }
}

impl FromStr for Medal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gold" => Ok(Medal::Gold),
            "silver" => Ok(Medal::Silver),
            "bronze" => Ok(Medal::Bronze),
            other => Err(format!("unknown medal: {}", other)),
        }
    }
}

/// Athlete sex as recorded in the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    /// The single-letter code used in the source data.
    pub fn code(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            other => Err(format!("unknown sex: {}", other)),
        }
    }
}

/// Olympic season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Winter,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Summer => write!(f, "Summer"),
            Season::Winter => write!(f, "Winter"),
        }
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "summer" => Ok(Season::Summer),
            "winter" => Ok(Season::Winter),
            other => Err(format!("unknown season: {}", other)),
        }
    }
}

/// One (athlete, event) entry.
///
/// Every attribute except the identifier may be absent in the source data;
/// absent attributes never take part in a grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Athlete identifier.
    pub id: u32,
    /// Athlete name.
    pub name: Option<String>,
    pub sex: Option<Sex>,
    /// Age in years at the time of the games.
    pub age: Option<u32>,
    /// Height in centimetres.
    pub height: Option<f64>,
    /// Weight in kilograms.
    pub weight: Option<f64>,
    pub team: Option<String>,
    /// Three-letter National Olympic Committee code.
    pub noc: Option<String>,
    /// Games label, e.g. "2016 Summer".
    pub games: Option<String>,
    pub year: Option<i32>,
    pub season: Option<Season>,
    pub city: Option<String>,
    pub sport: Option<String>,
    pub event: Option<String>,
    /// Medal won, `None` when the entry did not reach the podium.
    pub medal: Option<Medal>,
    /// Country name joined from the NOC lookup.
    pub region: Option<String>,
}

/// An immutable table of results together with the columns its source carried.
#[derive(Debug, Clone, Default)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
    schema: Vec<Dimension>,
}

impl ResultTable {
    /// Build a table from in-memory rows.
    ///
    /// Every dimension is declared present except `region`, which is present
    /// only if at least one row carries a region.
    pub fn new(rows: Vec<ResultRow>) -> Self {
        let has_region = rows.iter().any(|r| r.region.is_some());
        let schema = Dimension::ALL
            .iter()
            .copied()
            .filter(|d| *d != Dimension::Region || has_region)
            .collect();

        Self { rows, schema }
    }

    /// Build a table with an explicit schema.
    pub fn with_schema(rows: Vec<ResultRow>, schema: Vec<Dimension>) -> Self {
        Self { rows, schema }
    }

    /// Attach country names by NOC code and declare the `region` column.
    ///
    /// Rows whose NOC is not in the lookup keep whatever region they had.
    pub fn with_regions(mut self, regions: &HashMap<String, String>) -> Self {
        for row in &mut self.rows {
            if let Some(region) = row.noc.as_ref().and_then(|noc| regions.get(noc)) {
                row.region = Some(region.clone());
            }
        }

        if !self.schema.contains(&Dimension::Region) {
            self.schema.push(Dimension::Region);
        }

        self
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn schema(&self) -> &[Dimension] {
        &self.schema
    }

    /// Whether the source carried the given column.
    pub fn has_column(&self, dimension: Dimension) -> bool {
        self.schema.contains(&dimension)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of entries that won a medal.
    pub fn medal_count(&self) -> usize {
        self.rows.iter().filter(|r| r.medal.is_some()).count()
    }
}

/// Metadata about a tally report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Path of the results file.
    pub source: String,
    /// Grouping columns, in key order.
    pub dimensions: Vec<String>,
    /// Display labels of the grouping columns, in key order.
    pub dimension_labels: Vec<String>,
    /// Active row filters, one per line.
    pub filters: Vec<String>,
    /// Sort column, if the rows were re-sorted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorted_by: Option<String>,
    /// Row limit, if the rows were truncated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
    /// Number of result rows fed to the aggregation.
    pub rows_considered: usize,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// A complete tally report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Column sums, present for medal tallies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<MedalTotals>,
    pub tally: Tally,
}

impl Report {
    /// Build a report, deriving totals from the tally.
    pub fn new(metadata: ReportMetadata, tally: Tally) -> Self {
        let totals = match tally {
            Tally::Medals(ref rows) => Some(MedalTotals::from_rows(rows)),
            Tally::Entries(_) => None,
        };

        Self {
            metadata,
            totals,
            tally,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medal_ordering() {
        assert!(Medal::Gold < Medal::Silver);
        assert!(Medal::Silver < Medal::Bronze);
        assert_eq!(Medal::ALL.map(Medal::index), [0, 1, 2]);
    }

    #[test]
    fn test_medal_from_str() {
        assert_eq!("Gold".parse::<Medal>(), Ok(Medal::Gold));
        assert_eq!(" silver ".parse::<Medal>(), Ok(Medal::Silver));
        assert_eq!("BRONZE".parse::<Medal>(), Ok(Medal::Bronze));
        assert!("NA".parse::<Medal>().is_err());
    }

    #[test]
    fn test_sex_and_season_from_str() {
        assert_eq!("F".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!("male".parse::<Sex>(), Ok(Sex::Male));
        assert!("X".parse::<Sex>().is_err());
        assert_eq!("Winter".parse::<Season>(), Ok(Season::Winter));
        assert!("Spring".parse::<Season>().is_err());
    }

    #[test]
    fn test_table_schema_without_region() {
        let table = ResultTable::new(vec![ResultRow::default()]);
        assert!(table.has_column(Dimension::Year));
        assert!(!table.has_column(Dimension::Region));
    }

    #[test]
    fn test_with_regions() {
        let rows = vec![
            ResultRow {
                id: 1,
                noc: Some("CAN".to_string()),
                ..Default::default()
            },
            ResultRow {
                id: 2,
                noc: Some("XYZ".to_string()),
                ..Default::default()
            },
        ];
        let regions: HashMap<String, String> =
            [("CAN".to_string(), "Canada".to_string())].into_iter().collect();

        let table = ResultTable::new(rows).with_regions(&regions);

        assert!(table.has_column(Dimension::Region));
        assert_eq!(table.rows()[0].region.as_deref(), Some("Canada"));
        assert_eq!(table.rows()[1].region, None);
    }

    #[test]
    fn test_report_totals_only_for_medals() {
        use crate::analysis::{DimensionValue, EntryCountRow, MedalCountRow};

        let metadata = ReportMetadata {
            source: "results.csv".to_string(),
            dimensions: vec!["Year".to_string()],
            dimension_labels: vec!["Year".to_string()],
            filters: Vec::new(),
            sorted_by: None,
            top: None,
            rows_considered: 3,
            generated_at: Utc::now(),
            duration_seconds: 0.1,
        };

        let medals = Report::new(
            metadata.clone(),
            Tally::Medals(vec![MedalCountRow::from_counts(
                vec![DimensionValue::Int(2000)],
                [1, 1, 0],
            )]),
        );
        assert_eq!(medals.totals.map(|t| t.total), Some(2));

        let entries = Report::new(
            metadata,
            Tally::Entries(vec![EntryCountRow {
                key: vec![DimensionValue::Int(2000)],
                entries: 3,
            }]),
        );
        assert!(entries.totals.is_none());
    }

    #[test]
    fn test_medal_count() {
        let rows = vec![
            ResultRow {
                medal: Some(Medal::Gold),
                ..Default::default()
            },
            ResultRow::default(),
        ];
        assert_eq!(ResultTable::new(rows).medal_count(), 1);
    }
}
