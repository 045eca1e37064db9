//! Row selection applied before aggregation.
//!
//! Mirrors the dashboard controls: sport and region dropdowns, the gender
//! picker, the season choice and the year range slider.

use crate::models::{ResultRow, ResultTable, Season, Sex};
use serde::Serialize;
use tracing::debug;

/// Dropdown choice meaning "no sport restriction".
pub const ALL_SPORTS: &str = "All Sports";

/// Dropdown choice meaning "no region restriction".
pub const ALL_REGIONS: &str = "All regions";

/// Conjunction of optional criteria. An empty filter keeps every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowFilter {
    pub sport: Option<String>,
    pub region: Option<String>,
    pub noc: Option<String>,
    pub sex: Option<Sex>,
    pub season: Option<Season>,
    /// Earliest year kept, inclusive.
    pub from_year: Option<i32>,
    /// Latest year kept, inclusive.
    pub to_year: Option<i32>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one sport; the [`ALL_SPORTS`] choice clears the restriction.
    pub fn with_sport(mut self, choice: &str) -> Self {
        self.sport = selection(choice, ALL_SPORTS);
        self
    }

    /// Restrict to one region; the [`ALL_REGIONS`] choice clears the restriction.
    pub fn with_region(mut self, choice: &str) -> Self {
        self.region = selection(choice, ALL_REGIONS);
        self
    }

    pub fn with_noc(mut self, noc: &str) -> Self {
        self.noc = Some(noc.trim().to_uppercase());
        self
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn with_season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    /// Keep years in `from..=to`; either bound may be open.
    pub fn with_years(mut self, from: Option<i32>, to: Option<i32>) -> Self {
        self.from_year = from;
        self.to_year = to;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether a row satisfies every criterion.
    ///
    /// A row missing an attribute that a criterion constrains never matches.
    pub fn matches(&self, row: &ResultRow) -> bool {
        if let Some(ref sport) = self.sport {
            if row.sport.as_deref() != Some(sport.as_str()) {
                return false;
            }
        }

        if let Some(ref region) = self.region {
            if row.region.as_deref() != Some(region.as_str()) {
                return false;
            }
        }

        if let Some(ref noc) = self.noc {
            if row.noc.as_deref() != Some(noc.as_str()) {
                return false;
            }
        }

        if self.sex.is_some() && row.sex != self.sex {
            return false;
        }

        if self.season.is_some() && row.season != self.season {
            return false;
        }

        if self.from_year.is_some() || self.to_year.is_some() {
            let Some(year) = row.year else {
                return false;
            };
            if self.from_year.is_some_and(|from| year < from) {
                return false;
            }
            if self.to_year.is_some_and(|to| year > to) {
                return false;
            }
        }

        true
    }

    /// Produce a new table holding only matching rows, with the same schema.
    pub fn apply(&self, table: &ResultTable) -> ResultTable {
        if self.is_empty() {
            return table.clone();
        }

        let rows: Vec<ResultRow> = table
            .rows()
            .iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect();

        debug!("Filter kept {} of {} rows", rows.len(), table.len());

        ResultTable::with_schema(rows, table.schema().to_vec())
    }

    /// One line per active criterion, for report metadata.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(ref sport) = self.sport {
            lines.push(format!("Sport = {}", sport));
        }
        if let Some(ref region) = self.region {
            lines.push(format!("region = {}", region));
        }
        if let Some(ref noc) = self.noc {
            lines.push(format!("NOC = {}", noc));
        }
        if let Some(sex) = self.sex {
            lines.push(format!("Sex = {}", sex));
        }
        if let Some(season) = self.season {
            lines.push(format!("Season = {}", season));
        }
        match (self.from_year, self.to_year) {
            (Some(from), Some(to)) => lines.push(format!("Year {}..={}", from, to)),
            (Some(from), None) => lines.push(format!("Year >= {}", from)),
            (None, Some(to)) => lines.push(format!("Year <= {}", to)),
            (None, None) => {}
        }

        lines
    }
}

fn selection(choice: &str, everything: &str) -> Option<String> {
    let choice = choice.trim();
    if choice.is_empty() || choice.eq_ignore_ascii_case(everything) {
        None
    } else {
        Some(choice.to_string())
    }
}
