//! Grouping dimensions and aggregation keys.

use crate::error::AggregateError;
use crate::models::ResultRow;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A result attribute that rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Id,
    Name,
    Sex,
    Age,
    Height,
    Weight,
    Team,
    Noc,
    Games,
    Year,
    Season,
    City,
    Sport,
    Event,
    Region,
}

impl Dimension {
    pub const ALL: [Dimension; 15] = [
        Dimension::Id,
        Dimension::Name,
        Dimension::Sex,
        Dimension::Age,
        Dimension::Height,
        Dimension::Weight,
        Dimension::Team,
        Dimension::Noc,
        Dimension::Games,
        Dimension::Year,
        Dimension::Season,
        Dimension::City,
        Dimension::Sport,
        Dimension::Event,
        Dimension::Region,
    ];

    /// Header name of the column in the results file.
    pub fn column_name(&self) -> &'static str {
        match self {
            Dimension::Id => "ID",
            Dimension::Name => "Name",
            Dimension::Sex => "Sex",
            Dimension::Age => "Age",
            Dimension::Height => "Height",
            Dimension::Weight => "Weight",
            Dimension::Team => "Team",
            Dimension::Noc => "NOC",
            Dimension::Games => "Games",
            Dimension::Year => "Year",
            Dimension::Season => "Season",
            Dimension::City => "City",
            Dimension::Sport => "Sport",
            Dimension::Event => "Event",
            Dimension::Region => "region",
        }
    }

    /// Human-readable label for report headings.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Id => "Athlete ID",
            Dimension::Name => "Athlete",
            Dimension::Sex => "Athlete genders",
            Dimension::Age => "Athlete ages",
            Dimension::Height => "Height (centimetres)",
            Dimension::Weight => "Weight (kilograms)",
            Dimension::Team => "Team",
            Dimension::Noc => "Country code",
            Dimension::Games => "Year & Season",
            Dimension::Year => "Year",
            Dimension::Season => "Season",
            Dimension::City => "City",
            Dimension::Sport => "Sport",
            Dimension::Event => "Sport event",
            Dimension::Region => "Region",
        }
    }

    /// Extract this dimension's value from a row, `None` when absent.
    pub fn value_of(&self, row: &ResultRow) -> Option<DimensionValue> {
        match self {
            Dimension::Id => Some(DimensionValue::Int(i64::from(row.id))),
            Dimension::Name => row.name.clone().map(DimensionValue::Text),
            Dimension::Sex => row.sex.map(|s| DimensionValue::Text(s.code().to_string())),
            Dimension::Age => row.age.map(|a| DimensionValue::Int(i64::from(a))),
            Dimension::Height => row.height.map(DimensionValue::number),
            Dimension::Weight => row.weight.map(DimensionValue::number),
            Dimension::Team => row.team.clone().map(DimensionValue::Text),
            Dimension::Noc => row.noc.clone().map(DimensionValue::Text),
            Dimension::Games => row.games.clone().map(DimensionValue::Text),
            Dimension::Year => row.year.map(|y| DimensionValue::Int(i64::from(y))),
            Dimension::Season => row.season.map(|s| DimensionValue::Text(s.to_string())),
            Dimension::City => row.city.clone().map(DimensionValue::Text),
            Dimension::Sport => row.sport.clone().map(DimensionValue::Text),
            Dimension::Event => row.event.clone().map(DimensionValue::Text),
            Dimension::Region => row.region.clone().map(DimensionValue::Text),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl FromStr for Dimension {
    type Err = AggregateError;

    /// Column names match case-insensitively; `Medal` is the pivot column
    /// and never a dimension.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.column_name().eq_ignore_ascii_case(name))
            .ok_or_else(|| AggregateError::FieldNotFound(name.to_string()))
    }
}

/// The value of one dimension for one row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Int(i64),
    Number(OrderedFloat<f64>),
    Text(String),
}

impl DimensionValue {
    pub fn number(value: f64) -> Self {
        DimensionValue::Number(OrderedFloat(value))
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Int(v) => write!(f, "{}", v),
            DimensionValue::Number(v) => write!(f, "{}", v.0),
            DimensionValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for DimensionValue {
    fn from(value: i64) -> Self {
        DimensionValue::Int(value)
    }
}

impl From<&str> for DimensionValue {
    fn from(value: &str) -> Self {
        DimensionValue::Text(value.to_string())
    }
}

/// Ordered, non-empty, duplicate-free list of grouping dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AggregationKey(Vec<Dimension>);

impl AggregationKey {
    /// Build a key, collapsing repeated dimensions to their first occurrence.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Result<Self, AggregateError> {
        let mut unique: Vec<Dimension> = Vec::new();
        for dimension in dimensions {
            if !unique.contains(&dimension) {
                unique.push(dimension);
            }
        }

        if unique.is_empty() {
            return Err(AggregateError::EmptyKey);
        }

        Ok(Self(unique))
    }

    /// Build a key from column names.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, AggregateError> {
        let dimensions = names
            .iter()
            .map(|n| n.as_ref().parse::<Dimension>())
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(dimensions)
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The key tuple of a row, `None` if any dimension is absent on it.
    pub fn values_of(&self, row: &ResultRow) -> Option<Vec<DimensionValue>> {
        self.0.iter().map(|d| d.value_of(row)).collect()
    }

    /// Column names in key order.
    pub fn column_names(&self) -> Vec<String> {
        self.0.iter().map(|d| d.column_name().to_string()).collect()
    }

    /// Display labels in key order.
    pub fn labels(&self) -> Vec<String> {
        self.0.iter().map(|d| d.label().to_string()).collect()
    }
}

impl FromStr for AggregationKey {
    type Err = AggregateError;

    /// Parses a comma-separated list such as `Year,Season`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = s.split(',').filter(|n| !n.trim().is_empty()).collect();
        Self::parse(&names)
    }
}

impl fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medal, Season, Sex};

    fn sample_row() -> ResultRow {
        ResultRow {
            id: 7,
            name: Some("Jane Doe".to_string()),
            sex: Some(Sex::Female),
            age: Some(24),
            height: Some(172.5),
            weight: None,
            year: Some(2000),
            season: Some(Season::Summer),
            sport: Some("Rowing".to_string()),
            medal: Some(Medal::Gold),
            ..Default::default()
        }
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("Year".parse::<Dimension>(), Ok(Dimension::Year));
        assert_eq!("noc".parse::<Dimension>(), Ok(Dimension::Noc));
        assert_eq!("Region".parse::<Dimension>(), Ok(Dimension::Region));
        assert_eq!(
            "Medal".parse::<Dimension>(),
            Err(AggregateError::FieldNotFound("Medal".to_string()))
        );
        assert_eq!(
            "Colour".parse::<Dimension>(),
            Err(AggregateError::FieldNotFound("Colour".to_string()))
        );
    }

    #[test]
    fn test_value_of() {
        let row = sample_row();
        assert_eq!(Dimension::Id.value_of(&row), Some(DimensionValue::Int(7)));
        assert_eq!(Dimension::Sex.value_of(&row), Some("F".into()));
        assert_eq!(Dimension::Season.value_of(&row), Some("Summer".into()));
        assert_eq!(
            Dimension::Height.value_of(&row),
            Some(DimensionValue::number(172.5))
        );
        assert_eq!(Dimension::Weight.value_of(&row), None);
    }

    #[test]
    fn test_key_collapses_duplicates() {
        let key = AggregationKey::parse(&["Year", "Sport", "year"]).unwrap();
        assert_eq!(key.dimensions(), &[Dimension::Year, Dimension::Sport]);
    }

    #[test]
    fn test_key_rejects_empty() {
        assert_eq!(AggregationKey::new(Vec::<Dimension>::new()), Err(AggregateError::EmptyKey));
        assert_eq!(" , ".parse::<AggregationKey>(), Err(AggregateError::EmptyKey));
    }

    #[test]
    fn test_key_values_of() {
        let row = sample_row();
        let key: AggregationKey = "Year,Sport".parse().unwrap();
        assert_eq!(
            key.values_of(&row),
            Some(vec![DimensionValue::Int(2000), "Rowing".into()])
        );

        let with_absent: AggregationKey = "Year,Weight".parse().unwrap();
        assert_eq!(with_absent.values_of(&row), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(DimensionValue::Int(1996).to_string(), "1996");
        assert_eq!(DimensionValue::number(180.0).to_string(), "180");
        assert_eq!(DimensionValue::from("Oslo").to_string(), "Oslo");
        assert_eq!(
            AggregationKey::parse(&["Year", "Season"]).unwrap().to_string(),
            "Year, Season"
        );
    }

    #[test]
    fn test_key_labels_follow_key_order() {
        let key: AggregationKey = "Age,region,NOC".parse().unwrap();
        assert_eq!(key.labels(), vec!["Athlete ages", "Region", "Country code"]);
        assert_eq!(key.column_names(), vec!["Age", "region", "NOC"]);
    }
}
