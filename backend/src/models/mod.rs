//! Domain models for the cheese supply/demand series.
//!
//! - [`Observation`] - one (indicator, year, value) row of the long table
//! - [`LongTable`] - the melted series
//! - [`WideTable`] - year x indicator pivot used by the charts
//! - [`era`] - Japanese era year conversion

pub mod era;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub use era::{era_to_year, is_era_year_label, Era};

// =============================================================================
// Long format
// =============================================================================

/// One value of one indicator for one era year.
///
/// Serialized with the column names the dashboard displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Indicator name (production, imports, consumption, ...).
    #[serde(rename = "指標")]
    pub indicator: String,
    /// Era year label as printed in the source header.
    #[serde(rename = "年")]
    pub era_label: String,
    /// Value in the indicator's own unit.
    #[serde(rename = "値")]
    pub value: f64,
    /// Gregorian year, `None` when the label could not be converted.
    #[serde(rename = "西暦")]
    pub year: Option<i32>,
}

/// The melted series: one [`Observation`] per non-empty cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTable {
    pub observations: Vec<Observation>,
}

impl LongTable {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sorted distinct Gregorian years. Unconvertible labels are left out.
    pub fn years(&self) -> Vec<i32> {
        self.observations
            .iter()
            .filter_map(|o| o.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct indicator names.
    pub fn indicators(&self) -> Vec<String> {
        self.observations
            .iter()
            .map(|o| o.indicator.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Smallest and largest year, if any.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let years = self.years();
        Some((*years.first()?, *years.last()?))
    }
}

// =============================================================================
// Wide format
// =============================================================================

/// Year x indicator table. `cells[row][col]` is the value of
/// `indicators[col]` in `years[row]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WideTable {
    pub years: Vec<i32>,
    pub indicators: Vec<String>,
    pub cells: Vec<Vec<Option<f64>>>,
}

impl WideTable {
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Column position of an indicator.
    pub fn column(&self, indicator: &str) -> Option<usize> {
        self.indicators.iter().position(|i| i == indicator)
    }

    /// Row position of a year.
    pub fn row(&self, year: i32) -> Option<usize> {
        self.years.binary_search(&year).ok()
    }

    /// Value at (year, indicator).
    pub fn get(&self, year: i32, indicator: &str) -> Option<f64> {
        let row = self.row(year)?;
        let col = self.column(indicator)?;
        self.cells.get(row)?.get(col).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(indicator: &str, year: Option<i32>, value: f64) -> Observation {
        Observation {
            indicator: indicator.to_string(),
            era_label: String::new(),
            value,
            year,
        }
    }

    #[test]
    fn test_years_sorted_distinct_without_unknown() {
        let table = LongTable::new(vec![
            obs("輸入量", Some(2020), 1.0),
            obs("生産量", Some(2018), 2.0),
            obs("生産量", None, 3.0),
            obs("輸入量", Some(2018), 4.0),
        ]);
        assert_eq!(table.years(), vec![2018, 2020]);
        assert_eq!(table.year_span(), Some((2018, 2020)));
    }

    #[test]
    fn test_indicators_sorted_distinct() {
        let table = LongTable::new(vec![
            obs("b", Some(2020), 1.0),
            obs("a", Some(2020), 1.0),
            obs("b", Some(2021), 1.0),
        ]);
        assert_eq!(table.indicators(), vec!["a", "b"]);
    }

    #[test]
    fn test_observation_column_names() {
        let json = serde_json::to_value(obs("生産量", Some(2019), 10.5)).unwrap();
        assert_eq!(json["指標"], "生産量");
        assert_eq!(json["値"], 10.5);
        assert_eq!(json["西暦"], 2019);
    }

    #[test]
    fn test_wide_lookup() {
        let wide = WideTable {
            years: vec![2018, 2019],
            indicators: vec!["a".into(), "b".into()],
            cells: vec![vec![Some(1.0), None], vec![Some(2.0), Some(3.0)]],
        };
        assert_eq!(wide.get(2019, "b"), Some(3.0));
        assert_eq!(wide.get(2018, "b"), None);
        assert_eq!(wide.get(2017, "a"), None);
    }
}
