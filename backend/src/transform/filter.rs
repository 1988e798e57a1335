//! Indicator and year-range selection.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::models::{LongTable, Observation};

/// How many indicators are preselected when the dashboard opens.
pub const DEFAULT_INDICATOR_COUNT: usize = 2;

/// A dashboard selection: which indicators, which Gregorian years (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub indicators: Vec<String>,
    pub year_from: i32,
    pub year_to: i32,
}

impl Selection {
    pub fn new(indicators: Vec<String>, year_from: i32, year_to: i32) -> Self {
        Self {
            indicators,
            year_from,
            year_to,
        }
    }

    /// Initial selection: the first two indicators and every year.
    ///
    /// `None` when the table has no dated observations.
    pub fn default_for(long: &LongTable) -> Option<Self> {
        let (year_from, year_to) = long.year_span()?;
        let indicators = long
            .indicators()
            .into_iter()
            .take(DEFAULT_INDICATOR_COUNT)
            .collect();
        Some(Self::new(indicators, year_from, year_to))
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.indicators.is_empty() {
            return Err(FilterError::NoIndicators);
        }
        if self.year_from > self.year_to {
            return Err(FilterError::InvalidRange {
                from: self.year_from,
                to: self.year_to,
            });
        }
        Ok(())
    }

    /// Reject indicators that are not part of `known`.
    pub fn validate_against(&self, known: &[String]) -> Result<(), FilterError> {
        self.validate()?;
        match self.indicators.iter().find(|i| !known.contains(i)) {
            Some(unknown) => Err(FilterError::UnknownIndicator(unknown.clone())),
            None => Ok(()),
        }
    }

    pub fn includes(&self, obs: &Observation) -> bool {
        let in_range = obs
            .year
            .is_some_and(|y| y >= self.year_from && y <= self.year_to);
        in_range && self.indicators.contains(&obs.indicator)
    }
}

/// Observations matching the selection, stably sorted by year.
pub fn filter(long: &LongTable, selection: &Selection) -> Vec<Observation> {
    let mut rows: Vec<Observation> = long
        .observations
        .iter()
        .filter(|o| selection.includes(o))
        .cloned()
        .collect();
    rows.sort_by_key(|o| o.year);
    rows
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

    fn sample() -> LongTable {
        LongTable::new(vec![
            obs("生産量", Some(2019), 1.0),
            obs("輸入量", Some(2019), 2.0),
            obs("消費量", Some(2019), 3.0),
            obs("生産量", Some(2018), 4.0),
            obs("輸入量", Some(2018), 5.0),
            obs("生産量", None, 6.0),
            obs("生産量", Some(2021), 7.0),
        ])
    }

    #[test]
    fn test_default_selection() {
        let sel = Selection::default_for(&sample()).unwrap();
        // sorted by code point: 消費量 < 生産量 < 輸入量
        assert_eq!(sel.indicators, vec!["消費量", "生産量"]);
        assert_eq!((sel.year_from, sel.year_to), (2018, 2021));
    }

    #[test]
    fn test_default_selection_with_one_indicator() {
        let long = LongTable::new(vec![obs("A", Some(2020), 1.0)]);
        let sel = Selection::default_for(&long).unwrap();
        assert_eq!(sel.indicators, vec!["A"]);
    }

    #[test]
    fn test_default_selection_without_years() {
        let long = LongTable::new(vec![obs("A", None, 1.0)]);
        assert!(Selection::default_for(&long).is_none());
    }

    #[test]
    fn test_filter_by_indicator_and_inclusive_range() {
        let sel = Selection::new(vec!["生産量".into()], 2018, 2019);
        let rows = filter(&sample(), &sel);

        let years: Vec<Option<i32>> = rows.iter().map(|o| o.year).collect();
        assert_eq!(years, vec![Some(2018), Some(2019)]);
        assert!(rows.iter().all(|o| o.indicator == "生産量"));
    }

    #[test]
    fn test_filter_is_stable_within_a_year() {
        let sel = Selection::new(vec!["生産量".into(), "輸入量".into()], 2018, 2018);
        let rows = filter(&sample(), &sel);
        let names: Vec<&str> = rows.iter().map(|o| o.indicator.as_str()).collect();
        assert_eq!(names, vec!["生産量", "輸入量"]);
    }

    #[test]
    fn test_undated_observations_never_match() {
        let sel = Selection::new(vec!["生産量".into()], i32::MIN, i32::MAX);
        assert_eq!(filter(&sample(), &sel).len(), 3);
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            Selection::new(vec![], 2018, 2020).validate(),
            Err(FilterError::NoIndicators)
        );
        assert_eq!(
            Selection::new(vec!["A".into()], 2021, 2020).validate(),
            Err(FilterError::InvalidRange { from: 2021, to: 2020 })
        );
        let known = vec!["A".to_string()];
        assert_eq!(
            Selection::new(vec!["B".into()], 2020, 2020).validate_against(&known),
            Err(FilterError::UnknownIndicator("B".into()))
        );
        assert!(Selection::new(vec!["A".into()], 2020, 2020)
            .validate_against(&known)
            .is_ok());
    }
}
