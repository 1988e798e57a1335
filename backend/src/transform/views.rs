//! Chart views derived from a selection: bar snapshot, scatter pairs and
//! the first/last year comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ViewError;
use crate::models::{Observation, WideTable};

// =============================================================================
// Bar
// =============================================================================

/// One bar of the single-year comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub indicator: String,
    pub value: Option<f64>,
}

/// Every indicator's value in one year. Defaults to the latest year.
pub fn bar_snapshot(wide: &WideTable, year: Option<i32>) -> Result<(i32, Vec<Bar>), ViewError> {
    let year = match year {
        Some(y) => y,
        None => *wide.years.last().ok_or(ViewError::InsufficientData)?,
    };
    let row = wide.row(year).ok_or(ViewError::YearNotFound(year))?;

    let bars = wide
        .indicators
        .iter()
        .zip(&wide.cells[row])
        .map(|(indicator, value)| Bar {
            indicator: indicator.clone(),
            value: *value,
        })
        .collect();

    Ok((year, bars))
}

// =============================================================================
// Scatter
// =============================================================================

/// Points for an x/y scatter of two indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scatter {
    pub x_indicator: String,
    pub y_indicator: String,
    pub points: Vec<(f64, f64)>,
    /// Both axes show the same indicator.
    pub same_axis: bool,
}

/// Years where both indicators have a value.
///
/// `selected` is the number of indicators in the selection; a scatter needs
/// at least two even if the same one ends up on both axes.
pub fn scatter_pairs(
    wide: &WideTable,
    selected: usize,
    x: &str,
    y: &str,
) -> Result<Scatter, ViewError> {
    if selected < 2 {
        return Err(ViewError::NeedTwoIndicators);
    }
    let (Some(xc), Some(yc)) = (wide.column(x), wide.column(y)) else {
        return Err(ViewError::InsufficientData);
    };

    let points: Vec<(f64, f64)> = wide
        .cells
        .iter()
        .filter_map(|row| Some((row[xc]?, row[yc]?)))
        .collect();

    if points.is_empty() {
        return Err(ViewError::InsufficientData);
    }

    Ok(Scatter {
        x_indicator: x.to_string(),
        y_indicator: y.to_string(),
        points,
        same_axis: x == y,
    })
}

// =============================================================================
// Trend
// =============================================================================

/// Direction of change between the first and last year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Flat,
}

impl Direction {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Direction::Increase
        } else if delta < 0.0 {
            Direction::Decrease
        } else {
            Direction::Flat
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Increase => "増加",
            Direction::Decrease => "減少",
            Direction::Flat => "横ばい",
        }
    }
}

/// First-versus-last comparison of one indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Trend {
    #[serde(rename_all = "camelCase")]
    Compared {
        indicator: String,
        first_year: i32,
        last_year: i32,
        first_value: f64,
        last_value: f64,
        delta: f64,
        direction: Direction,
    },
    /// Fewer than two distinct years in range.
    InsufficientData { indicator: String },
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Compared {
                indicator,
                first_year,
                last_year,
                delta,
                direction,
                ..
            } => write!(
                f,
                "『{}』は {}年→{}年で {}（差分 {:.2}）です。",
                indicator,
                first_year,
                last_year,
                direction.label(),
                delta
            ),
            Trend::InsufficientData { .. } => {
                write!(f, "期間内のデータ点が少ないため、増減の自動判定ができません。")
            }
        }
    }
}

/// Compare the first and last observation of `indicator`.
///
/// `observations` must already be sorted by year (as [`super::filter::filter`]
/// returns them). When a year has several values, the first one in order
/// opens the range and the last one closes it.
pub fn trend(observations: &[Observation], indicator: &str) -> Trend {
    let series: Vec<(i32, f64)> = observations
        .iter()
        .filter(|o| o.indicator == indicator)
        .filter_map(|o| Some((o.year?, o.value)))
        .collect();

    let distinct_years = {
        let mut years: Vec<i32> = series.iter().map(|(y, _)| *y).collect();
        years.dedup();
        years.len()
    };

    match (series.first(), series.last()) {
        (Some(&(first_year, first_value)), Some(&(last_year, last_value))) if distinct_years >= 2 => {
            let delta = last_value - first_value;
            Trend::Compared {
                indicator: indicator.to_string(),
                first_year,
                last_year,
                first_value,
                last_value,
                delta,
                direction: Direction::from_delta(delta),
            }
        }
        _ => Trend::InsufficientData {
            indicator: indicator.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pivot::pivot;

    fn obs(indicator: &str, year: i32, value: f64) -> Observation {
        Observation {
            indicator: indicator.to_string(),
            era_label: String::new(),
            value,
            year: Some(year),
        }
    }

    fn wide() -> WideTable {
        pivot(&[
            obs("a", 2018, 1.0),
            obs("b", 2018, 10.0),
            obs("a", 2019, 2.0),
            obs("a", 2020, 3.0),
            obs("b", 2020, 30.0),
        ])
    }

    #[test]
    fn test_bar_defaults_to_last_year() {
        let (year, bars) = bar_snapshot(&wide(), None).unwrap();
        assert_eq!(year, 2020);
        assert_eq!(bars[0], Bar { indicator: "a".into(), value: Some(3.0) });
        assert_eq!(bars[1].value, Some(30.0));
    }

    #[test]
    fn test_bar_specific_and_missing_year() {
        let (_, bars) = bar_snapshot(&wide(), Some(2019)).unwrap();
        assert_eq!(bars[1].value, None);
        assert_eq!(bar_snapshot(&wide(), Some(2000)), Err(ViewError::YearNotFound(2000)));
        assert_eq!(
            bar_snapshot(&WideTable::default(), None),
            Err(ViewError::InsufficientData)
        );
    }

    #[test]
    fn test_scatter_drops_incomplete_rows() {
        let scatter = scatter_pairs(&wide(), 2, "a", "b").unwrap();
        assert_eq!(scatter.points, vec![(1.0, 10.0), (3.0, 30.0)]);
        assert!(!scatter.same_axis);
    }

    #[test]
    fn test_scatter_errors() {
        assert_eq!(
            scatter_pairs(&wide(), 1, "a", "b"),
            Err(ViewError::NeedTwoIndicators)
        );
        assert_eq!(
            scatter_pairs(&wide(), 2, "a", "zzz"),
            Err(ViewError::InsufficientData)
        );
        let sparse = pivot(&[obs("a", 2018, 1.0), obs("b", 2019, 2.0)]);
        assert_eq!(
            scatter_pairs(&sparse, 2, "a", "b"),
            Err(ViewError::InsufficientData)
        );
    }

    #[test]
    fn test_scatter_same_axis() {
        let scatter = scatter_pairs(&wide(), 2, "a", "a").unwrap();
        assert!(scatter.same_axis);
        assert_eq!(scatter.points.len(), 3);
    }

    #[test]
    fn test_trend_increase_message() {
        let rows = vec![obs("生産量", 2018, 100.0), obs("生産量", 2020, 112.5)];
        let t = trend(&rows, "生産量");

        match &t {
            Trend::Compared { direction, delta, .. } => {
                assert_eq!(*direction, Direction::Increase);
                assert_eq!(*delta, 12.5);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(t.to_string(), "『生産量』は 2018年→2020年で 増加（差分 12.50）です。");
    }

    #[test]
    fn test_trend_decrease_and_flat() {
        let down = trend(&[obs("a", 2018, 5.0), obs("a", 2019, 1.0)], "a");
        assert!(matches!(down, Trend::Compared { direction: Direction::Decrease, .. }));

        let flat = trend(&[obs("a", 2018, 5.0), obs("a", 2019, 5.0)], "a");
        assert!(matches!(flat, Trend::Compared { direction: Direction::Flat, .. }));
    }

    #[test]
    fn test_trend_needs_two_years() {
        let single = trend(&[obs("a", 2018, 5.0), obs("a", 2018, 6.0)], "a");
        assert!(matches!(single, Trend::InsufficientData { .. }));
        assert!(single.to_string().contains("増減の自動判定ができません"));

        let none = trend(&[], "a");
        assert!(matches!(none, Trend::InsufficientData { .. }));
    }
}
