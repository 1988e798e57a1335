//! Long to wide pivot for the charts.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Observation, WideTable};

/// Pivot observations into a year x indicator table.
///
/// Rows are the sorted distinct years, columns the sorted distinct
/// indicators. Several values for the same cell are averaged; absent
/// cells are `None`. Undated observations are ignored.
pub fn pivot(observations: &[Observation]) -> WideTable {
    let mut sums: BTreeMap<(i32, &str), (f64, usize)> = BTreeMap::new();
    let mut indicators: BTreeSet<&str> = BTreeSet::new();

    for obs in observations {
        let Some(year) = obs.year else { continue };
        indicators.insert(obs.indicator.as_str());
        let entry = sums.entry((year, obs.indicator.as_str())).or_insert((0.0, 0));
        entry.0 += obs.value;
        entry.1 += 1;
    }

    let years: Vec<i32> = sums
        .keys()
        .map(|(y, _)| *y)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let indicators: Vec<&str> = indicators.into_iter().collect();

    let cells = years
        .iter()
        .map(|&year| {
            indicators
                .iter()
                .map(|&ind| sums.get(&(year, ind)).map(|(sum, n)| sum / *n as f64))
                .collect()
        })
        .collect();

    WideTable {
        years,
        indicators: indicators.into_iter().map(String::from).collect(),
        cells,
    }
}
