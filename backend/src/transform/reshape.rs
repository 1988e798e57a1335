//! Wide to long reshaping.
//!
//! ```text
//! Wide (e-Stat)                            Long
//! ┌──────────┬──────────┬──────────┐      ┌────────┬──────────┬────────┬──────┐
//! │ 各種チーズ │ 平成30年  │ 令和元年   │      │ 指標    │ 年        │ 値      │ 西暦  │
//! ├──────────┼──────────┼──────────┤  →   ├────────┼──────────┼────────┼──────┤
//! │ 生産量     │ 45,000   │ 46,500   │      │ 生産量  │ 平成30年  │ 45000  │ 2018 │
//! │ 輸入量     │ 280,000  │ -        │      │ 輸入量  │ 平成30年  │ 280000 │ 2018 │
//! └──────────┴──────────┴──────────┘      │ 生産量  │ 令和元年   │ 46500  │ 2019 │
//!                                          └────────┴──────────┴────────┴──────┘
//! ```

use crate::error::{ReshapeError, ReshapeResult};
use crate::models::{era_to_year, is_era_year_label, LongTable, Observation};
use crate::parser::RawTable;

/// Cell values e-Stat uses for "no data".
const MISSING_MARKERS: [&str; 3] = ["", "-", "***"];

/// Coerce an e-Stat cell to a number.
///
/// Thousands separators are removed. Missing markers and anything that is
/// not a float become `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let cleaned = cleaned.trim();
    if MISSING_MARKERS.contains(&cleaned) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// The indicator label column: the last header containing the marker.
///
/// e-Stat repeats the marker in code columns (`各種チーズ コード`) before the
/// name column, so the rightmost match is the human-readable one.
pub fn select_label_column(headers: &[String], marker: &str) -> ReshapeResult<usize> {
    headers
        .iter()
        .rposition(|h| h.contains(marker))
        .ok_or_else(|| ReshapeError::LabelColumnNotFound(marker.to_string()))
}

/// Era year columns, in header order.
pub fn select_year_columns(headers: &[String]) -> ReshapeResult<Vec<usize>> {
    let cols: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| is_era_year_label(h))
        .map(|(i, _)| i)
        .collect();

    if cols.is_empty() {
        return Err(ReshapeError::YearColumnsNotFound);
    }
    Ok(cols)
}

/// Melt the table into observations.
///
/// Column-major: every row of the first year column, then the second, and
/// so on. Missing values and unlabeled rows are dropped.
pub fn melt(table: &RawTable, label_col: usize, year_cols: &[usize]) -> LongTable {
    let mut observations = Vec::new();

    for &col in year_cols {
        let era_label = table.headers[col].clone();
        let year = era_to_year(&era_label);

        for row in 0..table.rows.len() {
            let indicator = table.cell(row, label_col).trim();
            if indicator.is_empty() {
                continue;
            }
            let Some(value) = parse_number(table.cell(row, col)) else {
                continue;
            };
            observations.push(Observation {
                indicator: indicator.to_string(),
                era_label: era_label.clone(),
                value,
                year,
            });
        }
    }

    LongTable::new(observations)
}

/// Select columns, melt, and check that something usable came out.
pub fn reshape(table: &RawTable, marker: &str) -> ReshapeResult<LongTable> {
    let label_col = select_label_column(&table.headers, marker)?;
    let year_cols = select_year_columns(&table.headers)?;

    let long = melt(table, label_col, &year_cols);

    let years = long.years().len();
    let indicators = long.indicators().len();
    if years == 0 || indicators == 0 {
        return Err(ReshapeError::EmptyResult { years, indicators });
    }

    Ok(long)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_table, DEFAULT_MARKER};

    fn table(csv: &str) -> RawTable {
        parse_table(csv, DEFAULT_MARKER, "utf-8").unwrap()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("45,000"), Some(45000.0));
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("***"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("x"), None);
        assert_eq!(parse_number("nan"), None);
    }

    #[test]
    fn test_label_column_is_last_match() {
        let headers: Vec<String> = ["各種チーズ コード", "各種チーズ", "単位"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(select_label_column(&headers, DEFAULT_MARKER).unwrap(), 1);
    }

    #[test]
    fn test_missing_label_column() {
        let headers = vec!["品目".to_string(), "令和2年".to_string()];
        let err = select_label_column(&headers, DEFAULT_MARKER).unwrap_err();
        assert!(matches!(err, ReshapeError::LabelColumnNotFound(_)));
    }

    #[test]
    fn test_missing_year_columns() {
        let headers = vec!["各種チーズ".to_string(), "2020".to_string()];
        assert!(matches!(
            select_year_columns(&headers),
            Err(ReshapeError::YearColumnsNotFound)
        ));
    }

    #[test]
    fn test_melt_column_major_and_drops_missing() {
        let t = table(
            "code,各種チーズ,平成30年,令和元年\n\
             1,生産量,\"45,000\",\"46,500\"\n\
             2,輸入量,\"280,000\",-\n",
        );
        let long = reshape(&t, DEFAULT_MARKER).unwrap();

        let got: Vec<(&str, Option<i32>, f64)> = long
            .observations
            .iter()
            .map(|o| (o.indicator.as_str(), o.year, o.value))
            .collect();
        assert_eq!(
            got,
            vec![
                ("生産量", Some(2018), 45000.0),
                ("輸入量", Some(2018), 280000.0),
                ("生産量", Some(2019), 46500.0),
            ]
        );
        assert_eq!(long.observations[2].era_label, "令和元年");
    }

    #[test]
    fn test_unconvertible_year_keeps_observation() {
        let t = table("各種チーズ,平成30年度,令和2年\nA,1,2\n");
        let long = reshape(&t, DEFAULT_MARKER).unwrap();

        assert_eq!(long.len(), 2);
        assert_eq!(long.observations[0].year, None);
        assert_eq!(long.years(), vec![2020]);
    }

    #[test]
    fn test_unlabeled_rows_dropped() {
        let t = table("各種チーズ,令和2年\n,5\nA,1\n");
        let long = reshape(&t, DEFAULT_MARKER).unwrap();
        assert_eq!(long.indicators(), vec!["A"]);
    }

    #[test]
    fn test_indicator_labels_trimmed() {
        let t = table("各種チーズ,令和2年,令和3年\n 生産量 ,1,\n生産量,,2\n");
        let long = reshape(&t, DEFAULT_MARKER).unwrap();
        assert_eq!(long.indicators(), vec!["生産量"]);
        assert_eq!(long.len(), 2);
    }

    #[test]
    fn test_all_missing_is_empty_result() {
        let t = table("各種チーズ,令和2年\nA,-\nB,***\n");
        let err = reshape(&t, DEFAULT_MARKER).unwrap_err();
        assert!(matches!(err, ReshapeError::EmptyResult { years: 0, indicators: 0 }));
    }
}
