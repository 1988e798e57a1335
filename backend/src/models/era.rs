//! Japanese era years.
//!
//! e-Stat labels its yearly columns with era years (`平成30年`, `令和元年`).
//! A Gregorian year is the era's base year plus the era year number.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The character closing every era year label.
pub const YEAR_SUFFIX: &str = "年";

/// First year of an era, written instead of `1`.
const FIRST_YEAR: &str = "元";

/// `<era><number>年` once the label is trimmed and digits are normalized.
/// Spaces around the number are tolerated (`平成 30 年`).
static ERA_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(昭和|平成|令和)\s*(\d+|元)\s*年$").expect("static era regex"));

/// Eras that appear in the supply/demand tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Era {
    /// 昭和 (1926-1989)
    Showa,
    /// 平成 (1989-2019)
    Heisei,
    /// 令和 (2019-)
    Reiwa,
}

impl Era {
    /// All supported eras, oldest first.
    pub const ALL: [Era; 3] = [Era::Showa, Era::Heisei, Era::Reiwa];

    /// Kanji name as printed in the labels.
    pub fn name(&self) -> &'static str {
        match self {
            Era::Showa => "昭和",
            Era::Heisei => "平成",
            Era::Reiwa => "令和",
        }
    }

    /// Gregorian year of era year 0.
    pub fn base_year(&self) -> i32 {
        match self {
            Era::Showa => 1925,
            Era::Heisei => 1988,
            Era::Reiwa => 2018,
        }
    }

    /// Find the era named in a label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|era| label.contains(era.name()))
    }

    /// Convert an era year number to a Gregorian year.
    ///
    /// `None` when the result does not fit in an `i32`.
    pub fn to_gregorian(&self, era_year: i32) -> Option<i32> {
        self.base_year().checked_add(era_year)
    }
}

/// Whether a column header names an era year.
///
/// This is the loose test used to pick year columns: an era name and `年`
/// anywhere in the label.
pub fn is_era_year_label(label: &str) -> bool {
    Era::from_label(label).is_some() && label.contains(YEAR_SUFFIX)
}

/// Convert an era year label (`令和5年`) to its Gregorian year.
///
/// Returns `None` for labels without an era, with extra text around the
/// number (`平成30年度`), or with a number that does not parse or overflows.
pub fn era_to_year(label: &str) -> Option<i32> {
    let normalized = normalize_digits(label.trim());
    let caps = ERA_YEAR_RE.captures(&normalized)?;
    let era = Era::from_label(&caps[1])?;
    let number = match &caps[2] {
        FIRST_YEAR => 1,
        digits => digits.parse::<i32>().ok()?,
    };
    era.to_gregorian(number)
}

/// Map full-width digits (０-９) to ASCII.
fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heisei_and_reiwa() {
        assert_eq!(era_to_year("平成30年"), Some(2018));
        assert_eq!(era_to_year("平成1年"), Some(1989));
        assert_eq!(era_to_year("令和5年"), Some(2023));
    }

    #[test]
    fn test_showa() {
        assert_eq!(era_to_year("昭和64年"), Some(1989));
        assert_eq!(era_to_year("昭和60年"), Some(1985));
    }

    #[test]
    fn test_first_year_of_era() {
        assert_eq!(era_to_year("令和元年"), Some(2019));
        assert_eq!(era_to_year("平成元年"), Some(1989));
    }

    #[test]
    fn test_surrounding_whitespace_and_fullwidth_digits() {
        assert_eq!(era_to_year("  令和2年 "), Some(2020));
        assert_eq!(era_to_year("令和３年"), Some(2021));
    }

    #[test]
    fn test_spaces_around_number() {
        assert_eq!(era_to_year("平成 30 年"), Some(2018));
        assert_eq!(era_to_year("令和 2年"), Some(2020));
        assert_eq!(era_to_year("令和　元年"), Some(2019));
    }

    #[test]
    fn test_out_of_range_number() {
        assert_eq!(era_to_year("令和2147483647年"), None);
        assert_eq!(era_to_year("令和99999999999年"), None);
        assert_eq!(Era::Reiwa.to_gregorian(i32::MAX), None);
        assert_eq!(era_to_year("令和2147481000年"), Some(2147483018));
    }

    #[test]
    fn test_rejects_non_year_labels() {
        assert_eq!(era_to_year("平成30年度"), None);
        assert_eq!(era_to_year("2020年"), None);
        assert_eq!(era_to_year("令和X年"), None);
        assert_eq!(era_to_year("各種チーズ"), None);
        assert_eq!(era_to_year(""), None);
    }

    #[test]
    fn test_year_label_predicate() {
        assert!(is_era_year_label("平成30年"));
        assert!(is_era_year_label("令和元年"));
        // loose predicate: suffixes still select the column
        assert!(is_era_year_label("平成30年度"));
        assert!(!is_era_year_label("平成"));
        assert!(!is_era_year_label("2020年"));
    }

    #[test]
    fn test_from_label() {
        assert_eq!(Era::from_label("令和4年"), Some(Era::Reiwa));
        assert_eq!(Era::from_label("unit"), None);
        assert_eq!(Era::Heisei.to_gregorian(31), Some(2019));
    }
}
