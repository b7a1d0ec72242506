use crate::error::{Result, StatementError};
use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A reporting month in `YYYY-MM` form.
///
/// The inner string is always zero-padded and fixed-width, so the derived
/// lexicographic ordering is also chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let bytes = trimmed.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || b.is_ascii_digit());

        if !well_formed {
            return Err(StatementError::InvalidMonthKey(raw.to_string()));
        }

        // Reject month 00 / 13 etc.
        NaiveDate::parse_from_str(&format!("{}-01", trimmed), "%Y-%m-%d")
            .map_err(|_| StatementError::InvalidMonthKey(raw.to_string()))?;

        Ok(Self(trimmed.to_string()))
    }

    pub fn from_ymd(year: i32, month: u32) -> Result<Self> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return Err(StatementError::InvalidMonthKey(format!(
                "{}-{}",
                year, month
            )));
        }
        Ok(Self(format!("{:04}-{:02}", year, month)))
    }

    pub fn from_date(date: NaiveDate) -> Result<Self> {
        Self::from_ymd(date.year(), date.month())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.0[..4].parse().unwrap_or_default()
    }

    pub fn month(&self) -> u32 {
        self.0[5..].parse().unwrap_or_default()
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), 1)
    }

    /// The following month, or `None` past year 9999.
    pub fn next(&self) -> Option<Self> {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        Self::from_ymd(year, month).ok()
    }

    /// Whole months from `start` to `self`; negative when `self` is earlier.
    pub fn months_since(&self, start: &MonthKey) -> i32 {
        let year_diff = self.year() - start.year();
        let month_diff = self.month() as i32 - start.month() as i32;
        year_diff * 12 + month_diff
    }

    /// Inclusive list of month keys from `start` to `end`. Empty when `end < start`.
    pub fn range(start: &MonthKey, end: &MonthKey) -> Vec<MonthKey> {
        let mut months = Vec::new();
        let mut current = Some(start.clone());

        while let Some(month) = current {
            if month > *end {
                break;
            }
            current = month.next();
            months.push(month);
        }

        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MonthKey {
    type Err = StatementError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = StatementError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}

/// Parses a user-entered cell value.
///
/// Empty input, unparseable text and non-finite results all become `0.0`.
/// Surrounding whitespace, a leading `$` and thousands separators are tolerated.
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '$' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!("Coercing unparseable amount '{}' to 0", raw);
            0.0
        }
    }
}

/// Replaces NaN and infinities with zero.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `numerator / denominator * 100`, or 0 when the denominator is not positive.
pub fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        finite_or_zero(numerator / denominator * 100.0)
    } else {
        0.0
    }
}
