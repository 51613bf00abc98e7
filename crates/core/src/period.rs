//! Calendar months used for invoices and dashboard comparisons.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Month number, 1-12.
    pub month: u32,
}

impl Period {
    /// Creates a period, rejecting months outside 1-12 and unrepresentable years.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Period` when the pair is not a calendar month.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or(ValidationError::Period)
    }

    /// Parses year and month from query-string text such as `"2022"` and `"03"`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Period` for non-numeric or out-of-range input.
    pub fn parse(year: &str, month: &str) -> Result<Self, ValidationError> {
        let year = year.trim().parse().map_err(|_| ValidationError::Period)?;
        let month = month.trim().parse().map_err(|_| ValidationError::Period)?;
        Self::new(year, month)
    }

    /// The month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if `date` falls within the month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// The month before this one.
    #[must_use]
    pub fn previous(self) -> Self {
        self.months_back(1)
    }

    /// The month `n` months before this one.
    #[must_use]
    pub fn months_back(self, n: u32) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(n))
            .map_or(self, Self::from_date)
    }

    /// `n` consecutive months ending with this one, oldest first.
    #[must_use]
    pub fn trailing(self, n: u32) -> Vec<Self> {
        (0..n).rev().map(|back| self.months_back(back)).collect()
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(Period::new(2022, 0).is_err());
        assert!(Period::new(2022, 13).is_err());
        assert!(Period::new(2022, 12).is_ok());
    }

    #[test]
    fn test_parse_query_text() {
        assert_eq!(
            Period::parse("2022", "03").unwrap(),
            Period {
                year: 2022,
                month: 3
            }
        );
        assert!(Period::parse("2022", "March").is_err());
        assert!(Period::parse("", "1").is_err());
    }

    #[test]
    fn test_month_bounds() {
        let feb = Period::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), date(2024, 2, 1));
        assert_eq!(feb.last_day(), date(2024, 2, 29));

        let dec = Period::new(2022, 12).unwrap();
        assert_eq!(dec.last_day(), date(2022, 12, 31));
        assert!(dec.contains(date(2022, 12, 31)));
        assert!(!dec.contains(date(2023, 1, 1)));
    }

    #[test]
    fn test_previous_crosses_year() {
        let jan = Period::new(2023, 1).unwrap();
        assert_eq!(jan.previous(), Period::new(2022, 12).unwrap());
        assert_eq!(jan.months_back(13), Period::new(2021, 12).unwrap());
    }

    #[test]
    fn test_trailing_is_oldest_first() {
        let mar = Period::new(2022, 3).unwrap();
        let months: Vec<String> = mar.trailing(4).iter().map(ToString::to_string).collect();
        assert_eq!(months, ["2021-12", "2022-01", "2022-02", "2022-03"]);
        assert!(mar.trailing(0).is_empty());
    }
}
