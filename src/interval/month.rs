use std::fmt;
use std::fmt::Formatter;
use std::str::FromStr;

use jiff::civil::{date, Date};
use jiff::ToSpan;

use crate::error::TripDataError;

/// A calendar month, identified by the date of its first day.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub struct Month(Date);

/// Panics if the month is not valid, same as [`jiff::civil::date`].
pub fn month(year: i16, month: i8) -> Month {
    Month(date(year, month, 1))
}

impl Month {
    pub fn new(year: i16, month: i8) -> Result<Month, jiff::Error> {
        Ok(Month(Date::new(year, month, 1)?))
    }

    /// Return the month that contains this date.
    pub fn containing(date: Date) -> Month {
        Month(date.first_of_month())
    }

    pub fn year(&self) -> i16 {
        self.0.year()
    }

    pub fn month(&self) -> i8 {
        self.0.month()
    }

    pub fn start_date(&self) -> Date {
        self.0
    }

    pub fn previous(&self) -> Month {
        self.minus(1)
    }

    pub fn next(&self) -> Month {
        Month(self.0.saturating_add(1.month()))
    }

    /// Go back `n` months.
    pub fn minus(&self, n: i32) -> Month {
        Month(self.0.saturating_sub(n.months()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parse a month in the `YYYY-MM` format, e.g. `2025-03`.
impl FromStr for Month {
    type Err = TripDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TripDataError::InvalidMonth(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse::<i16>().map_err(|_| err())?;
        let month = month.parse::<i8>().map_err(|_| err())?;
        Month::new(year, month).map_err(|_| err())
    }
}
