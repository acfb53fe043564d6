use std::fmt;

use time::{Date, Month};

use crate::error::VerifyError;

pub const ADULT_AGE: i32 = 18;

/// A birthdate entered as `DD-MM-YYYY` that names a real calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthdate(Date);

impl Birthdate {
    pub fn parse(raw: &str) -> Result<Self, VerifyError> {
        let invalid = || VerifyError::InvalidInput(raw.to_string());

        let parts: Vec<&str> = raw.trim().split('-').map(str::trim).collect();
        let [day, month, year] = parts.as_slice() else {
            return Err(invalid());
        };

        let day: u8 = day.parse().map_err(|_| invalid())?;
        let month: u8 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        Ok(Self(date))
    }

    pub fn date(&self) -> Date {
        self.0
    }

    /// Completed years on `today`. Negative for dates in the future.
    pub fn age_on(&self, today: Date) -> i32 {
        let birth = self.0;
        let mut age = today.year() - birth.year();
        if (today.month() as u8, today.day()) < (birth.month() as u8, birth.day()) {
            age -= 1;
        }
        age
    }
}

impl fmt::Display for Birthdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}-{:02}-{}",
            self.0.day(),
            self.0.month() as u8,
            self.0.year()
        )
    }
}
