//! Calendar handling for the policy lifecycle
//!
//! The engine reasons in calendar dates: a policy starts "today", ends a whole
//! number of years later, and installments fall due on dates that advance by
//! whole months. "Today" is taken in the business timezone through an
//! injectable [`Clock`] so that lifecycle decisions are deterministic in tests.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Timezone wrapper for the business calendar
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// The calendar date of a UTC instant in this timezone
    pub fn date_of(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }
}

/// Errors related to calendar operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Date out of range: {date} + {months} months")]
    OutOfRange { date: NaiveDate, months: u32 },
}

/// Source of the current time
///
/// Production code uses [`SystemClock`]; tests pin the calendar with
/// [`FixedClock`].
pub trait Clock: Send + Sync + 'static {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;

    /// The business timezone
    fn timezone(&self) -> Timezone;

    /// Today's date in the business timezone
    fn today(&self) -> NaiveDate {
        self.timezone().date_of(self.now())
    }
}

/// Wall clock in a configured business timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    timezone: Timezone,
}

impl SystemClock {
    pub fn new(timezone: Timezone) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// A clock that can be pinned and moved by hand
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<std::sync::RwLock<DateTime<Utc>>>,
    timezone: Timezone,
}

impl FixedClock {
    /// Pins the clock to midday UTC on the given date
    pub fn on(date: NaiveDate) -> Self {
        Self::at(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }

    /// Pins the clock to the given instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(std::sync::RwLock::new(now)),
            timezone: Timezone(chrono_tz::UTC),
        }
    }

    /// Moves the clock to midday UTC on another date
    pub fn set_date(&self, date: NaiveDate) {
        self.set(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc());
    }

    /// Moves the clock to another instant
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.write() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.read().map(|guard| *guard).unwrap_or_else(|poisoned| *poisoned.into_inner())
    }

    fn timezone(&self) -> Timezone {
        self.timezone
    }
}

/// Adds whole months, clamping to the last day of a shorter month
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, TemporalError> {
    date.checked_add_months(Months::new(months))
        .ok_or(TemporalError::OutOfRange { date, months })
}

/// Adds whole years (29 February rolls back to 28 February)
pub fn add_years(date: NaiveDate, years: u32) -> Result<NaiveDate, TemporalError> {
    let months = years
        .checked_mul(12)
        .ok_or(TemporalError::OutOfRange { date, months: u32::MAX })?;
    add_months(date, months)
}

/// Completed years between a date of birth and a reference date
pub fn age_in_years(date_of_birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(date(2024, 1, 31), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 11, 30), 3).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_add_years_from_leap_day() {
        assert_eq!(add_years(date(2024, 2, 29), 1).unwrap(), date(2025, 2, 28));
        assert_eq!(add_years(date(2024, 2, 29), 4).unwrap(), date(2028, 2, 29));
    }

    #[test]
    fn test_age_counts_completed_years() {
        assert_eq!(age_in_years(date(2007, 6, 15), date(2025, 6, 14)), 17);
        assert_eq!(age_in_years(date(2007, 6, 15), date(2025, 6, 15)), 18);
    }

    #[test]
    fn test_fixed_clock_today() {
        let clock = FixedClock::on(date(2025, 3, 1));
        assert_eq!(clock.today(), date(2025, 3, 1));
        clock.set_date(date(2026, 1, 1));
        assert_eq!(clock.today(), date(2026, 1, 1));
    }

    #[test]
    fn test_system_clock_uses_business_timezone() {
        let tz = Timezone::default();
        // 20:00 UTC is already the next day in Kolkata (UTC+05:30)
        let instant = date(2025, 1, 1).and_hms_opt(20, 0, 0).unwrap().and_utc();
        assert_eq!(tz.date_of(instant), date(2025, 1, 2));
    }
}
