//! Time sources for the clock
//!
//! A [`TimeSource`] is the only place the widget asks for "now". The
//! refresh timer samples it once per tick and hands the resulting
//! [`Moment`] to the angle calculator and the digital readout.

use std::cell::Cell;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, TimeZone, Timelike, Weekday,
};

/// An immutable point in time with calendar and clock accessors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Moment(DateTime<FixedOffset>);

impl Moment {
    /// Wrap an existing timestamp
    pub fn new<Tz: TimeZone>(datetime: DateTime<Tz>) -> Self {
        Self(datetime.fixed_offset())
    }

    /// Build a moment from civil fields, interpreted at UTC+0
    ///
    /// Returns `None` when any field is out of range.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        Some(Self(naive.and_utc().fixed_offset()))
    }

    /// Convenience for tests and fixed snapshots: today's date does not
    /// matter, only the wall-clock fields
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        Self::at(2025, 1, 6, hour, minute, second)
    }

    /// Hour of day, 0-23
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minute of hour, 0-59
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Second of minute, 0-59 (leap seconds fold into 59)
    pub fn second(&self) -> u32 {
        self.0.second().min(59)
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of year, 1-12
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1-31
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Underlying timestamp, for locale-aware formatting
    pub fn datetime(&self) -> &DateTime<FixedOffset> {
        &self.0
    }
}

impl From<DateTime<Local>> for Moment {
    fn from(datetime: DateTime<Local>) -> Self {
        Self::new(datetime)
    }
}

/// Producer of the current moment
pub trait TimeSource {
    /// Sample the current moment
    fn now(&self) -> Moment;
}

/// The host's local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Moment {
        Moment::from(Local::now())
    }
}

/// A clock that only moves when told to
///
/// Used for deterministic snapshots and tests.
#[derive(Debug)]
pub struct FixedTimeSource {
    moment: Cell<Moment>,
}

impl FixedTimeSource {
    pub fn new(moment: Moment) -> Self {
        Self {
            moment: Cell::new(moment),
        }
    }

    /// Move the clock forward by whole seconds
    pub fn advance(&self, seconds: i64) {
        let next = *self.moment.get().datetime() + chrono::Duration::seconds(seconds);
        self.moment.set(Moment(next));
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Moment {
        self.moment.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moment_accessors() {
        let moment = Moment::at(2025, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(moment.year(), 2025);
        assert_eq!(moment.month(), 3);
        assert_eq!(moment.day(), 14);
        assert_eq!(moment.hour(), 15);
        assert_eq!(moment.minute(), 9);
        assert_eq!(moment.second(), 26);
        assert_eq!(moment.weekday(), Weekday::Fri);
    }

    #[test]
    fn test_moment_rejects_invalid_fields() {
        assert!(Moment::at(2025, 2, 30, 0, 0, 0).is_none());
        assert!(Moment::from_hms(24, 0, 0).is_none());
        assert!(Moment::from_hms(12, 60, 0).is_none());
    }

    #[test]
    fn test_fixed_time_source_advance() {
        let source = FixedTimeSource::new(Moment::from_hms(23, 59, 59).unwrap());
        source.advance(1);
        let now = source.now();
        assert_eq!((now.hour(), now.minute(), now.second()), (0, 0, 0));
        assert_eq!(now.day(), 7);
    }

    #[test]
    fn test_system_time_source_is_valid() {
        let now = SystemTimeSource.now();
        assert!(now.hour() < 24);
        assert!(now.second() < 60);
    }
}
