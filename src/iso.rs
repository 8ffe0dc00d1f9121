//! The internal ISO calendar and clock field records.
//!
//! An `IsoDate` is a proleptic Gregorian year-month-day, an `IsoTime`
//! is a nanosecond-precision time of day, and an `IsoDateTime` pairs
//! the two. None of the three carries a timezone: an `IsoDateTime` is
//! a naive wall-clock reading until a zone's rules bind it to an
//! instant.

use crate::utils;
use crate::{ConversionError, ConversionResult, NS_MAX_INSTANT, NS_PER_DAY};

/// A proleptic Gregorian calendar date.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDate {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl IsoDate {
    pub(crate) const fn new_unchecked(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Creates a new `IsoDate`, validating the calendar fields.
    pub fn new(year: i32, month: u8, day: u8) -> ConversionResult<Self> {
        let date = Self::new_unchecked(year, month, day);
        if !date.is_valid() {
            return Err(ConversionError::range("invalid calendar date"));
        }
        Ok(date)
    }

    pub(crate) fn is_valid(self) -> bool {
        (1..=12).contains(&self.month)
            && self.day >= 1
            && self.day <= utils::iso_days_in_month(self.year, self.month)
    }

    /// Days since the Unix epoch for this date.
    pub(crate) fn to_epoch_days(self) -> i64 {
        utils::epoch_days_from_gregorian(self.year, self.month, self.day)
    }

    pub(crate) fn from_epoch_days(epoch_days: i64) -> Self {
        let (year, month, day) = utils::gregorian_from_epoch_days(epoch_days);
        Self { year, month, day }
    }
}

/// A nanosecond-precision time of day.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub microsecond: u16,
    pub nanosecond: u16,
}

impl IsoTime {
    pub(crate) const fn new_unchecked(
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> Self {
        Self {
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        }
    }

    pub(crate) const fn noon() -> Self {
        Self::new_unchecked(12, 0, 0, 0, 0, 0)
    }

    pub(crate) fn is_valid(self) -> bool {
        self.hour < 24
            && self.minute < 60
            && self.second < 60
            && self.millisecond < 1000
            && self.microsecond < 1000
            && self.nanosecond < 1000
    }

    /// Nanoseconds elapsed since the preceding midnight.
    pub(crate) fn nanoseconds_in_day(self) -> i128 {
        let seconds =
            i128::from(self.hour) * 3600 + i128::from(self.minute) * 60 + i128::from(self.second);
        seconds * 1_000_000_000
            + i128::from(self.millisecond) * 1_000_000
            + i128::from(self.microsecond) * 1000
            + i128::from(self.nanosecond)
    }

    /// Builds a time of day from nanoseconds since midnight.
    ///
    /// `nanos` must already be reduced into `0..NS_PER_DAY`.
    pub(crate) fn from_nanoseconds_in_day(nanos: i128) -> Self {
        debug_assert!((0..NS_PER_DAY).contains(&nanos));
        let seconds = (nanos / 1_000_000_000) as i64;
        let subsecond = (nanos % 1_000_000_000) as i64;
        Self {
            hour: (seconds / 3600) as u8,
            minute: (seconds / 60 % 60) as u8,
            second: (seconds % 60) as u8,
            millisecond: (subsecond / 1_000_000) as u16,
            microsecond: (subsecond / 1000 % 1000) as u16,
            nanosecond: (subsecond % 1000) as u16,
        }
    }
}

/// A naive wall-clock reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDateTime {
    pub date: IsoDate,
    pub time: IsoTime,
}

impl IsoDateTime {
    pub(crate) const fn new_unchecked(date: IsoDate, time: IsoTime) -> Self {
        Self { date, time }
    }

    /// Creates a new `IsoDateTime`, validating that the combined value
    /// stays within a day of the supported instant range.
    pub fn new(date: IsoDate, time: IsoTime) -> ConversionResult<Self> {
        let dt = Self::new_unchecked(date, time);
        if !dt.is_within_limits() {
            return Err(ConversionError::range(
                "date-time is outside the representable range",
            ));
        }
        Ok(dt)
    }

    /// Nanoseconds since the Unix epoch for this reading interpreted
    /// as if it were UTC.
    pub(crate) fn as_local_nanoseconds(&self) -> i128 {
        i128::from(self.date.to_epoch_days()) * NS_PER_DAY + self.time.nanoseconds_in_day()
    }

    /// Inverse of [`Self::as_local_nanoseconds`].
    pub(crate) fn from_local_nanoseconds(nanos: i128) -> Self {
        let days = nanos.div_euclid(NS_PER_DAY) as i64;
        let time_nanos = nanos.rem_euclid(NS_PER_DAY);
        Self {
            date: IsoDate::from_epoch_days(days),
            time: IsoTime::from_nanoseconds_in_day(time_nanos),
        }
    }

    /// Wall-clock readings get one day of slack beyond the instant
    /// range, since an offset can push them back inside it.
    pub(crate) fn is_within_limits(&self) -> bool {
        self.as_local_nanoseconds().abs() <= NS_MAX_INSTANT + NS_PER_DAY
    }
}
