//! `wallclock` converts between UTC instants and zoned wall-clock
//! times using the IANA timezone database.
//!
//! ```rust
//! use wallclock::{convert_to_local, convert_to_utc, Disambiguation};
//!
//! // An instant projected into a zone.
//! let local = convert_to_local("2025-07-01T12:30:00Z", "America/New_York").unwrap();
//! assert_eq!(local.wall_clock_string(), "2025-07-01T08:30:00");
//!
//! // A wall-clock time bound to an instant. This reading falls in the
//! // autumn fold, so a policy picks which of its two occurrences wins.
//! let instant = convert_to_utc(
//!     "2025-11-02T01:30:00",
//!     "America/New_York",
//!     Disambiguation::Later,
//! )
//! .unwrap();
//! assert_eq!(instant.instant_string(), "2025-11-02T06:30:00.000Z");
//! ```
//!
//! The instant-to-local direction is total. The local-to-instant
//! direction is not: DST transitions skip some wall-clock readings and
//! repeat others, and a [`Disambiguation`] policy decides what happens
//! to them. Inputs are direction-checked before parsing: an instant
//! string must carry an offset or `Z` designator, and a wall-clock
//! string must not, so a value can never be silently reinterpreted in
//! the wrong frame.
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

pub mod error;
pub mod iso;
pub mod options;
pub mod provider;
pub mod tzdb;
pub mod zoned;

mod dst;
mod parsers;
mod unix_time;
mod validate;

#[doc(hidden)]
pub(crate) mod utils;

use std::sync::LazyLock;

#[doc(inline)]
pub use error::ConversionError;
pub use options::{Direction, Disambiguation};
pub use provider::{UtcOffsetSeconds, WallOffsetMatch, ZoneRulesProvider};
pub use tzdb::TzdbProvider;
pub use unix_time::EpochNanoseconds;
pub use zoned::{TimeZoneId, ZonedTime};

/// The crate's result type.
pub type ConversionResult<T> = Result<T, ConversionError>;

pub(crate) const NS_PER_DAY: i128 = 86_400_000_000_000;
pub(crate) const NS_PER_HOUR: i128 = 3_600_000_000_000;
/// Nanoseconds of the latest supported instant, 10^8 days after the
/// epoch.
pub(crate) const NS_MAX_INSTANT: i128 = 8_640_000_000_000_000_000_000;
pub(crate) const NS_MIN_INSTANT: i128 = -NS_MAX_INSTANT;

static TZDB: LazyLock<TzdbProvider> = LazyLock::new(TzdbProvider::default);

/// Converts an instant string into the wall-clock time of `timezone`,
/// using the process-wide zone database.
///
/// The input must carry an offset or `Z` designator.
pub fn convert_to_local(time: &str, timezone: &str) -> ConversionResult<ZonedTime> {
    zoned::to_local(time, timezone, &*TZDB)
}

/// [`convert_to_local`] against a caller-supplied provider.
pub fn convert_to_local_with_provider(
    time: &str,
    timezone: &str,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<ZonedTime> {
    zoned::to_local(time, timezone, provider)
}

/// Converts a wall-clock string into an instant in `timezone`, using
/// the process-wide zone database.
///
/// The input must not carry an offset or `Z` designator; the
/// `disambiguation` policy settles readings that a DST transition
/// skipped or repeated.
pub fn convert_to_utc(
    time: &str,
    timezone: &str,
    disambiguation: Disambiguation,
) -> ConversionResult<ZonedTime> {
    zoned::to_instant(time, timezone, disambiguation, &*TZDB)
}

/// [`convert_to_utc`] against a caller-supplied provider.
pub fn convert_to_utc_with_provider(
    time: &str,
    timezone: &str,
    disambiguation: Disambiguation,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<ZonedTime> {
    zoned::to_instant(time, timezone, disambiguation, provider)
}

/// Classifies an instant as daylight-saving or standard time in the
/// named zone, using the process-wide zone database.
pub fn is_daylight_saving(instant: EpochNanoseconds, timezone: &str) -> ConversionResult<bool> {
    dst::is_daylight_saving(instant, timezone, &*TZDB)
}

/// [`is_daylight_saving`] against a caller-supplied provider.
pub fn is_daylight_saving_with_provider(
    instant: EpochNanoseconds,
    timezone: &str,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<bool> {
    dst::is_daylight_saving(instant, timezone, provider)
}
