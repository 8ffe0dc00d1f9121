//! The conversion engine: binding wall-clock readings to instants.

use core::fmt;

use crate::iso::IsoDateTime;
use crate::options::{Direction, Disambiguation};
use crate::parsers;
use crate::provider::{UtcOffsetSeconds, WallOffsetMatch, ZoneRulesProvider};
use crate::unix_time::EpochNanoseconds;
use crate::validate;
use crate::{ConversionError, ConversionResult, NS_PER_HOUR};

/// A validated IANA timezone identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZoneId(String);

impl TimeZoneId {
    /// Validates `identifier` against the provider's database.
    pub fn try_from_str(
        identifier: &str,
        provider: &impl ZoneRulesProvider,
    ) -> ConversionResult<Self> {
        if !provider.check_identifier(identifier) {
            return Err(ConversionError::unknown_zone(identifier));
        }
        Ok(Self(identifier.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimeZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The result of a conversion: one instant bound to one wall-clock
/// reading in one timezone.
///
/// Both faces of the value are carried so a conversion in either
/// direction yields the full picture, along with the offset that
/// linked them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZonedTime {
    instant: EpochNanoseconds,
    wall: IsoDateTime,
    zone: TimeZoneId,
    offset: UtcOffsetSeconds,
}

impl ZonedTime {
    pub fn instant(&self) -> EpochNanoseconds {
        self.instant
    }

    pub fn wall_clock(&self) -> IsoDateTime {
        self.wall
    }

    pub fn zone(&self) -> &TimeZoneId {
        &self.zone
    }

    pub fn offset(&self) -> UtcOffsetSeconds {
        self.offset
    }

    /// The instant as a `Z`-suffixed ISO 8601 string with millisecond
    /// precision.
    pub fn instant_string(&self) -> String {
        let utc = IsoDateTime::from_local_nanoseconds(self.instant.as_i128());
        format!("{}T{}Z", date_string(utc), time_string(utc, true))
    }

    /// The wall-clock reading as an ISO 8601 string without a
    /// designator, with milliseconds only when a subsecond part is
    /// present.
    pub fn wall_clock_string(&self) -> String {
        let subsecond = self.wall.time.millisecond != 0
            || self.wall.time.microsecond != 0
            || self.wall.time.nanosecond != 0;
        format!(
            "{}T{}",
            date_string(self.wall),
            time_string(self.wall, subsecond)
        )
    }
}

fn date_string(dt: IsoDateTime) -> String {
    let date = dt.date;
    if (0..=9999).contains(&date.year) {
        format!("{:04}-{:02}-{:02}", date.year, date.month, date.day)
    } else {
        // Expanded-year form for dates outside the four-digit range.
        let sign = if date.year < 0 { '-' } else { '+' };
        format!(
            "{sign}{:06}-{:02}-{:02}",
            date.year.unsigned_abs(),
            date.month,
            date.day
        )
    }
}

fn time_string(dt: IsoDateTime, with_milliseconds: bool) -> String {
    let time = dt.time;
    if with_milliseconds {
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            time.hour, time.minute, time.second, time.millisecond
        )
    } else {
        format!("{:02}:{:02}:{:02}", time.hour, time.minute, time.second)
    }
}

/// Converts an instant string into the wall-clock time of `timezone`.
///
/// This direction is total: every representable instant has exactly
/// one wall-clock reading in every zone, so no disambiguation policy
/// applies.
pub(crate) fn to_local(
    source: &str,
    timezone: &str,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<ZonedTime> {
    validate::check_vocabulary(Direction::ToLocal, source)?;
    let parsed = parsers::parse_instant(source)?;
    let zone = TimeZoneId::try_from_str(timezone, provider)?;
    let instant = EpochNanoseconds::try_from(
        parsed.iso.as_local_nanoseconds() - parsed.offset_nanoseconds,
    )?;
    project(instant, zone, provider)
}

/// Binds an already-resolved instant to its wall-clock reading in
/// `zone`.
pub(crate) fn project(
    instant: EpochNanoseconds,
    zone: TimeZoneId,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<ZonedTime> {
    let offset = provider.offset_for(zone.as_str(), instant.as_i128())?;
    let wall = IsoDateTime::from_local_nanoseconds(instant.as_i128() + offset.as_nanoseconds());
    Ok(ZonedTime {
        instant,
        wall,
        zone,
        offset,
    })
}

/// Converts a wall-clock string into an instant in `timezone`,
/// applying `disambiguation` when the reading sits inside a DST gap or
/// fold.
pub(crate) fn to_instant(
    source: &str,
    timezone: &str,
    disambiguation: Disambiguation,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<ZonedTime> {
    validate::check_vocabulary(Direction::ToUtc, source)?;
    let wall = parsers::parse_wall_clock(source)?;
    let zone = TimeZoneId::try_from_str(timezone, provider)?;
    let (instant, offset) = resolve_wall(wall, &zone, disambiguation, provider)?;
    // Rebuilt from the instant rather than echoed, so a gap reading
    // reports the wall-clock time it actually resolved to.
    let wall = IsoDateTime::from_local_nanoseconds(instant.as_i128() + offset.as_nanoseconds());
    Ok(ZonedTime {
        instant,
        wall,
        zone,
        offset,
    })
}

/// Resolves a wall-clock reading to a single instant and offset.
pub(crate) fn resolve_wall(
    wall: IsoDateTime,
    zone: &TimeZoneId,
    disambiguation: Disambiguation,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<(EpochNanoseconds, UtcOffsetSeconds)> {
    let wall_nanos = wall.as_local_nanoseconds();
    match provider.wall_offsets_for(zone.as_str(), wall)? {
        WallOffsetMatch::Unique(offset) => Ok((
            EpochNanoseconds::try_from(wall_nanos - offset.as_nanoseconds())?,
            offset,
        )),
        WallOffsetMatch::Fold { first, second } => match disambiguation {
            Disambiguation::Reject => Err(ConversionError::ambiguous_local_time(format!(
                "wall-clock time occurs twice in {zone}"
            ))),
            // Compatible selects the first occurrence, like Earlier.
            Disambiguation::Compatible | Disambiguation::Earlier => Ok((
                EpochNanoseconds::try_from(wall_nanos - first.as_nanoseconds())?,
                first,
            )),
            Disambiguation::Later => Ok((
                EpochNanoseconds::try_from(wall_nanos - second.as_nanoseconds())?,
                second,
            )),
        },
        WallOffsetMatch::Gap => {
            if disambiguation == Disambiguation::Reject {
                return Err(ConversionError::nonexistent_local_time(format!(
                    "wall-clock time was skipped by a transition in {zone}"
                )));
            }
            // Every other policy moves the reading forward by the
            // width of the gap, measured from the offsets in effect on
            // either side of the transition.
            let before = offset_beside_gap(wall_nanos, -3 * NS_PER_HOUR, zone, provider)?;
            let after = offset_beside_gap(wall_nanos, 3 * NS_PER_HOUR, zone, provider)?;
            let shifted_nanos = wall_nanos + (after.as_nanoseconds() - before.as_nanoseconds());
            let shifted = IsoDateTime::from_local_nanoseconds(shifted_nanos);
            let offset = match provider.wall_offsets_for(zone.as_str(), shifted)? {
                WallOffsetMatch::Unique(offset) => offset,
                // Landing in a fold means the shifted reading already
                // passed the transition; its second reading is the one
                // on the far side.
                WallOffsetMatch::Fold { second, .. } => second,
                WallOffsetMatch::Gap => {
                    return Err(ConversionError::zone_data(
                        "transition could not be disambiguated",
                    ))
                }
            };
            Ok((
                EpochNanoseconds::try_from(shifted_nanos - offset.as_nanoseconds())?,
                offset,
            ))
        }
    }
}

/// The offset in effect on one side of a gap, probing outward from
/// the reading in steps of `step` nanoseconds.
///
/// Gaps can be far wider than an ordinary DST hour. Samoa skipped an
/// entire day crossing the date line, so up to nine three-hour steps
/// are taken before the gap is declared unresolvable.
fn offset_beside_gap(
    wall_nanos: i128,
    step: i128,
    zone: &TimeZoneId,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<UtcOffsetSeconds> {
    for probe in 1..=9 {
        let wall = IsoDateTime::from_local_nanoseconds(wall_nanos + probe * step);
        match provider.wall_offsets_for(zone.as_str(), wall)? {
            WallOffsetMatch::Unique(offset) => return Ok(offset),
            // A fold beside a gap still settles the offset: the
            // occurrence adjacent to the gap governs.
            WallOffsetMatch::Fold { first, second } => {
                return Ok(if step < 0 { second } else { first })
            }
            WallOffsetMatch::Gap => {}
        }
    }
    Err(ConversionError::zone_data(
        "transition could not be disambiguated",
    ))
}
