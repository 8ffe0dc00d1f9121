//! Seasonal-offset classification.
//!
//! Whether an instant is "in DST" is judged by comparison rather than
//! by zone metadata: the offset in effect at the instant is measured
//! against the offsets the same zone uses at local noon of January 15
//! and July 15 of that year. The more negative (further west) of the
//! two reference offsets is taken as standard time; an instant on any
//! other offset counts as daylight saving. A zone whose two reference
//! offsets agree observes no DST that year, so every instant in it
//! classifies as `false`.
//!
//! The two sample dates sit far from every real-world transition, so
//! the comparison reflects the season on either side of them. Zones
//! with historical quirks (double summer time, permanent DST) classify
//! by the same rule; the answer reflects what the zone actually did,
//! not what a cleaned-up rulebook would say.

use crate::iso::{IsoDate, IsoDateTime, IsoTime};
use crate::options::Disambiguation;
use crate::provider::{UtcOffsetSeconds, ZoneRulesProvider};
use crate::unix_time::EpochNanoseconds;
use crate::zoned::{self, TimeZoneId};
use crate::ConversionResult;

/// Classifies an instant as daylight-saving or standard time in the
/// named zone.
pub(crate) fn is_daylight_saving(
    instant: EpochNanoseconds,
    timezone: &str,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<bool> {
    let zone = TimeZoneId::try_from_str(timezone, provider)?;
    let offset = provider.offset_for(zone.as_str(), instant.as_i128())?;
    // The zone's local year, not the UTC year: near New Year the two
    // can differ and the reference offsets belong to the local one.
    let wall = IsoDateTime::from_local_nanoseconds(instant.as_i128() + offset.as_nanoseconds());
    let january = reference_offset(&zone, wall.date.year, 1, provider)?;
    let july = reference_offset(&zone, wall.date.year, 7, provider)?;
    if january == july {
        return Ok(false);
    }
    let standard = january.min(july);
    Ok(offset != standard)
}

/// The offset in effect at local noon of the 15th of `month`.
fn reference_offset(
    zone: &TimeZoneId,
    year: i32,
    month: u8,
    provider: &impl ZoneRulesProvider,
) -> ConversionResult<UtcOffsetSeconds> {
    let noon = IsoDateTime::new_unchecked(
        IsoDate::new_unchecked(year, month, 15),
        IsoTime::noon(),
    );
    let (_, offset) = zoned::resolve_wall(noon, zone, Disambiguation::Compatible, provider)?;
    Ok(offset)
}
