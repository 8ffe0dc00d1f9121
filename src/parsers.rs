//! ISO 8601 date-time parsing, built on `ixdtf`.

use ixdtf::parsers::records::{
    DateRecord, Fraction, IxdtfParseRecord, TimeRecord, UtcOffsetRecordOrZ,
};
use ixdtf::parsers::IxdtfParser;

use crate::iso::{IsoDate, IsoDateTime, IsoTime};
use crate::{ConversionError, ConversionResult};

/// A parsed instant string: the civil fields plus the offset they were
/// written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParsedInstant {
    pub(crate) iso: IsoDateTime,
    pub(crate) offset_nanoseconds: i128,
}

/// Parses an instant string, which must provide a date, a time, and an
/// offset or `Z`.
pub(crate) fn parse_instant(source: &str) -> ConversionResult<ParsedInstant> {
    let record = parse_ixdtf(source)?;
    let IxdtfParseRecord {
        date: Some(date),
        time: Some(time),
        offset: Some(offset),
        ..
    } = record
    else {
        return Err(ConversionError::parse(
            "an instant requires a date, a time, and an offset",
        ));
    };
    let iso = IsoDateTime::new(iso_date_from(date)?, iso_time_from(time))?;
    Ok(ParsedInstant {
        iso,
        offset_nanoseconds: offset_nanoseconds_from(offset),
    })
}

/// Parses a wall-clock string, which must provide a date and must not
/// provide an offset or `Z`. A missing time component reads as
/// midnight.
pub(crate) fn parse_wall_clock(source: &str) -> ConversionResult<IsoDateTime> {
    let record = parse_ixdtf(source)?;
    let Some(date) = record.date else {
        return Err(ConversionError::parse(
            "a wall-clock time requires a date",
        ));
    };
    if record.offset.is_some() {
        return Err(ConversionError::format(
            "unexpected offset or Z designator for local input",
        ));
    }
    let time = record.time.map(iso_time_from).unwrap_or_default();
    IsoDateTime::new(iso_date_from(date)?, time)
}

fn parse_ixdtf(source: &str) -> ConversionResult<IxdtfParseRecord<'_>> {
    IxdtfParser::from_str(source)
        .parse()
        .map_err(|err| ConversionError::parse(err.to_string()))
}

fn iso_date_from(record: DateRecord) -> ConversionResult<IsoDate> {
    IsoDate::new(record.year, record.month, record.day)
}

fn iso_time_from(record: TimeRecord) -> IsoTime {
    // A leap second parses as :60 and clamps to :59.
    let second = record.second.min(59);
    let nanosecond = fraction_nanoseconds(record.fraction);
    IsoTime::new_unchecked(
        record.hour,
        record.minute,
        second,
        (nanosecond / 1_000_000) as u16,
        (nanosecond / 1000 % 1000) as u16,
        (nanosecond % 1000) as u16,
    )
}

/// Digits beyond nanosecond precision resolve to `None` and read as a
/// whole second.
fn fraction_nanoseconds(fraction: Option<Fraction>) -> u32 {
    fraction
        .and_then(|fraction| fraction.to_nanoseconds())
        .unwrap_or(0)
}

fn offset_nanoseconds_from(offset: UtcOffsetRecordOrZ) -> i128 {
    match offset {
        UtcOffsetRecordOrZ::Z => 0,
        UtcOffsetRecordOrZ::Offset(record) => {
            let seconds = i128::from(record.hour) * 3600
                + i128::from(record.minute) * 60
                + i128::from(record.second);
            let nanosecond = fraction_nanoseconds(record.fraction);
            (seconds * 1_000_000_000 + i128::from(nanosecond)) * record.sign as i128
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iso::{IsoDate, IsoTime};

    #[test]
    fn instant_with_z_parses_to_zero_offset() {
        let parsed = parse_instant("2025-07-01T12:30:45Z").unwrap();
        assert_eq!(parsed.offset_nanoseconds, 0);
        assert_eq!(parsed.iso.date, IsoDate::new_unchecked(2025, 7, 1));
        assert_eq!(parsed.iso.time, IsoTime::new_unchecked(12, 30, 45, 0, 0, 0));
    }

    #[test]
    fn instant_offsets_are_signed_nanoseconds() {
        let positive = parse_instant("2025-07-01T12:00:00+05:30").unwrap();
        assert_eq!(positive.offset_nanoseconds, 19_800_000_000_000);
        let negative = parse_instant("2025-07-01T12:00:00-04:00").unwrap();
        assert_eq!(negative.offset_nanoseconds, -14_400_000_000_000);
    }

    #[test]
    fn instant_requires_time_and_offset() {
        assert!(parse_instant("2025-07-01").is_err());
        assert!(parse_instant("2025-07-01T12:00:00").is_err());
    }

    #[test]
    fn wall_clock_preserves_subsecond_precision() {
        let parsed = parse_wall_clock("2025-07-01T08:15:30.123456789").unwrap();
        assert_eq!(
            parsed.time,
            IsoTime::new_unchecked(8, 15, 30, 123, 456, 789)
        );
    }

    #[test]
    fn over_precise_fractions_read_as_whole_seconds() {
        let parsed = parse_wall_clock("2025-07-01T08:15:30.1234567891").unwrap();
        assert_eq!(parsed.time, IsoTime::new_unchecked(8, 15, 30, 0, 0, 0));
    }

    #[test]
    fn wall_clock_defaults_to_midnight() {
        let parsed = parse_wall_clock("2025-07-01").unwrap();
        assert_eq!(parsed.time, IsoTime::default());
    }

    #[test]
    fn wall_clock_rejects_an_offset() {
        assert!(matches!(
            parse_wall_clock("2025-07-01T12:00:00Z"),
            Err(ConversionError::Format(_))
        ));
        assert!(matches!(
            parse_wall_clock("2025-07-01T12:00:00+01:00"),
            Err(ConversionError::Format(_))
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_instant("when the clocks went back"),
            Err(ConversionError::Parse(_))
        ));
        assert!(matches!(
            parse_wall_clock("2025-13-40T99:00:00"),
            Err(ConversionError::Parse(_)) | Err(ConversionError::Range(_))
        ));
    }
}
