//! The `ZoneRulesProvider` trait.

use core::fmt;

use crate::iso::IsoDateTime;
use crate::ConversionResult;

/// A UTC offset in seconds east of Greenwich.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcOffsetSeconds(pub i64);

impl UtcOffsetSeconds {
    pub fn as_nanoseconds(&self) -> i128 {
        i128::from(self.0) * 1_000_000_000
    }
}

impl fmt::Display for UtcOffsetSeconds {
    /// Formats as `±HH:MM`, with a seconds field only when the offset
    /// is not a whole number of minutes (pre-standardization zones).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let total = self.0.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
        write!(f, "{sign}{hours:02}:{minutes:02}")?;
        if seconds != 0 {
            write!(f, ":{seconds:02}")?;
        }
        Ok(())
    }
}

/// The result of looking up a wall-clock time against a zone's
/// transition history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallOffsetMatch {
    /// The wall-clock time was skipped by a forward transition.
    Gap,
    /// Exactly one offset was in effect.
    Unique(UtcOffsetSeconds),
    /// A backward transition repeated the wall-clock time. `first` is
    /// the offset of the chronologically first occurrence, which is
    /// always the larger of the two.
    Fold {
        first: UtcOffsetSeconds,
        second: UtcOffsetSeconds,
    },
}

/// Supplies timezone rules to the conversion engine.
///
/// The engine only ever asks three questions of a zone database, and
/// this trait is their seam: implementations may read TZif files,
/// carry compiled-in data, or serve fixtures in tests.
pub trait ZoneRulesProvider {
    /// Whether `identifier` names a zone this provider can resolve.
    fn check_identifier(&self, identifier: &str) -> bool;

    /// The offsets a naive wall-clock reading could correspond to in
    /// the named zone.
    fn wall_offsets_for(
        &self,
        identifier: &str,
        wall: IsoDateTime,
    ) -> ConversionResult<WallOffsetMatch>;

    /// The offset in effect in the named zone at an absolute instant.
    fn offset_for(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> ConversionResult<UtcOffsetSeconds>;
}
