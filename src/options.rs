//! Options for controlling how a conversion request is completed.

use core::fmt;
use core::str::FromStr;

use crate::ConversionError;

/// The direction of a conversion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// UTC instant in, zoned wall-clock time out.
    ToLocal,
    /// Zoned wall-clock time in, UTC instant out.
    ToUtc,
}

/// A parsing error for a [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseDirectionError;

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("provided string was not a valid conversion direction")
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toLocal" => Ok(Self::ToLocal),
            "toUTC" => Ok(Self::ToUtc),
            _ => Err(ParseDirectionError),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToLocal => "toLocal",
            Self::ToUtc => "toUTC",
        }
        .fmt(f)
    }
}

/// The policy applied when a wall-clock time does not map to exactly
/// one instant in its timezone.
///
/// Inside a DST overlap, `Compatible` behaves exactly like `Earlier`
/// and selects the first of the two occurrences. Inside a gap,
/// `Earlier` and `Later` carry no additional meaning and resolve the
/// same way `Compatible` does: the wall-clock time is moved forward by
/// the width of the gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Disambiguation {
    /// Resolve to the first occurrence of an ambiguous time, or shift a
    /// nonexistent time forward past the gap.
    #[default]
    Compatible,
    /// Resolve to the earlier candidate instant.
    Earlier,
    /// Resolve to the later candidate instant.
    Later,
    /// Refuse to guess and return an error instead.
    Reject,
}

impl FromStr for Disambiguation {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compatible" => Ok(Self::Compatible),
            "earlier" => Ok(Self::Earlier),
            "later" => Ok(Self::Later),
            "reject" => Ok(Self::Reject),
            _ => Err(ConversionError::invalid_disambiguation(s)),
        }
    }
}

impl fmt::Display for Disambiguation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compatible => "compatible",
            Self::Earlier => "earlier",
            Self::Later => "later",
            Self::Reject => "reject",
        }
        .fmt(f)
    }
}
