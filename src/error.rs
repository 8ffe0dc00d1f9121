//! The error type returned by conversion operations.

use core::fmt;
use std::borrow::Cow;

/// The error returned by every fallible operation in this crate.
///
/// Conversion is pure and deterministic, so no variant is retryable:
/// an identical input always produces the identical error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The input string's offset/`Z` vocabulary does not match the
    /// requested conversion direction.
    Format(Cow<'static, str>),
    /// The input is not a syntactically valid date-time.
    Parse(Cow<'static, str>),
    /// The timezone identifier was not recognized by the rule resolver.
    UnknownZone(String),
    /// The wall-clock time falls in a DST gap and the policy is `Reject`.
    NonexistentLocalTime(Cow<'static, str>),
    /// The wall-clock time falls in a DST overlap and the policy is `Reject`.
    AmbiguousLocalTime(Cow<'static, str>),
    /// The supplied disambiguation policy is not a recognized value.
    InvalidDisambiguation(String),
    /// A value fell outside the representable date-time range.
    Range(Cow<'static, str>),
    /// The zone-rule data itself was ill-formed or unreadable.
    ZoneData(Cow<'static, str>),
}

impl ConversionError {
    pub fn format(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Format(message.into())
    }

    pub fn parse(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Parse(message.into())
    }

    pub fn unknown_zone(identifier: &str) -> Self {
        Self::UnknownZone(identifier.to_string())
    }

    pub fn nonexistent_local_time(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NonexistentLocalTime(message.into())
    }

    pub fn ambiguous_local_time(message: impl Into<Cow<'static, str>>) -> Self {
        Self::AmbiguousLocalTime(message.into())
    }

    pub fn invalid_disambiguation(value: &str) -> Self {
        Self::InvalidDisambiguation(value.to_string())
    }

    pub fn range(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Range(message.into())
    }

    pub fn zone_data(message: impl Into<Cow<'static, str>>) -> Self {
        Self::ZoneData(message.into())
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::UnknownZone(id) => write!(f, "unknown timezone identifier: {id}"),
            Self::NonexistentLocalTime(msg) => write!(f, "nonexistent local time: {msg}"),
            Self::AmbiguousLocalTime(msg) => write!(f, "ambiguous local time: {msg}"),
            Self::InvalidDisambiguation(value) => {
                write!(f, "invalid disambiguation value: {value}")
            }
            Self::Range(msg) => write!(f, "range error: {msg}"),
            Self::ZoneData(msg) => write!(f, "zone data error: {msg}"),
        }
    }
}

impl std::error::Error for ConversionError {}
