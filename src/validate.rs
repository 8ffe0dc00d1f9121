//! Lexical direction checks applied to inputs before parsing.
//!
//! An instant string must carry a UTC designator (`Z` or a numeric
//! offset) and a wall-clock string must not. The check is purely
//! lexical: it inspects the raw string's vocabulary without parsing
//! it, so a direction mismatch is reported as such even when the
//! string would otherwise parse cleanly.

use crate::options::Direction;
use crate::{ConversionError, ConversionResult};

/// Checks that `source` carries the offset/`Z` vocabulary the given
/// conversion direction requires.
pub(crate) fn check_vocabulary(direction: Direction, source: &str) -> ConversionResult<()> {
    match (direction, has_utc_designator(source)) {
        (Direction::ToLocal, false) => Err(ConversionError::format(
            "missing offset or Z designator for instant input",
        )),
        (Direction::ToUtc, true) => Err(ConversionError::format(
            "unexpected offset or Z designator for local input",
        )),
        _ => Ok(()),
    }
}

/// Whether the string carries a `Z` or a numeric offset after its time
/// separator.
///
/// Only the region before any bracketed annotation is scanned, and a
/// `-` before the separator is always a date component, never an
/// offset sign. A string with no `T`, `t`, or space separator has no
/// time component and therefore no designator.
fn has_utc_designator(source: &str) -> bool {
    let scanned = source.split('[').next().unwrap_or(source).as_bytes();
    let Some(separator) = scanned
        .iter()
        .position(|byte| matches!(byte, b'T' | b't' | b' '))
    else {
        return false;
    };
    scanned[separator + 1..]
        .iter()
        .any(|byte| matches!(byte, b'Z' | b'z' | b'+' | b'-'))
}
