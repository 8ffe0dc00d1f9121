//! The `EpochNanoseconds` type.

use num_traits::ToPrimitive;

use crate::{ConversionError, NS_MAX_INSTANT, NS_MIN_INSTANT};

/// Nanoseconds elapsed since the Unix epoch, ignoring leap seconds.
///
/// The value is confined to ±10^8 days around the epoch, the range on
/// which every conversion in this crate is defined.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochNanoseconds(pub(crate) i128);

impl EpochNanoseconds {
    /// The raw nanosecond count.
    pub fn as_i128(&self) -> i128 {
        self.0
    }

    /// The value truncated to milliseconds, rounding toward the past.
    pub fn epoch_milliseconds(&self) -> i64 {
        // Infallible: the instant range divided down fits an i64 with
        // room to spare.
        self.0.div_euclid(1_000_000).to_i64().unwrap_or(0)
    }

    /// The value truncated to seconds, rounding toward the past.
    pub fn epoch_seconds(&self) -> i64 {
        self.0.div_euclid(1_000_000_000).to_i64().unwrap_or(0)
    }
}

/// Checks whether a nanosecond count falls within the supported
/// instant range.
pub(crate) fn is_valid_epoch_nanos(nanos: i128) -> bool {
    (NS_MIN_INSTANT..=NS_MAX_INSTANT).contains(&nanos)
}

impl TryFrom<i128> for EpochNanoseconds {
    type Error = ConversionError;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        if !is_valid_epoch_nanos(value) {
            return Err(ConversionError::range(
                "instant is outside the representable range",
            ));
        }
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NS_MAX_INSTANT;

    #[test]
    fn limits_are_enforced() {
        assert!(EpochNanoseconds::try_from(NS_MAX_INSTANT).is_ok());
        assert!(EpochNanoseconds::try_from(NS_MAX_INSTANT + 1).is_err());
        assert!(EpochNanoseconds::try_from(-NS_MAX_INSTANT - 1).is_err());
        assert!(EpochNanoseconds::try_from(0).is_ok());
    }

    #[test]
    fn truncation_rounds_toward_the_past() {
        let before_epoch = EpochNanoseconds::try_from(-1_500_000_000).unwrap();
        assert_eq!(before_epoch.epoch_seconds(), -2);
        assert_eq!(before_epoch.epoch_milliseconds(), -1500);
    }
}
