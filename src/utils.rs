//! Calendar equations shared by the civil date-time types.

/// Whether `year` is a leap year in the proleptic Gregorian calendar.
pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// The number of days in `month` of `year`, with `month` in `1..=12`.
pub(crate) fn iso_days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => unreachable!("month must be validated before this call."),
    }
}

/// Days since the Unix epoch for a proleptic Gregorian date.
///
/// Uses the cycle-based civil calendar equations, which are exact over
/// the full `i32` year range; 1970-01-01 maps to day 0.
pub(crate) fn epoch_days_from_gregorian(year: i32, month: u8, day: u8) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = (i64::from(month) + 9) % 12;
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`epoch_days_from_gregorian`].
pub(crate) fn gregorian_from_epoch_days(epoch_days: i64) -> (i32, u8, u8) {
    let z = epoch_days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    ((y + i64::from(month <= 2)) as i32, month, day)
}

/// Day of the week for an epoch day, with Sunday as 0.
pub(crate) fn epoch_day_of_week(epoch_days: i64) -> u8 {
    // 1970-01-01 was a Thursday.
    (epoch_days + 4).rem_euclid(7) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_day_zero_is_the_unix_epoch() {
        assert_eq!(epoch_days_from_gregorian(1970, 1, 1), 0);
        assert_eq!(gregorian_from_epoch_days(0), (1970, 1, 1));
    }

    #[test]
    fn known_epoch_days() {
        // 2000-03-01 and 1999-12-31 bracket a century leap day.
        assert_eq!(epoch_days_from_gregorian(2000, 3, 1), 11_017);
        assert_eq!(epoch_days_from_gregorian(1999, 12, 31), 10_956);
        assert_eq!(epoch_days_from_gregorian(1969, 12, 31), -1);
        assert_eq!(epoch_days_from_gregorian(2025, 11, 2), 20_394);
    }

    #[test]
    fn gregorian_round_trip_across_leap_boundaries() {
        for date in [
            (1900, 2, 28),
            (1900, 3, 1),
            (2000, 2, 29),
            (2020, 2, 29),
            (2025, 12, 31),
            (1600, 1, 1),
            (-44, 3, 15),
        ] {
            let days = epoch_days_from_gregorian(date.0, date.1, date.2);
            assert_eq!(gregorian_from_epoch_days(days), date);
        }
    }

    #[test]
    fn leap_year_rules() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2025));
        assert_eq!(iso_days_in_month(2024, 2), 29);
        assert_eq!(iso_days_in_month(2025, 2), 28);
        assert_eq!(iso_days_in_month(2025, 4), 30);
    }

    #[test]
    fn day_of_week_is_anchored_to_thursday() {
        assert_eq!(epoch_day_of_week(0), 4);
        // 2025-11-02 was a Sunday.
        assert_eq!(epoch_day_of_week(epoch_days_from_gregorian(2025, 11, 2)), 0);
    }
}
