//! TZif-backed timezone rules.
//!
//! `ZoneRules` wraps the `tzif` crate's parsed representation of a
//! TZif file ([RFC 8536]) and answers the two questions the engine
//! asks: which offset is in effect at an instant, and which offsets a
//! naive wall-clock reading could correspond to. Instants past the end
//! of the transition table are resolved with the file's POSIX TZ
//! footer, which matters for "slim" files that stop listing
//! transitions once a recurring rule describes them.
//!
//! `TzdbProvider` loads rules from `/usr/share/zoneinfo`, falling back
//! to the bundled `jiff-tzdb` data when the system database is missing
//! or unreadable.
//!
//! [RFC 8536]: https://datatracker.ietf.org/doc/html/rfc8536

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;

use combine::Parser;
use log::{debug, warn};
use num_traits::ToPrimitive;
use tzif::data::posix::{DstTransitionInfo, PosixTzString, TransitionDay};
use tzif::data::time::Seconds;
use tzif::data::tzif::{DataBlock, LocalTimeTypeRecord, TzifData};

use crate::iso::IsoDateTime;
use crate::provider::{UtcOffsetSeconds, WallOffsetMatch, ZoneRulesProvider};
use crate::utils;
use crate::{ConversionError, ConversionResult};

const ZONEINFO_DIR: &str = "/usr/share/zoneinfo/";

const SECONDS_PER_DAY: i64 = 86_400;

/// The transition history and continuation rule of one timezone.
#[derive(Debug, Clone)]
pub struct ZoneRules {
    data: DataBlock,
    posix: Option<PosixTzString>,
}

impl ZoneRules {
    /// Parses TZif bytes, e.g. the bundled `jiff-tzdb` data.
    pub fn from_bytes(data: &[u8]) -> ConversionResult<Self> {
        let Ok((parsed, _)) = tzif::parse::tzif::tzif().parse(data) else {
            return Err(ConversionError::zone_data("ill-formed TZif data"));
        };
        Self::from_tzif(parsed)
    }

    /// Reads and parses a TZif file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConversionResult<Self> {
        tzif::parse_tzif_file(path.as_ref())
            .map_err(|err| ConversionError::zone_data(err.to_string()))
            .and_then(Self::from_tzif)
    }

    fn from_tzif(data: TzifData) -> ConversionResult<Self> {
        let TzifData {
            data_block2,
            footer,
            ..
        } = data;
        // Version 1 blocks carry 32-bit timestamps and no footer.
        let data = data_block2
            .ok_or_else(|| ConversionError::zone_data("only TZif version 2+ is supported"))?;
        Ok(Self {
            data,
            posix: footer,
        })
    }

    /// The offset in effect at an absolute epoch second.
    pub fn offset_at(&self, epoch_seconds: i64) -> ConversionResult<UtcOffsetSeconds> {
        let transitions = &self.data.transition_times;
        let beyond = transitions
            .last()
            .is_none_or(|last| epoch_seconds > last.0);
        if beyond {
            if self.posix.is_some() {
                return self.footer_offset_at(epoch_seconds);
            }
            // Without a footer the final record extends indefinitely.
            if let Some(last) = transitions.len().checked_sub(1) {
                return Ok(UtcOffsetSeconds(self.record_after(last)?.utoff.0));
            }
            return self.first_record_offset();
        }
        let record = match transitions.binary_search(&Seconds(epoch_seconds)) {
            // A transition takes effect at its own timestamp.
            Ok(idx) => self.record_after(idx)?,
            Err(0) => return self.first_record_offset(),
            Err(idx) => self.record_after(idx - 1)?,
        };
        Ok(UtcOffsetSeconds(record.utoff.0))
    }

    /// Matches a wall-clock reading, given as as-if-UTC epoch seconds,
    /// against the zone's transitions.
    ///
    /// Each local-time interval between two transitions yields at most
    /// one candidate instant for the reading; zero candidates is a
    /// gap, two is a fold. Only the intervals adjacent to the
    /// reading's position can produce candidates, since offsets are
    /// tiny compared to the spacing of transitions.
    pub fn match_wall(&self, wall_seconds: i64) -> ConversionResult<WallOffsetMatch> {
        let transitions = &self.data.transition_times;
        // A day of slack keeps folds straddling the final transition
        // inside the table; past that, the footer owns resolution.
        let beyond = transitions
            .last()
            .is_none_or(|last| wall_seconds > last.0 + SECONDS_PER_DAY);
        if beyond && self.posix.is_some() {
            return self.footer_match_wall(wall_seconds);
        }
        let idx = transitions
            .binary_search(&Seconds(wall_seconds))
            .unwrap_or_else(|idx| idx);
        let count = transitions.len();
        let mut candidates = Vec::with_capacity(2);
        for interval in idx.saturating_sub(1)..=(idx + 1).min(count) {
            let start = if interval == 0 {
                i64::MIN
            } else {
                transitions[interval - 1].0
            };
            let end = if interval == count {
                i64::MAX
            } else {
                transitions[interval].0
            };
            let offset = if interval == 0 {
                self.first_record_offset()?.0
            } else {
                self.record_after(interval - 1)?.utoff.0
            };
            let instant = wall_seconds - offset;
            if start <= instant && instant < end {
                candidates.push((instant, offset));
            }
        }
        Ok(candidates_to_match(candidates))
    }

    /// The record governing local time after transition `idx`.
    fn record_after(&self, idx: usize) -> ConversionResult<LocalTimeTypeRecord> {
        let type_idx = self.data.transition_types.get(idx).copied().unwrap_or(0);
        self.data
            .local_time_type_records
            .get(type_idx)
            .copied()
            .ok_or_else(|| {
                ConversionError::zone_data("transition references a missing local time type")
            })
    }

    /// The record in effect before the first transition, which TZif
    /// defines as the first local time type.
    fn first_record_offset(&self) -> ConversionResult<UtcOffsetSeconds> {
        self.data
            .local_time_type_records
            .first()
            .map(|record| UtcOffsetSeconds(record.utoff.0))
            .ok_or_else(|| ConversionError::zone_data("zone data has no local time types"))
    }

    fn footer(&self) -> ConversionResult<&PosixTzString> {
        self.posix
            .as_ref()
            .ok_or_else(|| ConversionError::zone_data("zone data ends without a POSIX TZ rule"))
    }

    fn footer_offset_at(&self, epoch_seconds: i64) -> ConversionResult<UtcOffsetSeconds> {
        let posix = self.footer()?;
        let std_offset = -posix.std_info.offset.0;
        let Some(dst) = &posix.dst_info else {
            return Ok(UtcOffsetSeconds(std_offset));
        };
        let year = utils::gregorian_from_epoch_days(epoch_seconds.div_euclid(SECONDS_PER_DAY)).0;
        let transitions = rule_transitions(posix, dst, year);
        let offset = match transitions.binary_search_by_key(&epoch_seconds, |&(at, _)| at) {
            Ok(idx) => transitions[idx].1,
            Err(0) => offset_before_first(&transitions, std_offset, -dst.variant_info.offset.0),
            Err(idx) => transitions[idx - 1].1,
        };
        Ok(UtcOffsetSeconds(offset))
    }

    fn footer_match_wall(&self, wall_seconds: i64) -> ConversionResult<WallOffsetMatch> {
        let posix = self.footer()?;
        let std_offset = -posix.std_info.offset.0;
        let Some(dst) = &posix.dst_info else {
            return Ok(WallOffsetMatch::Unique(UtcOffsetSeconds(std_offset)));
        };
        let dst_offset = -dst.variant_info.offset.0;
        let year = utils::gregorian_from_epoch_days(wall_seconds.div_euclid(SECONDS_PER_DAY)).0;
        let transitions = rule_transitions(posix, dst, year);
        let count = transitions.len();
        let mut candidates = Vec::with_capacity(2);
        for interval in 0..=count {
            let start = if interval == 0 {
                i64::MIN
            } else {
                transitions[interval - 1].0
            };
            let end = if interval == count {
                i64::MAX
            } else {
                transitions[interval].0
            };
            let offset = if interval == 0 {
                offset_before_first(&transitions, std_offset, dst_offset)
            } else {
                transitions[interval - 1].1
            };
            let instant = wall_seconds - offset;
            if start <= instant && instant < end {
                candidates.push((instant, offset));
            }
        }
        Ok(candidates_to_match(candidates))
    }
}

fn candidates_to_match(mut candidates: Vec<(i64, i64)>) -> WallOffsetMatch {
    candidates.sort_unstable();
    match candidates.as_slice() {
        [] => WallOffsetMatch::Gap,
        [(_, offset)] => WallOffsetMatch::Unique(UtcOffsetSeconds(*offset)),
        [(_, first), .., (_, second)] => WallOffsetMatch::Fold {
            first: UtcOffsetSeconds(*first),
            second: UtcOffsetSeconds(*second),
        },
    }
}

/// The offset in effect before the earliest materialized rule
/// transition: the opposite variant of whichever one comes first.
fn offset_before_first(transitions: &[(i64, i64)], std_offset: i64, dst_offset: i64) -> i64 {
    match transitions.first() {
        Some(&(_, offset)) if offset == dst_offset => std_offset,
        _ => dst_offset,
    }
}

/// Materializes a POSIX DST rule into concrete transition instants for
/// the years surrounding `year`, as `(epoch second, offset after)`
/// pairs in chronological order.
fn rule_transitions(posix: &PosixTzString, dst: &DstTransitionInfo, year: i32) -> Vec<(i64, i64)> {
    let std_offset = -posix.std_info.offset.0;
    let dst_offset = -dst.variant_info.offset.0;
    let mut transitions = Vec::with_capacity(6);
    for y in year - 1..=year + 1 {
        // Rule times are local: standard time at the DST start,
        // daylight time at the DST end.
        let start = rule_epoch_seconds(&dst.start_date.day, dst.start_date.time.0, y, std_offset);
        let end = rule_epoch_seconds(&dst.end_date.day, dst.end_date.time.0, y, dst_offset);
        transitions.push((start, dst_offset));
        transitions.push((end, std_offset));
    }
    transitions.sort_unstable();
    transitions
}

fn rule_epoch_seconds(day: &TransitionDay, time_of_day: i64, year: i32, offset_before: i64) -> i64 {
    let epoch_day = match day {
        TransitionDay::NoLeap(n) => {
            // Day 1..=365 with February 29 never counted; mapping the
            // ordinal through a common year recovers the month and day.
            let base = utils::epoch_days_from_gregorian(2001, 1, 1) + i64::from(*n) - 1;
            let (_, month, day_of_month) = utils::gregorian_from_epoch_days(base);
            utils::epoch_days_from_gregorian(year, month, day_of_month)
        }
        TransitionDay::WithLeap(n) => utils::epoch_days_from_gregorian(year, 1, 1) + i64::from(*n),
        TransitionDay::Mwd(month, week, weekday) => {
            nth_weekday_of_month(year, *month as u8, *week, *weekday)
        }
    };
    epoch_day * SECONDS_PER_DAY + time_of_day - offset_before
}

/// Epoch day of the `week`th `weekday` (Sunday = 0) of a month, where
/// week 5 means the last occurrence.
fn nth_weekday_of_month(year: i32, month: u8, week: u16, weekday: u16) -> i64 {
    let first = utils::epoch_days_from_gregorian(year, month, 1);
    let first_weekday = i64::from(utils::epoch_day_of_week(first));
    let mut day_of_month =
        1 + (i64::from(weekday) - first_weekday).rem_euclid(7) + 7 * (i64::from(week) - 1);
    let days_in_month = i64::from(utils::iso_days_in_month(year, month));
    while day_of_month > days_in_month {
        day_of_month -= 7;
    }
    first + day_of_month - 1
}

/// A caching provider over the system zoneinfo directory with the
/// bundled database as a fallback.
#[derive(Debug, Default)]
pub struct TzdbProvider {
    cache: RwLock<BTreeMap<String, ZoneRules>>,
}

impl TzdbProvider {
    pub fn rules_for(&self, identifier: &str) -> ConversionResult<ZoneRules> {
        if let Ok(cache) = self.cache.read() {
            if let Some(rules) = cache.get(identifier) {
                return Ok(rules.clone());
            }
        }
        let rules = load_zone_rules(identifier)?;
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(identifier.to_owned(), rules.clone());
        }
        Ok(rules)
    }
}

fn load_zone_rules(identifier: &str) -> ConversionResult<ZoneRules> {
    // Identifiers are path fragments; refuse anything that could
    // escape the zoneinfo directory.
    if identifier.starts_with('/') || identifier.split('/').any(|part| part == "..") {
        return Err(ConversionError::unknown_zone(identifier));
    }
    let path = Path::new(ZONEINFO_DIR).join(identifier);
    if path.is_file() {
        match ZoneRules::from_path(&path) {
            Ok(rules) => return Ok(rules),
            Err(err) => warn!("unreadable zone file {}: {err}", path.display()),
        }
    }
    let Some((_, data)) = jiff_tzdb::get(identifier) else {
        return Err(ConversionError::unknown_zone(identifier));
    };
    debug!("using bundled zone data for {identifier}");
    ZoneRules::from_bytes(data)
}

impl ZoneRulesProvider for TzdbProvider {
    fn check_identifier(&self, identifier: &str) -> bool {
        self.rules_for(identifier).is_ok()
    }

    fn wall_offsets_for(
        &self,
        identifier: &str,
        wall: IsoDateTime,
    ) -> ConversionResult<WallOffsetMatch> {
        let seconds = wall
            .as_local_nanoseconds()
            .div_euclid(1_000_000_000)
            .to_i64()
            .ok_or_else(|| ConversionError::range("wall-clock time is out of range"))?;
        self.rules_for(identifier)?.match_wall(seconds)
    }

    fn offset_for(
        &self,
        identifier: &str,
        epoch_nanoseconds: i128,
    ) -> ConversionResult<UtcOffsetSeconds> {
        let seconds = epoch_nanoseconds
            .div_euclid(1_000_000_000)
            .to_i64()
            .ok_or_else(|| ConversionError::range("instant is out of range"))?;
        self.rules_for(identifier)?.offset_at(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled(identifier: &str) -> ZoneRules {
        let (_, data) = jiff_tzdb::get(identifier).unwrap();
        ZoneRules::from_bytes(data).unwrap()
    }

    fn wall(year: i32, month: u8, day: u8, hour: i64, minute: i64, second: i64) -> i64 {
        utils::epoch_days_from_gregorian(year, month, day) * SECONDS_PER_DAY
            + hour * 3600
            + minute * 60
            + second
    }

    #[test]
    fn new_york_spring_forward_gap() {
        let rules = bundled("America/New_York");
        // 02:00 jumps to 03:00 on 2017-03-12.
        assert_eq!(
            rules.match_wall(wall(2017, 3, 12, 2, 30, 0)).unwrap(),
            WallOffsetMatch::Gap
        );
        assert_eq!(
            rules.match_wall(wall(2017, 3, 12, 2, 59, 59)).unwrap(),
            WallOffsetMatch::Gap
        );
        assert_eq!(
            rules.match_wall(wall(2017, 3, 12, 1, 59, 59)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(-18_000))
        );
        assert_eq!(
            rules.match_wall(wall(2017, 3, 12, 3, 0, 0)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(-14_400))
        );
    }

    #[test]
    fn new_york_fall_back_fold() {
        let rules = bundled("America/New_York");
        // 02:00 falls back to 01:00 on 2017-11-05.
        let fold = WallOffsetMatch::Fold {
            first: UtcOffsetSeconds(-14_400),
            second: UtcOffsetSeconds(-18_000),
        };
        assert_eq!(rules.match_wall(wall(2017, 11, 5, 1, 0, 0)).unwrap(), fold);
        assert_eq!(rules.match_wall(wall(2017, 11, 5, 1, 30, 0)).unwrap(), fold);
        assert_eq!(
            rules.match_wall(wall(2017, 11, 5, 0, 59, 59)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(-14_400))
        );
        assert_eq!(
            rules.match_wall(wall(2017, 11, 5, 2, 0, 0)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(-18_000))
        );
    }

    #[test]
    fn sydney_transitions_are_inverted() {
        let rules = bundled("Australia/Sydney");
        // Southern hemisphere: DST ends 2017-04-02 (03:00 back to
        // 02:00) and begins 2017-10-01 (02:00 forward to 03:00).
        assert_eq!(
            rules.match_wall(wall(2017, 4, 2, 2, 30, 0)).unwrap(),
            WallOffsetMatch::Fold {
                first: UtcOffsetSeconds(39_600),
                second: UtcOffsetSeconds(36_000),
            }
        );
        assert_eq!(
            rules.match_wall(wall(2017, 10, 1, 2, 30, 0)).unwrap(),
            WallOffsetMatch::Gap
        );
    }

    #[test]
    fn footer_rules_cover_dates_past_the_table() {
        let rules = bundled("America/New_York");
        assert_eq!(
            rules.match_wall(wall(2025, 11, 2, 1, 30, 0)).unwrap(),
            WallOffsetMatch::Fold {
                first: UtcOffsetSeconds(-14_400),
                second: UtcOffsetSeconds(-18_000),
            }
        );
        assert_eq!(
            rules.match_wall(wall(2025, 3, 9, 2, 30, 0)).unwrap(),
            WallOffsetMatch::Gap
        );
    }

    #[test]
    fn offsets_at_instants() {
        let rules = bundled("America/New_York");
        // Instants here are computed as-if-UTC.
        assert_eq!(
            rules.offset_at(wall(2017, 7, 1, 12, 0, 0)).unwrap(),
            UtcOffsetSeconds(-14_400)
        );
        assert_eq!(
            rules.offset_at(wall(2017, 1, 15, 12, 0, 0)).unwrap(),
            UtcOffsetSeconds(-18_000)
        );
        // The DST transition takes effect at its own instant.
        assert_eq!(
            rules.offset_at(wall(2017, 3, 12, 7, 0, 0)).unwrap(),
            UtcOffsetSeconds(-14_400)
        );
        assert_eq!(
            rules.offset_at(wall(2017, 3, 12, 6, 59, 59)).unwrap(),
            UtcOffsetSeconds(-18_000)
        );
    }

    #[test]
    fn local_mean_time_before_the_first_transition() {
        let rules = bundled("America/New_York");
        assert_eq!(
            rules.match_wall(wall(1880, 1, 1, 0, 0, 0)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(-17_762))
        );
        assert_eq!(
            rules.offset_at(wall(1880, 1, 1, 0, 0, 0)).unwrap(),
            UtcOffsetSeconds(-17_762)
        );
    }

    #[test]
    fn fixed_offset_zones_never_fold() {
        let rules = bundled("Asia/Kolkata");
        assert_eq!(
            rules.match_wall(wall(2025, 1, 15, 12, 0, 0)).unwrap(),
            WallOffsetMatch::Unique(UtcOffsetSeconds(19_800))
        );
        assert_eq!(
            rules.offset_at(wall(2025, 7, 15, 12, 0, 0)).unwrap(),
            UtcOffsetSeconds(19_800)
        );
    }

    #[test]
    fn dangling_type_index_is_an_error_not_a_panic() {
        let rules = ZoneRules {
            data: DataBlock {
                transition_times: vec![Seconds(0)],
                transition_types: vec![2],
                local_time_type_records: Vec::new(),
                time_zone_designations: Vec::new(),
                leap_second_records: Vec::new(),
                standard_wall_indicators: Vec::new(),
                ut_local_indicators: Vec::new(),
            },
            posix: None,
        };
        assert!(matches!(
            rules.offset_at(100),
            Err(ConversionError::ZoneData(_))
        ));
        assert!(matches!(
            rules.match_wall(100),
            Err(ConversionError::ZoneData(_))
        ));
    }

    #[test]
    fn provider_resolves_and_caches() {
        let provider = TzdbProvider::default();
        assert!(provider.check_identifier("America/New_York"));
        assert!(provider.check_identifier("America/New_York"));
        assert!(!provider.check_identifier("Not/AZone"));
        assert!(!provider.check_identifier("../../etc/passwd"));
    }

    #[test]
    fn system_zoneinfo_agrees_with_bundled_data() {
        let path = Path::new(ZONEINFO_DIR).join("America/New_York");
        if !path.is_file() {
            return;
        }
        let system = ZoneRules::from_path(&path).unwrap();
        let seconds = wall(2017, 7, 1, 12, 0, 0);
        assert_eq!(
            system.offset_at(seconds).unwrap(),
            bundled("America/New_York").offset_at(seconds).unwrap()
        );
    }
}
