//! Temporal structures.
//!
//! Each temporal kind has one struct tag and a fixed field layout. Zone-less
//! kinds (date, local time, local date-time) carry no zone on the wire and are
//! read in the receiving process's zone, whatever zone the sender had.

use std::fmt;

use chrono::{
    DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;

use super::HydrationError;
use crate::bolt::config::DateTimeEncoding;
use crate::bolt::packstream::{PackStreamStructure, PackStreamValue};

/// Date: days since Unix epoch
pub const DATE_TAG: u8 = 0x44; // 'D'
/// Time: nanoseconds of day + offset seconds
pub const TIME_TAG: u8 = 0x54; // 'T'
/// LocalTime: nanoseconds of day
pub const LOCAL_TIME_TAG: u8 = 0x74; // 't'
/// LocalDateTime: wall-clock epoch seconds + nanoseconds
pub const LOCAL_DATE_TIME_TAG: u8 = 0x64; // 'd'
/// DateTime with offset, UTC seconds
pub const DATE_TIME_TAG: u8 = 0x49; // 'I'
/// DateTime with zone id, UTC seconds
pub const DATE_TIME_ZONE_ID_TAG: u8 = 0x69; // 'i'
/// DateTime with offset, wall-clock seconds
pub const LEGACY_DATE_TIME_TAG: u8 = 0x46; // 'F'
/// DateTime with zone id, wall-clock seconds
pub const LEGACY_DATE_TIME_ZONE_ID_TAG: u8 = 0x66; // 'f'
/// Duration: months, days, seconds, nanoseconds
pub const DURATION_TAG: u8 = 0x45; // 'E'

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;
/// `num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i64 = 719_163;

/// Check whether a tag belongs to a temporal layout.
pub fn is_temporal_tag(tag: u8) -> bool {
    matches!(
        tag,
        DATE_TAG
            | TIME_TAG
            | LOCAL_TIME_TAG
            | LOCAL_DATE_TIME_TAG
            | DATE_TIME_TAG
            | DATE_TIME_ZONE_ID_TAG
            | LEGACY_DATE_TIME_TAG
            | LEGACY_DATE_TIME_ZONE_ID_TAG
            | DURATION_TAG
    )
}

/// Time of day with a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTime {
    /// Wall-clock time of day
    pub time: NaiveTime,
    /// Offset from UTC
    pub offset: FixedOffset,
}

impl OffsetTime {
    /// Create a new offset time.
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

/// A calendar-aware duration.
///
/// The four components are kept apart: months have no fixed length in days,
/// and days have no fixed length in seconds across DST changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    /// Months
    pub months: i64,
    /// Days
    pub days: i64,
    /// Seconds
    pub seconds: i64,
    /// Nanoseconds
    pub nanoseconds: i32,
}

impl Duration {
    /// Create a new duration.
    pub fn new(months: i64, days: i64, seconds: i64, nanoseconds: i32) -> Self {
        Self {
            months,
            days,
            seconds,
            nanoseconds,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = i128::from(self.seconds) * 1_000_000_000 + i128::from(self.nanoseconds);
        let sign = if total < 0 { "-" } else { "" };
        let total = total.unsigned_abs();
        write!(
            f,
            "P{}M{}DT{}{}.{:09}S",
            self.months,
            self.days,
            sign,
            total / 1_000_000_000,
            total % 1_000_000_000
        )
    }
}

/// The zone a temporal value reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The receiving process's zone
    Local,
    /// A fixed offset
    Offset(FixedOffset),
    /// A named IANA region
    Named(Tz),
}

/// A temporal value.
///
/// `DateTime` and `ZonedDateTime` compare by instant only, following chrono.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalValue {
    /// Calendar day, proleptic Gregorian
    Date(NaiveDate),
    /// Time of day without zone
    LocalTime(NaiveTime),
    /// Date and time without zone
    LocalDateTime(NaiveDateTime),
    /// Time of day with fixed offset
    Time(OffsetTime),
    /// Instant with fixed offset
    DateTime(DateTime<FixedOffset>),
    /// Instant in a named zone
    ZonedDateTime(DateTime<Tz>),
    /// Duration
    Duration(Duration),
}

impl TemporalValue {
    /// Type name for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            TemporalValue::Date(_) => "Date",
            TemporalValue::LocalTime(_) => "LocalTime",
            TemporalValue::LocalDateTime(_) => "LocalDateTime",
            TemporalValue::Time(_) => "Time",
            TemporalValue::DateTime(_) => "DateTime",
            TemporalValue::ZonedDateTime(_) => "DateTimeZoneId",
            TemporalValue::Duration(_) => "Duration",
        }
    }

    /// Zone the value is expressed in. `None` for durations.
    pub fn zone(&self) -> Option<Zone> {
        match self {
            TemporalValue::Date(_)
            | TemporalValue::LocalTime(_)
            | TemporalValue::LocalDateTime(_) => Some(Zone::Local),
            TemporalValue::Time(t) => Some(Zone::Offset(t.offset)),
            TemporalValue::DateTime(dt) => Some(Zone::Offset(*dt.offset())),
            TemporalValue::ZonedDateTime(dt) => Some(Zone::Named(dt.timezone())),
            TemporalValue::Duration(_) => None,
        }
    }

    /// Resolve the value against the process zone.
    ///
    /// Zone-less values are taken as local wall-clock time (dates at
    /// midnight); instants are converted. Returns `None` for times of day,
    /// durations, and wall-clock times that do not exist locally.
    pub fn to_local_datetime(&self) -> Option<DateTime<chrono::Local>> {
        match self {
            TemporalValue::Date(d) => chrono::Local
                .from_local_datetime(&d.and_time(NaiveTime::MIN))
                .earliest(),
            TemporalValue::LocalDateTime(dt) => chrono::Local.from_local_datetime(dt).earliest(),
            TemporalValue::DateTime(dt) => Some(dt.with_timezone(&chrono::Local)),
            TemporalValue::ZonedDateTime(dt) => Some(dt.with_timezone(&chrono::Local)),
            TemporalValue::LocalTime(_) | TemporalValue::Time(_) | TemporalValue::Duration(_) => {
                None
            }
        }
    }

    /// Convert to the wire structure.
    pub fn to_structure(&self, encoding: DateTimeEncoding) -> PackStreamStructure {
        use PackStreamValue::{Integer, String as Str};

        match self {
            TemporalValue::Date(d) => {
                PackStreamStructure::new(DATE_TAG, vec![Integer(epoch_days(d))])
            }
            TemporalValue::LocalTime(t) => {
                PackStreamStructure::new(LOCAL_TIME_TAG, vec![Integer(nanos_of_day(t))])
            }
            TemporalValue::Time(t) => PackStreamStructure::new(
                TIME_TAG,
                vec![
                    Integer(nanos_of_day(&t.time)),
                    Integer(t.offset.local_minus_utc() as i64),
                ],
            ),
            TemporalValue::LocalDateTime(dt) => {
                let (seconds, nanos) = split_timestamp(&dt.and_utc());
                PackStreamStructure::new(
                    LOCAL_DATE_TIME_TAG,
                    vec![Integer(seconds), Integer(nanos)],
                )
            }
            TemporalValue::DateTime(dt) => {
                let offset = Integer(dt.offset().local_minus_utc() as i64);
                let (tag, (seconds, nanos)) = match encoding {
                    DateTimeEncoding::Utc => (DATE_TIME_TAG, split_timestamp(dt)),
                    DateTimeEncoding::Legacy => (
                        LEGACY_DATE_TIME_TAG,
                        split_timestamp(&dt.naive_local().and_utc()),
                    ),
                };
                PackStreamStructure::new(tag, vec![Integer(seconds), Integer(nanos), offset])
            }
            TemporalValue::ZonedDateTime(dt) => {
                let zone = Str(dt.timezone().name().to_string());
                let (tag, (seconds, nanos)) = match encoding {
                    DateTimeEncoding::Utc => (DATE_TIME_ZONE_ID_TAG, split_timestamp(dt)),
                    DateTimeEncoding::Legacy => (
                        LEGACY_DATE_TIME_ZONE_ID_TAG,
                        split_timestamp(&dt.naive_local().and_utc()),
                    ),
                };
                PackStreamStructure::new(tag, vec![Integer(seconds), Integer(nanos), zone])
            }
            TemporalValue::Duration(d) => PackStreamStructure::new(
                DURATION_TAG,
                vec![
                    Integer(d.months),
                    Integer(d.days),
                    Integer(d.seconds),
                    Integer(d.nanoseconds as i64),
                ],
            ),
        }
    }

    /// Parse from a wire structure. Both date-time layouts are accepted.
    pub fn from_structure(s: &PackStreamStructure) -> Result<Self, HydrationError> {
        match s.tag {
            DATE_TAG => {
                let f = Fields::new(s, "Date", 1)?;
                let days = f.int(0)?;
                date_from_epoch_days(days)
                    .map(TemporalValue::Date)
                    .ok_or_else(|| out_of_range("Date", format!("{} days", days)))
            }
            LOCAL_TIME_TAG => {
                let f = Fields::new(s, "LocalTime", 1)?;
                time_from_nanos_of_day("LocalTime", f.int(0)?).map(TemporalValue::LocalTime)
            }
            TIME_TAG => {
                let f = Fields::new(s, "Time", 2)?;
                let time = time_from_nanos_of_day("Time", f.int(0)?)?;
                let offset = offset_from_seconds("Time", f.int(1)?)?;
                Ok(TemporalValue::Time(OffsetTime::new(time, offset)))
            }
            LOCAL_DATE_TIME_TAG => {
                let f = Fields::new(s, "LocalDateTime", 2)?;
                let dt = utc_from_parts("LocalDateTime", f.int(0)?, f.int(1)?)?;
                Ok(TemporalValue::LocalDateTime(dt.naive_utc()))
            }
            DATE_TIME_TAG | LEGACY_DATE_TIME_TAG => {
                let f = Fields::new(s, "DateTime", 3)?;
                let parts = utc_from_parts("DateTime", f.int(0)?, f.int(1)?)?;
                let offset = offset_from_seconds("DateTime", f.int(2)?)?;
                let dt = if s.tag == DATE_TIME_TAG {
                    parts.with_timezone(&offset)
                } else {
                    resolve_local(&offset, &parts.naive_utc(), "DateTime")?
                };
                Ok(TemporalValue::DateTime(dt))
            }
            DATE_TIME_ZONE_ID_TAG | LEGACY_DATE_TIME_ZONE_ID_TAG => {
                let f = Fields::new(s, "DateTimeZoneId", 3)?;
                let parts = utc_from_parts("DateTimeZoneId", f.int(0)?, f.int(1)?)?;
                let name = f.str(2)?;
                let zone: Tz = name
                    .parse()
                    .map_err(|_| HydrationError::UnknownZone(name.to_string()))?;
                let dt = if s.tag == DATE_TIME_ZONE_ID_TAG {
                    parts.with_timezone(&zone)
                } else {
                    resolve_local(&zone, &parts.naive_utc(), "DateTimeZoneId")?
                };
                Ok(TemporalValue::ZonedDateTime(dt))
            }
            DURATION_TAG => {
                let f = Fields::new(s, "Duration", 4)?;
                let nanos = f.int(3)?;
                let nanoseconds = i32::try_from(nanos)
                    .map_err(|_| out_of_range("Duration", format!("{} nanoseconds", nanos)))?;
                Ok(TemporalValue::Duration(Duration::new(
                    f.int(0)?,
                    f.int(1)?,
                    f.int(2)?,
                    nanoseconds,
                )))
            }
            _ => Err(HydrationError::UnknownTag(s.tag_display())),
        }
    }
}

/// Field access with layout checks for one struct.
pub(super) struct Fields<'a> {
    s: &'a PackStreamStructure,
    type_name: &'static str,
}

impl<'a> Fields<'a> {
    pub(super) fn new(
        s: &'a PackStreamStructure,
        type_name: &'static str,
        expected: usize,
    ) -> Result<Self, HydrationError> {
        if s.len() != expected {
            return Err(HydrationError::FieldCount {
                type_name,
                expected,
                actual: s.len(),
            });
        }
        Ok(Self { s, type_name })
    }

    pub(super) fn int(&self, index: usize) -> Result<i64, HydrationError> {
        self.s.int_field(index).ok_or_else(|| self.type_error(index, "Integer"))
    }

    pub(super) fn float(&self, index: usize) -> Result<f64, HydrationError> {
        self.s.float_field(index).ok_or_else(|| self.type_error(index, "Float"))
    }

    pub(super) fn str(&self, index: usize) -> Result<&'a str, HydrationError> {
        self.s.str_field(index).ok_or_else(|| self.type_error(index, "String"))
    }

    fn type_error(&self, index: usize, expected: &'static str) -> HydrationError {
        HydrationError::FieldType {
            type_name: self.type_name,
            index,
            expected,
        }
    }
}

fn out_of_range(type_name: &'static str, detail: String) -> HydrationError {
    HydrationError::OutOfRange { type_name, detail }
}

fn epoch_days(date: &NaiveDate) -> i64 {
    date.num_days_from_ce() as i64 - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    let from_ce = i32::try_from(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?).ok()?;
    NaiveDate::from_num_days_from_ce_opt(from_ce)
}

/// chrono encodes a leap second as nanoseconds >= 1e9; fold it into the
/// last representable nanosecond so the wire value stays in range.
fn subsec_nanos(nanos: u32) -> i64 {
    (nanos as i64).min(NANOS_PER_SECOND - 1)
}

fn nanos_of_day(time: &NaiveTime) -> i64 {
    time.num_seconds_from_midnight() as i64 * NANOS_PER_SECOND + subsec_nanos(time.nanosecond())
}

fn time_from_nanos_of_day(
    type_name: &'static str,
    nanos: i64,
) -> Result<NaiveTime, HydrationError> {
    if !(0..NANOS_PER_DAY).contains(&nanos) {
        return Err(out_of_range(type_name, format!("{} nanoseconds of day", nanos)));
    }
    NaiveTime::from_num_seconds_from_midnight_opt(
        (nanos / NANOS_PER_SECOND) as u32,
        (nanos % NANOS_PER_SECOND) as u32,
    )
    .ok_or_else(|| out_of_range(type_name, format!("{} nanoseconds of day", nanos)))
}

fn offset_from_seconds(
    type_name: &'static str,
    seconds: i64,
) -> Result<FixedOffset, HydrationError> {
    i32::try_from(seconds)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| out_of_range(type_name, format!("offset of {} seconds", seconds)))
}

fn split_timestamp<Z: TimeZone>(dt: &DateTime<Z>) -> (i64, i64) {
    (dt.timestamp(), subsec_nanos(dt.timestamp_subsec_nanos()))
}

fn utc_from_parts(
    type_name: &'static str,
    seconds: i64,
    nanos: i64,
) -> Result<DateTime<Utc>, HydrationError> {
    if !(0..NANOS_PER_SECOND).contains(&nanos) {
        return Err(out_of_range(type_name, format!("{} nanoseconds", nanos)));
    }
    DateTime::from_timestamp(seconds, nanos as u32)
        .ok_or_else(|| out_of_range(type_name, format!("{} seconds since epoch", seconds)))
}

/// Place a wall-clock time in `zone`. In a fold the earlier instant wins.
fn resolve_local<Z: TimeZone>(
    zone: &Z,
    local: &NaiveDateTime,
    type_name: &'static str,
) -> Result<DateTime<Z>, HydrationError> {
    match zone.from_local_datetime(local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(out_of_range(
            type_name,
            format!("{} does not exist in the zone", local),
        )),
    }
}
