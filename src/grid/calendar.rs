use chrono::{Datelike, NaiveDate, TimeDelta};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Unexpected time units '{0}', expected '<unit> since <date>'")]
    UnitsFormat(String),

    #[error("Unsupported time unit '{0}'")]
    UnknownUnit(String),

    #[error("Failed to parse reference date '{0}'")]
    ReferenceDate(String, #[source] chrono::ParseError),

    #[error("Reference date '{0}' does not exist in calendar '{1}'")]
    ReferenceOutsideCalendar(NaiveDate, Calendar),

    #[error("Unsupported calendar '{0}'")]
    UnknownCalendar(String),

    #[error("Unusable time offset {0}")]
    BadOffset(f64),

    #[error("Day offset {0} leaves the supported date range")]
    OutOfRange(i64),
}

const NOLEAP_MONTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const ALL_LEAP_MONTHS: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const DAY_360_MONTHS: [u32; 12] = [30; 12];

/// Day counts beyond this cannot land on a representable date from any
/// reference date: `NaiveDate` spans roughly 96 million days to either side
/// of year zero.
const MAX_DAY_OFFSET: f64 = 200_000_000.0;

/// CF calendar of a grid file's time axis.
///
/// `standard` and `gregorian` are treated as proleptic Gregorian. The
/// archives this crate reads start in 1850, well past the point where the
/// calendars diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calendar {
    ProlepticGregorian,
    NoLeap,
    AllLeap,
    Day360,
}

impl Calendar {
    pub fn parse(name: &str) -> Result<Self, CalendarError> {
        match name.to_ascii_lowercase().as_str() {
            "" | "standard" | "gregorian" | "proleptic_gregorian" => {
                Ok(Calendar::ProlepticGregorian)
            }
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            other => Err(CalendarError::UnknownCalendar(other.to_string())),
        }
    }

    /// Resolves `base + days` under this calendar to a real date.
    ///
    /// Returns `Ok(None)` for days that exist in the source calendar but not
    /// in the Gregorian one, such as February 30th of a `360_day` year. Those
    /// days are dropped by the caller and later surface as reported gaps.
    fn resolve(&self, base: NaiveDate, days: i64) -> Result<Option<NaiveDate>, CalendarError> {
        let months = match self {
            Calendar::ProlepticGregorian => {
                return base
                    .checked_add_signed(TimeDelta::days(days))
                    .map(Some)
                    .ok_or(CalendarError::OutOfRange(days));
            }
            Calendar::NoLeap => &NOLEAP_MONTHS,
            Calendar::AllLeap => &ALL_LEAP_MONTHS,
            Calendar::Day360 => &DAY_360_MONTHS,
        };
        let (year, month, day) = fixed_shift(base, days, months)
            .ok_or(CalendarError::ReferenceOutsideCalendar(base, *self))?;
        if year.unsigned_abs() > 262_000 {
            return Err(CalendarError::OutOfRange(days));
        }
        Ok(NaiveDate::from_ymd_opt(year as i32, month, day))
    }
}

impl std::fmt::Display for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
        };
        write!(f, "{name}")
    }
}

/// Shifts a date by `days` within a calendar of fixed month lengths.
///
/// Returns `None` when the reference date itself does not exist in that
/// calendar, e.g. January 31st under `360_day`.
fn fixed_shift(base: NaiveDate, days: i64, months: &[u32; 12]) -> Option<(i64, u32, u32)> {
    let month_index = (base.month() - 1) as usize;
    if base.day() > months[month_index] {
        return None;
    }
    let year_length: i64 = months.iter().map(|&m| i64::from(m)).sum();
    let before_month: i64 = months[..month_index].iter().map(|&m| i64::from(m)).sum();
    let ordinal = i64::from(base.year()) * year_length + before_month + i64::from(base.day()) - 1;
    let shifted = ordinal + days;
    let year = shifted.div_euclid(year_length);
    let mut day_of_year = shifted.rem_euclid(year_length) as u32;
    for (index, &length) in months.iter().enumerate() {
        if day_of_year < length {
            return Some((year, index as u32 + 1, day_of_year + 1));
        }
        day_of_year -= length;
    }
    unreachable!("day of year exceeds calendar length");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn parse(token: &str) -> Result<Self, CalendarError> {
        match token.to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(TimeUnit::Days),
            "hour" | "hours" => Ok(TimeUnit::Hours),
            "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "second" | "seconds" => Ok(TimeUnit::Seconds),
            other => Err(CalendarError::UnknownUnit(other.to_string())),
        }
    }

    fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

/// Decoded CF time encoding of one grid file.
///
/// Built from the time variable's `units` attribute, shaped like
/// `days since 1850-01-01` with an optional clock suffix, and its `calendar`
/// attribute. Offsets are floored to whole days after unit scaling, since the
/// archive stamps daily samples at noon.
#[derive(Debug, Clone, Copy)]
pub struct TimeEncoding {
    unit: TimeUnit,
    base: NaiveDate,
    calendar: Calendar,
}

impl TimeEncoding {
    pub fn parse(units: &str, calendar: &str) -> Result<Self, CalendarError> {
        let mut parts = units.splitn(3, ' ');
        let unit_token = parts.next().unwrap_or_default();
        let since = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default();
        if since != "since" || rest.is_empty() {
            return Err(CalendarError::UnitsFormat(units.to_string()));
        }
        let date_token = rest.split_whitespace().next().unwrap_or_default();
        let base = NaiveDate::parse_from_str(date_token, "%Y-%m-%d")
            .map_err(|e| CalendarError::ReferenceDate(date_token.to_string(), e))?;
        Ok(TimeEncoding {
            unit: TimeUnit::parse(unit_token)?,
            base,
            calendar: Calendar::parse(calendar)?,
        })
    }

    /// Decodes one raw time value to a date, or `None` for source-calendar
    /// days with no Gregorian equivalent. Offsets that cannot land on a real
    /// date at all, like a fill value left on the time axis, are errors.
    pub fn decode(&self, offset: f64) -> Result<Option<NaiveDate>, CalendarError> {
        if !offset.is_finite() {
            return Err(CalendarError::BadOffset(offset));
        }
        let days = (offset * self.unit.seconds() / 86_400.0).floor();
        // Catches fill values left unmasked on the time axis, like netCDF's
        // 9.97e36 default, before the cast below could saturate.
        if days.abs() > MAX_DAY_OFFSET {
            return Err(CalendarError::BadOffset(offset));
        }
        self.calendar.resolve(self.base, days as i64)
    }
}
