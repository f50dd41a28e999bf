use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use num_traits::ToPrimitive;

use crate::result::{illegal_operation, illegal_operation_raw, IonError, IonResult};
use crate::types::decimal::Decimal;

/// Indicates the most precise time unit that a `Timestamp` stores. Each level implies the
/// presence of every coarser component; an hour can never appear without its minute.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub enum Precision {
    /// Year-level precision (e.g. `2020T`)
    Year,
    /// Month-level precision (e.g. `2020-08T`)
    Month,
    /// Day-level precision (e.g. `2020-08-01T`)
    Day,
    /// Minute-level precision (e.g. `2020-08-01T12:34Z`)
    HourAndMinute,
    /// Second-level precision or greater (e.g. `2020-08-01T12:34:56Z`)
    Second,
}

/// Stores the fractional seconds of a second-precision `Timestamp`.
#[derive(Debug, Clone)]
pub enum Mantissa {
    /// The number of decimal places of precision; the digits themselves live in the
    /// timestamp's nanosecond-of-second field. Only mantissas of nine digits or fewer
    /// are representable this way.
    Digits(u32),
    /// An exact decimal in the half-open interval [0.0, 1.0). Used when the fraction
    /// requires more than nine digits, or when its encoding must survive a round trip
    /// exactly (e.g. `0.0500` with its two trailing zeros).
    Arbitrary(Decimal),
}

impl Mantissa {
    /// The fraction as a decimal, however it is stored. Returns None for an empty
    /// (zero-digit) mantissa.
    pub(crate) fn as_decimal(&self, nanoseconds: u32) -> Option<Decimal> {
        match self {
            Mantissa::Digits(0) => None,
            Mantissa::Digits(digits) => {
                let digits = (*digits).min(9);
                let scale = 10u64.pow(9 - digits);
                let coefficient = nanoseconds as u64 / scale;
                Some(Decimal::new(coefficient, -(digits as i64)))
            }
            Mantissa::Arbitrary(decimal) => Some(decimal.clone()),
        }
    }
}

/// Converts a fractional-seconds decimal to its nanosecond-of-second equivalent, truncating
/// any sub-nanosecond digits. Returns `None` for values outside the interval [0.0, 1.0).
pub(crate) fn fraction_to_nanoseconds(fraction: &Decimal) -> Option<u32> {
    let coefficient = fraction.coefficient();
    if coefficient.is_negative() && !coefficient.is_zero() {
        return None;
    }
    let scale_exponent = 9 + fraction.exponent();
    let nanoseconds = if scale_exponent >= 0 {
        // Exponents above u32::MAX digits cannot possibly produce an in-range value
        let scale = Decimal::power_of_ten(u32::try_from(scale_exponent).ok()?);
        coefficient.to_big_int() * scale
    } else {
        let scale = Decimal::power_of_ten(u32::try_from(-scale_exponent).ok()?);
        coefficient.to_big_int() / scale
    };
    let nanoseconds = nanoseconds.to_u32()?;
    if nanoseconds > 999_999_999 {
        return None;
    }
    Some(nanoseconds)
}

/// A point in time, recorded with a particular precision and an optional offset from UTC.
///
/// Unlike a `chrono::DateTime`, a `Timestamp` remembers how much of itself was actually
/// specified: `2020T` and `2020-01-01T00:00:00.000Z` refer to the same instant but are
/// distinct timestamps. Two timestamps are equal only if their components, precision, and
/// offset all match.
///
/// The `date_time` field stores the timestamp's *local* components. When an offset is
/// present, the binary encoding converts to UTC on write and back on read.
#[derive(Debug, Clone)]
pub struct Timestamp {
    pub(crate) date_time: NaiveDateTime,
    pub(crate) offset: Option<FixedOffset>,
    pub(crate) precision: Precision,
    pub(crate) fractional_seconds: Option<Mantissa>,
}

impl Timestamp {
    /// Begins building a year-precision timestamp.
    pub fn with_year(year: u32) -> TimestampBuilder {
        TimestampBuilder::new(year)
    }

    /// Begins building a day-precision timestamp.
    pub fn with_ymd(year: u32, month: u32, day: u32) -> TimestampBuilder {
        TimestampBuilder::new(year).with_month(month).with_day(day)
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// The local offset from UTC in minutes, if one is known. `Some(0)` denotes UTC proper;
    /// `None` denotes an unspecified local offset.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    pub(crate) fn offset_minutes(&self) -> Option<i32> {
        self.offset.map(|offset| offset.local_minus_utc() / 60)
    }

    pub fn year(&self) -> u32 {
        self.date_time.year() as u32
    }

    pub fn month(&self) -> u32 {
        self.date_time.month()
    }

    pub fn day(&self) -> u32 {
        self.date_time.day()
    }

    pub fn hour(&self) -> u32 {
        self.date_time.hour()
    }

    pub fn minute(&self) -> u32 {
        self.date_time.minute()
    }

    pub fn second(&self) -> u32 {
        self.date_time.second()
    }

    /// The sub-second component in nanoseconds, truncated if the mantissa holds more than
    /// nine digits of precision.
    pub fn nanoseconds(&self) -> u32 {
        self.date_time.nanosecond()
    }

    /// The fractional-seconds component as a decimal, if this timestamp has one.
    pub fn fractional_seconds(&self) -> Option<Decimal> {
        self.fractional_seconds
            .as_ref()
            .and_then(|mantissa| mantissa.as_decimal(self.nanoseconds()))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        if self.precision != other.precision || self.offset != other.offset {
            return false;
        }
        let precision = self.precision;
        if self.year() != other.year() {
            return false;
        }
        if precision >= Precision::Month && self.month() != other.month() {
            return false;
        }
        if precision >= Precision::Day && self.day() != other.day() {
            return false;
        }
        if precision >= Precision::HourAndMinute
            && (self.hour() != other.hour() || self.minute() != other.minute())
        {
            return false;
        }
        if precision >= Precision::Second {
            if self.second() != other.second() {
                return false;
            }
            if self.fractional_seconds() != other.fractional_seconds() {
                return false;
            }
        }
        true
    }
}

impl Eq for Timestamp {}

impl From<DateTime<FixedOffset>> for Timestamp {
    fn from(date_time: DateTime<FixedOffset>) -> Self {
        let fractional_seconds = if date_time.nanosecond() == 0 {
            None
        } else {
            Some(Mantissa::Digits(9))
        };
        Timestamp {
            date_time: date_time.naive_local(),
            offset: Some(*date_time.offset()),
            precision: Precision::Second,
            fractional_seconds,
        }
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(date_time: NaiveDateTime) -> Self {
        let fractional_seconds = if date_time.nanosecond() == 0 {
            None
        } else {
            Some(Mantissa::Digits(9))
        };
        Timestamp {
            date_time,
            offset: None,
            precision: Precision::Second,
            fractional_seconds,
        }
    }
}

impl TryFrom<Timestamp> for DateTime<FixedOffset> {
    type Error = IonError;

    fn try_from(timestamp: Timestamp) -> Result<Self, Self::Error> {
        let offset = timestamp.offset.ok_or_else(|| {
            illegal_operation_raw(
                "cannot convert a timestamp with an unknown offset to a DateTime<FixedOffset>",
            )
        })?;
        match timestamp.date_time.and_local_timezone(offset) {
            chrono::LocalResult::Single(date_time) => Ok(date_time),
            _ => Err(illegal_operation_raw(
                "timestamp does not map to a single instant in its own offset",
            )),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A diagnostic rendering, not the Ion text encoding.
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02} ({:?}, offset {:?})",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute(),
            self.second(),
            self.precision,
            self.offset_minutes(),
        )
    }
}

/// Accumulates the components of a [Timestamp]. Components must be supplied in coarse-to-fine
/// order; the precision of the finished timestamp is the finest component supplied.
#[derive(Debug, Clone)]
pub struct TimestampBuilder {
    year: u32,
    month: Option<u32>,
    day: Option<u32>,
    hour_and_minute: Option<(u32, u32)>,
    second: Option<u32>,
    fractional_seconds: Option<Mantissa>,
    nanoseconds: u32,
    offset_minutes: Option<i32>,
}

impl TimestampBuilder {
    fn new(year: u32) -> TimestampBuilder {
        TimestampBuilder {
            year,
            month: None,
            day: None,
            hour_and_minute: None,
            second: None,
            fractional_seconds: None,
            nanoseconds: 0,
            offset_minutes: None,
        }
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    /// Sets the hour and minute components. Ion has no hour-only precision; the two
    /// components always travel together.
    pub fn with_hour_and_minute(mut self, hour: u32, minute: u32) -> Self {
        self.hour_and_minute = Some((hour, minute));
        self
    }

    pub fn with_second(mut self, second: u32) -> Self {
        self.second = Some(second);
        self
    }

    pub fn with_milliseconds(mut self, milliseconds: u32) -> Self {
        self.fractional_seconds = Some(Mantissa::Digits(3));
        self.nanoseconds = milliseconds * 1_000_000;
        self
    }

    pub fn with_nanoseconds(mut self, nanoseconds: u32) -> Self {
        self.fractional_seconds = Some(Mantissa::Digits(9));
        self.nanoseconds = nanoseconds;
        self
    }

    /// Sets the fractional seconds from an exact decimal, preserving its precision through
    /// a round trip. The decimal must lie in the interval [0.0, 1.0).
    pub fn with_fractional_seconds(mut self, fraction: Decimal) -> Self {
        self.fractional_seconds = Some(Mantissa::Arbitrary(fraction));
        self
    }

    pub fn with_offset(mut self, offset_minutes: i32) -> Self {
        self.offset_minutes = Some(offset_minutes);
        self
    }

    fn precision(&self) -> Precision {
        if self.second.is_some() {
            Precision::Second
        } else if self.hour_and_minute.is_some() {
            Precision::HourAndMinute
        } else if self.day.is_some() {
            Precision::Day
        } else if self.month.is_some() {
            Precision::Month
        } else {
            Precision::Year
        }
    }

    pub fn build(self) -> IonResult<Timestamp> {
        let precision = self.precision();
        if !(1..=9999).contains(&self.year) {
            return illegal_operation(format!("year {} is outside the range 1-9999", self.year));
        }
        if self.month.is_none() && self.day.is_some() {
            return illegal_operation("cannot specify a day without a month");
        }
        if self.hour_and_minute.is_none() && self.second.is_some() {
            return illegal_operation("cannot specify seconds without an hour and minute");
        }
        if self.hour_and_minute.is_some() && self.day.is_none() {
            return illegal_operation("cannot specify a time without a day");
        }
        if self.fractional_seconds.is_some() && self.second.is_none() {
            return illegal_operation("cannot specify fractional seconds without seconds");
        }
        if self.offset_minutes.is_some() && precision < Precision::HourAndMinute {
            return illegal_operation(
                "only timestamps with minute precision or finer can have a local offset",
            );
        }

        let (hour, minute) = self.hour_and_minute.unwrap_or((0, 0));
        let second = self.second.unwrap_or(0);
        let (fractional_seconds, nanoseconds) = match self.fractional_seconds {
            Some(Mantissa::Arbitrary(ref fraction)) => {
                let nanoseconds = fraction_to_nanoseconds(fraction).ok_or_else(|| {
                    illegal_operation_raw(
                        "fractional seconds must be in the interval [0.0, 1.0)",
                    )
                })?;
                (self.fractional_seconds.clone(), nanoseconds)
            }
            Some(Mantissa::Digits(digits)) if digits > 9 => {
                return illegal_operation("at most 9 fractional digits can be stored directly");
            }
            Some(_) => (self.fractional_seconds.clone(), self.nanoseconds),
            None => (None, 0),
        };

        let date = NaiveDate::from_ymd_opt(
            self.year as i32,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )
        .ok_or_else(|| illegal_operation_raw("invalid date components"))?;
        let date_time = date
            .and_hms_nano_opt(hour, minute, second, nanoseconds)
            .ok_or_else(|| illegal_operation_raw("invalid time components"))?;

        let offset = match self.offset_minutes {
            Some(minutes) => Some(
                minutes
                    .checked_mul(60)
                    .and_then(FixedOffset::east_opt)
                    .ok_or_else(|| {
                        illegal_operation_raw("offset is outside the range -23:59 to +23:59")
                    })?,
            ),
            None => None,
        };

        Ok(Timestamp {
            date_time,
            offset,
            precision,
            fractional_seconds,
        })
    }
}
