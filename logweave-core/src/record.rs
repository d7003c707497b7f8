use crate::error::TimestampParseError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use std::{borrow::Cow, fmt, ops::Sub, str::FromStr};

pub const NANOS_PER_SEC: i128 = 1_000_000_000;
pub const NANOS_PER_MILLI: i128 = 1_000_000;

const FRACTION_DIGITS: usize = 9;
const DATE_TIME_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// severity of a log record
///
/// formats without level information put every record at `Info`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [Self::Debug, Self::Info, Self::Warning, Self::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// fixed-width (5 chars) label for column display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO ",
            Self::Warning => "WARN ",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// wall-clock instant with nanosecond resolution, counted from the unix epoch
///
/// carries no timezone; display helpers treat it as UTC
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// returns `None` when the instant does not fit into 64-bit nanoseconds
    pub fn from_nanos_i128(nanos: i128) -> Option<Self> {
        i64::try_from(nanos).ok().map(Self)
    }

    pub fn from_secs_nanos(secs: u64, nanos: u64) -> Option<Self> {
        Self::from_nanos_i128(i128::from(secs) * NANOS_PER_SEC + i128::from(nanos))
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    pub fn checked_add_nanos(self, nanos: i128) -> Option<Self> {
        Self::from_nanos_i128(i128::from(self.0) + nanos)
    }

    pub fn secs(self) -> i64 {
        self.0.div_euclid(NANOS_PER_SEC as i64)
    }

    pub fn subsec_nanos(self) -> u32 {
        self.0.rem_euclid(NANOS_PER_SEC as i64) as u32
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }

    fn parse_secs_fraction(input: &str) -> Result<Self, TimestampParseError> {
        let invalid = || TimestampParseError::Invalid(input.to_string());
        let (secs, fraction) = match input.split_once('.') {
            Some((secs, fraction)) => (secs, fraction),
            None => (input, ""),
        };
        if secs.is_empty() || !secs.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > FRACTION_DIGITS || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let secs: u64 = secs
            .parse()
            .map_err(|_| TimestampParseError::OutOfRange(input.to_string()))?;
        // "12.5" means half a second, so pad the fraction to nanoseconds
        let nanos = if fraction.is_empty() {
            0
        } else {
            format!("{:0<width$}", fraction, width = FRACTION_DIGITS)
                .parse::<u64>()
                .map_err(|_| invalid())?
        };
        Self::from_secs_nanos(secs, nanos)
            .ok_or_else(|| TimestampParseError::OutOfRange(input.to_string()))
    }

    fn parse_date_time(input: &str) -> Result<Self, TimestampParseError> {
        let parsed = DATE_TIME_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .ok_or_else(|| TimestampParseError::Invalid(input.to_string()))?;
        parsed
            .and_utc()
            .timestamp_nanos_opt()
            .map(Self)
            .ok_or_else(|| TimestampParseError::OutOfRange(input.to_string()))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.secs(), self.subsec_nanos())
    }
}

/// accepts `secs`, `secs.fraction` or `YYYY-MM-DD hh:mm:ss[.fraction]` (UTC)
impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(TimestampParseError::Empty);
        }
        if input.contains(['-', ':']) {
            Self::parse_date_time(input)
        } else {
            Self::parse_secs_fraction(input)
        }
    }
}

impl Sub for Timestamp {
    type Output = TimeDelta;

    fn sub(self, rhs: Self) -> TimeDelta {
        TimeDelta::nanoseconds(self.0.saturating_sub(rhs.0))
    }
}

/// a single parsed log entry
///
/// `message` borrows the byte buffer the record was parsed from, so every
/// view holding records keeps that buffer borrowed for as long as it lives
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub timestamp: Timestamp,
    pub level: LogLevel,
    pub message: &'a [u8],
}

impl<'a> LogRecord<'a> {
    pub fn new(timestamp: Timestamp, level: LogLevel, message: &'a [u8]) -> Self {
        Self {
            timestamp,
            level,
            message,
        }
    }

    /// message decoded for display, invalid UTF-8 is replaced
    pub fn message_text(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_display_pads_nanos() {
        let ts = Timestamp::from_secs_nanos(1588316753, 784).unwrap();
        assert_eq!(ts.to_string(), "1588316753.000000784");
    }

    #[test]
    fn test_timestamp_before_epoch_splits_euclid() {
        let ts = Timestamp::from_nanos(-1);
        assert_eq!(ts.secs(), -1);
        assert_eq!(ts.subsec_nanos(), 999_999_999);
    }

    #[test]
    fn test_parse_secs_and_fraction() {
        let ts: Timestamp = "12.5".parse().unwrap();
        assert_eq!(ts.as_nanos(), 12_500_000_000);

        let ts: Timestamp = " 7 ".parse().unwrap();
        assert_eq!(ts.as_nanos(), 7_000_000_000);

        let ts: Timestamp = "1.000000001".parse().unwrap();
        assert_eq!(ts.as_nanos(), 1_000_000_001);
    }

    #[test]
    fn test_parse_date_time() {
        let ts: Timestamp = "1970-01-01 00:00:01.25".parse().unwrap();
        assert_eq!(ts.as_nanos(), 1_250_000_000);

        let ts: Timestamp = "2020-05-01T07:05:53".parse().unwrap();
        assert_eq!(ts.secs(), 1588316753);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!("".parse::<Timestamp>(), Err(TimestampParseError::Empty));
        assert!("abc".parse::<Timestamp>().is_err());
        assert!("1.1234567891".parse::<Timestamp>().is_err());
        assert!("99999999999999999999".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_difference_is_time_delta() {
        let a = Timestamp::from_nanos(1_500);
        let b = Timestamp::from_nanos(500);
        assert_eq!(a - b, TimeDelta::nanoseconds(1_000));
    }

    #[test]
    fn test_level_labels_have_equal_width() {
        for level in LogLevel::ALL {
            assert_eq!(level.label().len(), 5);
        }
    }
}
