use crate::record::Timestamp;

/// how record timestamps are rendered in the time column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeFormat {
    /// seconds since the epoch with nanoseconds, `1588316753.000000784`
    #[default]
    Timestamp,
    /// `2020-05-01 07:05:53.000000784` (UTC)
    DateTime,
    /// `07:05:53.000000784` (UTC)
    TimeOnly,
}

impl TimeFormat {
    /// cycles Timestamp -> DateTime -> TimeOnly -> Timestamp
    pub fn next(self) -> Self {
        match self {
            Self::Timestamp => Self::DateTime,
            Self::DateTime => Self::TimeOnly,
            Self::TimeOnly => Self::Timestamp,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::DateTime => "date time",
            Self::TimeOnly => "time",
        }
    }

    pub fn format(self, timestamp: Timestamp) -> String {
        match self {
            Self::Timestamp => timestamp.to_string(),
            Self::DateTime => timestamp
                .to_datetime()
                .format("%Y-%m-%d %H:%M:%S%.9f")
                .to_string(),
            Self::TimeOnly => timestamp.to_datetime().format("%H:%M:%S%.9f").to_string(),
        }
    }
}
