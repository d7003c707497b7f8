use crate::record::{LogRecord, Timestamp};
use itertools::Itertools;

/// a read-only sequence of log records ordered by timestamp
///
/// implemented by parsed sources, filters and merged views. Every
/// implementation materializes its records when it is built, so
/// `records()` is a plain slice access and the ordering is established
/// once at construction time.
pub trait LogView<'a> {
    /// records, non-decreasing by timestamp
    fn records(&self) -> &[LogRecord<'a>];

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// base view holding the records parsed from one byte buffer
#[derive(Debug, Clone)]
pub struct LogSource<'a> {
    label: String,
    records: Vec<LogRecord<'a>>,
}

impl<'a> LogSource<'a> {
    /// wraps parsed records, re-sorting them (stably) if a parser handed
    /// them over out of order
    pub fn new(label: impl Into<String>, mut records: Vec<LogRecord<'a>>) -> Self {
        let label = label.into();
        if !is_time_ordered(&records) {
            log::warn!(
                "LogSource: records of '{}' are not ordered by timestamp, sorting",
                label
            );
            records.sort_by_key(|record| record.timestamp);
        }
        Self { label, records }
    }

    /// human readable origin, usually the file path
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<'a> LogView<'a> for LogSource<'a> {
    fn records(&self) -> &[LogRecord<'a>] {
        &self.records
    }
}

pub fn is_time_ordered(records: &[LogRecord<'_>]) -> bool {
    records
        .iter()
        .tuple_windows()
        .all(|(prev, next)| prev.timestamp <= next.timestamp)
}

/// index of the record to select for `target`: the first record stamped
/// exactly `target`, otherwise the last record before it
///
/// falls back to the first record when every record is later and to the
/// last record when every record is earlier. Returns 0 for an empty slice.
pub fn index_at_or_before(records: &[LogRecord<'_>], target: Timestamp) -> usize {
    if records.is_empty() {
        return 0;
    }
    let lower_bound = records.partition_point(|record| record.timestamp < target);
    if lower_bound == records.len() {
        return records.len() - 1;
    }
    if lower_bound > 0 && records[lower_bound].timestamp > target {
        lower_bound - 1
    } else {
        lower_bound
    }
}
