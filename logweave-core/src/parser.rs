use crate::{error::ParseError, record::LogRecord, view::LogSource};

/// Trait for turning a raw byte buffer into log records.
///
/// Implement this trait for every supported on-disk format. The parser only
/// sees bytes that are already resident in memory; opening and mapping files
/// is the caller's job.
///
/// # Contract
///
/// - returned records borrow `data`, they never copy message text
/// - returned records are ordered by timestamp
/// - malformed single entries are tolerated, only conditions that prevent
///   any further progress are reported as [`ParseError`]
/// - an empty buffer is a valid, empty log
pub trait LogParser: Send + Sync {
    /// short name of the format, used in debug logs
    fn name(&self) -> &'static str;

    fn parse<'a>(&self, data: &'a [u8]) -> Result<Vec<LogRecord<'a>>, ParseError>;

    /// parse `data` into a labelled base view
    fn parse_source<'a>(
        &self,
        label: &str,
        data: &'a [u8],
    ) -> Result<LogSource<'a>, ParseError> {
        let records = self.parse(data)?;
        log::debug!(
            "{}: parsed {} records from '{}' ({} bytes)",
            self.name(),
            records.len(),
            label,
            data.len()
        );
        Ok(LogSource::new(label, records))
    }
}
