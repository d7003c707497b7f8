use crate::bytes::{find_byte, leading_u64, trim_matches};
use logweave_core::{
    LogLevel, LogParser, LogRecord, ParseError, Timestamp,
    record::{NANOS_PER_MILLI, NANOS_PER_SEC},
};

const LEVEL_LABELS: [(&[u8], LogLevel); 10] = [
    (b"MORE", LogLevel::Debug),
    (b"DEBUG", LogLevel::Debug),
    (b"TRACE", LogLevel::Debug),
    (b"INFO", LogLevel::Info),
    (b"WARN", LogLevel::Warning),
    (b"ERROR", LogLevel::Error),
    (b"CRIT", LogLevel::Error),
    (b"ALERT", LogLevel::Error),
    (b"EMERG", LogLevel::Error),
    (b"FATAL", LogLevel::Error),
];

const MESSAGE_TRIM: &[u8] = b" \r\n";

/// fields of a line that starts a new record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    counter: u64,
    secs: u64,
    millis: u64,
    level: LogLevel,
    // offset of the message within the line
    message_start: usize,
}

/// a record whose message may still grow by continuation lines
struct Pending {
    header: Header,
    start: usize,
    end: usize,
}

/// parser for structured text logs
///
/// ```text
/// 1000 | S 1588316753.784 2020-05-01 07:05:53 UTC | INFO | service started
/// ```
///
/// the leading number is a nanosecond counter. The first record pins it to
/// its wall-clock `secs.millis`, every later record is placed relative to
/// the first by its counter. Lines that are not headers belong to the
/// message of the record above them.
pub struct TextLogParser;

impl TextLogParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for TextLogParser {
    fn name(&self) -> &'static str {
        "TextLogParser"
    }

    fn parse<'a>(&self, data: &'a [u8]) -> Result<Vec<LogRecord<'a>>, ParseError> {
        let mut records = Vec::new();
        let mut base: Option<i128> = None;
        let mut pending: Option<Pending> = None;
        let mut continuation_lines = 0;
        let mut dropped_lines = 0;
        let mut headers = 0;
        let mut out_of_range = 0;
        let mut finish = |done: &Pending, records: &mut Vec<LogRecord<'a>>| {
            match make_record(data, done, &mut base) {
                Some(record) => records.push(record),
                None => {
                    log::debug!(
                        "TextLogParser: timestamp of counter {} is out of range, record dropped",
                        done.header.counter
                    );
                    out_of_range += 1;
                }
            }
        };

        let mut pos = 0;
        while pos < data.len() {
            let line_end = find_byte(&data[pos..], b'\n').map_or(data.len(), |i| pos + i);
            let line = &data[pos..line_end];

            if let Some(header) = parse_header(line) {
                headers += 1;
                if let Some(done) = pending.take() {
                    finish(&done, &mut records);
                }
                pending = Some(Pending {
                    header,
                    start: pos + header.message_start,
                    end: line_end,
                });
            } else if let Some(open) = pending.as_mut() {
                open.end = line_end;
                continuation_lines += 1;
            } else {
                dropped_lines += 1;
            }
            pos = line_end + 1;
        }
        if let Some(done) = pending.take() {
            finish(&done, &mut records);
        }

        if headers == 0 && !data.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::corrupted("no record header found in text log"));
        }
        log::debug!(
            "TextLogParser: {} records, {} continuation lines, {} leading lines dropped, {} out of range records dropped",
            records.len(),
            continuation_lines,
            dropped_lines,
            out_of_range
        );

        // counters of concurrent writers interleave
        records.sort_by_key(|record| record.timestamp);
        Ok(records)
    }
}

/// `None` when the record's time does not fit in 64-bit nanoseconds
///
/// the first representable record fixes the base the others are offset from
fn make_record<'a>(
    data: &'a [u8],
    pending: &Pending,
    base: &mut Option<i128>,
) -> Option<LogRecord<'a>> {
    let header = &pending.header;
    let counter = i128::from(header.counter);
    let nanos = match *base {
        Some(base) => base + counter,
        None => {
            i128::from(header.secs) * NANOS_PER_SEC + i128::from(header.millis) * NANOS_PER_MILLI
        }
    };
    let timestamp = Timestamp::from_nanos_i128(nanos)?;
    base.get_or_insert(nanos - counter);
    let message = trim_matches(&data[pending.start..pending.end], MESSAGE_TRIM);
    Some(LogRecord::new(timestamp, header.level, message))
}

/// `<counter> | <c> <secs>.<ms> <date time tz> | <LEVEL> | <message>`
fn parse_header(line: &[u8]) -> Option<Header> {
    let (counter, mut pos) = leading_u64(line)?;
    pos += line[pos..]
        .iter()
        .take_while(|&&b| b == b' ' || b == b'|')
        .count();

    // a marker character and the space after it
    if line.len() - pos <= 2 {
        return None;
    }
    pos += 2;

    let (secs, len) = leading_u64(&line[pos..])?;
    pos += len;
    if line.get(pos) != Some(&b'.') {
        return None;
    }
    pos += 1;

    let millis = match line.get(pos..pos + 4)? {
        [a, b, c, b' '] if [a, b, c].iter().all(|d| d.is_ascii_digit()) => {
            u64::from(a - b'0') * 100 + u64::from(b - b'0') * 10 + u64::from(c - b'0')
        }
        _ => return None,
    };
    pos += 4;

    pos += find_byte(&line[pos..], b'|')? + 1;
    let level_len = find_byte(&line[pos..], b'|')?;
    let level_token = trim_matches(&line[pos..pos + level_len], b" ");
    let level = LEVEL_LABELS
        .iter()
        .find(|(label, _)| *label == level_token)
        .map(|&(_, level)| level)?;

    Some(Header {
        counter,
        secs,
        millis,
        level,
        message_start: pos + level_len + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str) -> Result<Vec<(i64, LogLevel, String)>, ParseError> {
        let records = TextLogParser::new().parse(data.as_bytes())?;
        Ok(records
            .iter()
            .map(|r| {
                (
                    r.timestamp.as_nanos(),
                    r.level,
                    r.message_text().into_owned(),
                )
            })
            .collect())
    }

    #[test]
    fn test_parse_header() {
        let header =
            parse_header(b"1000 | S 1588316753.784 2020-05-01 07:05:53 UTC | WARN | disk low")
                .unwrap();
        assert_eq!(header.counter, 1000);
        assert_eq!(header.secs, 1588316753);
        assert_eq!(header.millis, 784);
        assert_eq!(header.level, LogLevel::Warning);
        assert_eq!(header.message_start, 56);
    }

    #[test]
    fn test_header_rejections() {
        assert!(parse_header(b" 1000 | S 1.784 d t z | INFO | m").is_none());
        assert!(parse_header(b"1000 | S 1.78 d t z | INFO | m").is_none());
        assert!(parse_header(b"1000 | S 1.7845 d t z | INFO | m").is_none());
        assert!(parse_header(b"1000 | S 1784 d t z | INFO | m").is_none());
        assert!(parse_header(b"1000 | S 1.784 d t z | info | m").is_none());
        assert!(parse_header(b"1000 | S 1.784 d t z | INFO m").is_none());
        assert!(parse_header(b"1000 |S").is_none());
    }

    #[test]
    fn test_base_from_first_record() {
        let data = "\
1000 | S 10.500 d t z | INFO | first
3000 | S 99.999 d t z | DEBUG | second
";
        let records = parse(data).unwrap();
        assert_eq!(
            records,
            vec![
                (10_500_000_000, LogLevel::Info, "first".to_string()),
                (10_500_002_000, LogLevel::Debug, "second".to_string()),
            ]
        );
    }

    #[test]
    fn test_continuation_lines_join_message() {
        let data = "\
100 | S 1.000 d t z | ERROR | request failed:
  stack frame 1\r
  stack frame 2
200 | S 1.000 d t z | INFO | recovered
";
        let records = parse(data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].2,
            "request failed:\n  stack frame 1\r\n  stack frame 2"
        );
        assert_eq!(records[1].2, "recovered");
    }

    #[test]
    fn test_level_mapping() {
        let labels = [
            ("MORE", LogLevel::Debug),
            ("TRACE", LogLevel::Debug),
            ("CRIT", LogLevel::Error),
            ("ALERT", LogLevel::Error),
            ("EMERG", LogLevel::Error),
            ("FATAL", LogLevel::Error),
        ];
        for (label, level) in labels {
            let line = format!("1 | S 1.000 d t z |  {}  | m", label);
            assert_eq!(parse_header(line.as_bytes()).map(|h| h.level), Some(level));
        }
    }

    #[test]
    fn test_out_of_order_counters_are_sorted() {
        let data = "\
500 | S 2.000 d t z | INFO | first written
100 | S 2.000 d t z | INFO | earlier counter
";
        let records = parse(data).unwrap();
        assert_eq!(records[0].2, "earlier counter");
        assert_eq!(records[0].0, 1_999_999_600);
        assert_eq!(records[1].0, 2_000_000_000);
    }

    #[test]
    fn test_leading_garbage_is_dropped() {
        let data = "log started\n\n7 | S 1.000 d t z | INFO |   padded message  \n";
        let records = parse(data).unwrap();
        assert_eq!(records, vec![(1_000_000_000, LogLevel::Info, "padded message".to_string())]);
    }

    #[test]
    fn test_empty_and_headerless_buffers() {
        assert_eq!(parse("").unwrap(), Vec::new());
        assert_eq!(parse(" \n\r\n").unwrap(), Vec::new());
        assert!(matches!(
            parse("no headers\nanywhere\n"),
            Err(ParseError::CorruptedFormat(_))
        ));
    }

    #[test]
    fn test_out_of_range_record_is_dropped() {
        let data = "\
1 | S 1.000 d t z | INFO | before
18446744073709551615 | S 1.000 d t z | ERROR | corrupted counter
  its continuation goes with it
3 | S 1.000 d t z | WARN | after
";
        let records = parse(data).unwrap();
        assert_eq!(
            records,
            vec![
                (1_000_000_000, LogLevel::Info, "before".to_string()),
                (1_000_000_002, LogLevel::Warning, "after".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_skips_out_of_range_first_record() {
        let data = "\
0 | S 18446744073709551615.000 d t z | INFO | far future
5 | S 2.000 d t z | INFO | sane
";
        assert_eq!(
            parse(data).unwrap(),
            vec![(2_000_000_000, LogLevel::Info, "sane".to_string())]
        );
    }
}
