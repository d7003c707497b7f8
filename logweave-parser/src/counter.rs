use crate::bytes::{leading_u64, parse_u64, trim_matches};
use lazy_static::lazy_static;
use logweave_core::{
    LogLevel, LogParser, LogRecord, ParseError, Timestamp, is_time_ordered,
    record::NANOS_PER_SEC,
};
use regex::bytes::Regex;

lazy_static! {
    // every entry is written right after this marker
    static ref ENTRY_START_RE: Regex = Regex::new(r"\niPao2ijSahbe0F").unwrap();
}

const ANCHOR_TIME_TOKEN: &[u8] = b"time";
const ANCHOR_TAG_TOKEN: &[u8] = b"anchor:";

#[derive(Clone, Copy, Debug)]
struct RawEntry<'a> {
    counter: u64,
    message: &'a [u8],
}

/// an entry pinning a counter value to a wall-clock instant
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Anchor {
    counter: u64,
    nanos: i128,
}

/// parser for in-memory ring logs that stamp entries with a monotonic
/// counter instead of wall-clock time
///
/// entries look like `\niPao2ijSahbe0F<counter> <message>`. Some of them are
/// time anchors (`time anchor: <any> <secs>.<nanos> ...`); every other entry
/// gets its timestamp by linear interpolation between the two nearest
/// anchors, or extrapolation from the first or last two. Anchors themselves
/// are not emitted and every record is `Info`.
pub struct CounterLogParser;

impl CounterLogParser {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CounterLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for CounterLogParser {
    fn name(&self) -> &'static str {
        "CounterLogParser"
    }

    fn parse<'a>(&self, data: &'a [u8]) -> Result<Vec<LogRecord<'a>>, ParseError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = scan_entries(data);
        if entries.is_empty() {
            return Err(ParseError::corrupted("no well-formed counter log entry"));
        }
        entries.sort_by_key(|entry| entry.counter);

        let anchors: Vec<Option<Anchor>> = entries
            .iter()
            .map(|entry| {
                anchor_nanos(entry.message).map(|nanos| Anchor {
                    counter: entry.counter,
                    nanos,
                })
            })
            .collect();

        // anchors sharing a counter cannot define an interval, keep the first
        let mut references: Vec<Anchor> = Vec::new();
        for anchor in anchors.iter().flatten() {
            if references.last().map(|last| last.counter) != Some(anchor.counter) {
                references.push(*anchor);
            }
        }
        if references.len() < 2 {
            return Err(ParseError::InsufficientAnchors {
                found: references.len(),
            });
        }
        log::debug!(
            "CounterLogParser: {} entries, {} anchors ({} usable)",
            entries.len(),
            anchors.iter().flatten().count(),
            references.len()
        );

        let mut records = Vec::with_capacity(entries.len());
        // number of reference anchors at or before the current entry
        let mut passed = 0;
        let mut out_of_range = 0;
        for (entry, anchor) in entries.iter().zip(&anchors) {
            if anchor.is_some() {
                if references.get(passed).map(|r| r.counter) == Some(entry.counter) {
                    passed += 1;
                }
                continue;
            }
            let (first, second) = reference_pair(&references, passed);
            match interpolate(entry.counter, first, second) {
                Some(timestamp) => {
                    records.push(LogRecord::new(timestamp, LogLevel::Info, entry.message))
                }
                None => {
                    log::debug!(
                        "CounterLogParser: timestamp of counter {} is out of range (anchors at {} and {})",
                        entry.counter,
                        first.counter,
                        second.counter
                    );
                    out_of_range += 1;
                }
            }
        }
        if out_of_range > 0 {
            log::debug!(
                "CounterLogParser: dropped {} entries with out of range timestamps",
                out_of_range
            );
        }

        if !is_time_ordered(&records) {
            log::warn!("CounterLogParser: time anchors are not monotonic, sorting records");
            records.sort_by_key(|record| record.timestamp);
        }
        Ok(records)
    }
}

fn scan_entries(data: &[u8]) -> Vec<RawEntry<'_>> {
    let mut entries = Vec::new();
    let mut dropped = 0;
    for start in ENTRY_START_RE.find_iter(data).map(|m| m.end()) {
        let body = &data[start..];
        let end = body
            .iter()
            .position(|&b| b == b'\0' || b == b'\n')
            .unwrap_or(body.len());
        match parse_entry(&body[..end]) {
            Some(entry) => entries.push(entry),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("CounterLogParser: dropped {} malformed entries", dropped);
    }
    entries
}

/// `<counter> <message>`, surrounding spaces ignored
fn parse_entry(body: &[u8]) -> Option<RawEntry<'_>> {
    let body = trim_matches(body, b" ");
    let space = body.iter().position(|&b| b == b' ')?;
    let counter = parse_u64(&body[..space])?;
    Some(RawEntry {
        counter,
        message: &body[space + 1..],
    })
}

/// instant of `time anchor: <any> <secs>.<nanos> ...` in nanoseconds
fn anchor_nanos(message: &[u8]) -> Option<i128> {
    let mut tokens = message.split(|&b| b == b' ');
    if tokens.next()? != ANCHOR_TIME_TOKEN || tokens.next()? != ANCHOR_TAG_TOKEN {
        return None;
    }
    tokens.next()?;
    let stamp = tokens.next()?;
    let (secs, len) = leading_u64(stamp)?;
    let nanos = match &stamp[len..] {
        [b'.', nanos @ ..] => parse_u64(nanos)?,
        _ => return None,
    };
    Some(i128::from(secs) * NANOS_PER_SEC + i128::from(nanos))
}

/// the two anchors to interpolate with, given how many were passed
///
/// entries before the first anchor use the first two, entries after the
/// last anchor use the last two
fn reference_pair(references: &[Anchor], passed: usize) -> (Anchor, Anchor) {
    let last = references.len() - 1;
    match passed {
        0 => (references[0], references[1]),
        n if n > last => (references[last - 1], references[last]),
        n => (references[n - 1], references[n]),
    }
}

/// `None` when the interpolated time does not fit in 64-bit nanoseconds
fn interpolate(counter: u64, first: Anchor, second: Anchor) -> Option<Timestamp> {
    let span_nanos = second.nanos - first.nanos;
    let span_counter = i128::from(second.counter - first.counter);

    // the counter distance is taken in the direction that cannot go below zero
    let nanos = if counter >= first.counter {
        let offset = i128::from(counter - first.counter).checked_mul(span_nanos)? / span_counter;
        first.nanos.checked_add(offset)?
    } else {
        let offset = i128::from(first.counter - counter).checked_mul(span_nanos)? / span_counter;
        first.nanos.checked_sub(offset)?
    };
    Timestamp::from_nanos_i128(nanos)
}
