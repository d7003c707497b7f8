use crate::{
    record::{LogLevel, LogRecord},
    view::LogView,
};
use rayon::prelude::*;
use regex::bytes::Regex;
use std::{collections::HashSet, fmt, ops::Range};

/// parents with more records than this are scanned with rayon
pub const DEFAULT_PARALLEL_FILTER_THRESHOLD: usize = 1000;

/// case-sensitive literal substring search over raw message bytes
#[derive(Clone, Debug)]
pub struct SubstringMatcher {
    needle: String,
    // None for an empty needle, or if the escaped literal was too large to compile
    regex: Option<Regex>,
}

impl SubstringMatcher {
    pub fn new(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let regex = if needle.is_empty() {
            None
        } else {
            match Regex::new(&regex::escape(&needle)) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    log::debug!("SubstringMatcher: falling back to plain search: {}", e);
                    None
                }
            }
        };
        Self { needle, regex }
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// an empty needle is contained in every message
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(haystack),
            None => contains_plain(haystack, self.needle.as_bytes()),
        }
    }

    /// byte ranges of every non-overlapping occurrence (for highlighting)
    pub fn find_ranges(&self, haystack: &[u8]) -> Vec<Range<usize>> {
        match &self.regex {
            Some(regex) => regex.find_iter(haystack).map(|m| m.range()).collect(),
            None if self.needle.is_empty() => Vec::new(),
            None => {
                let needle = self.needle.as_bytes();
                let mut ranges = Vec::new();
                let mut pos = 0;
                while pos + needle.len() <= haystack.len() {
                    if &haystack[pos..pos + needle.len()] == needle {
                        ranges.push(pos..pos + needle.len());
                        pos += needle.len();
                    } else {
                        pos += 1;
                    }
                }
                ranges
            }
        }
    }
}

fn contains_plain(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    IncludePattern,
    ExcludePattern,
    Level,
}

/// what a filter keeps, independent of the view it is applied to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterParams {
    Pattern { pattern: String, include: bool },
    Levels(HashSet<LogLevel>),
}

impl FilterParams {
    pub fn include(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            include: true,
        }
    }

    pub fn exclude(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            include: false,
        }
    }

    pub fn levels(levels: impl IntoIterator<Item = LogLevel>) -> Self {
        Self::Levels(levels.into_iter().collect())
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::Pattern { include: true, .. } => FilterKind::IncludePattern,
            Self::Pattern { include: false, .. } => FilterKind::ExcludePattern,
            Self::Levels(_) => FilterKind::Level,
        }
    }
}

enum Predicate {
    Pattern {
        matcher: SubstringMatcher,
        include: bool,
    },
    Levels(HashSet<LogLevel>),
}

impl Predicate {
    fn new(params: &FilterParams) -> Self {
        match params {
            FilterParams::Pattern { pattern, include } => Self::Pattern {
                matcher: SubstringMatcher::new(pattern.as_str()),
                include: *include,
            },
            FilterParams::Levels(levels) => Self::Levels(levels.clone()),
        }
    }

    fn keeps(&self, record: &LogRecord<'_>) -> bool {
        match self {
            Self::Pattern { matcher, include } => matcher.is_match(record.message) == *include,
            Self::Levels(levels) => levels.contains(&record.level),
        }
    }
}

/// a view keeping the subset of its parent's records accepted by `params`
///
/// built once by scanning the parent, immutable afterwards. Kept records
/// stay in parent order, so the filter is time ordered whenever its parent
/// is.
#[derive(Clone, Debug)]
pub struct LogFilter<'a> {
    params: FilterParams,
    records: Vec<LogRecord<'a>>,
    excluded_count: usize,
}

impl<'a> LogFilter<'a> {
    pub fn new(parent: &dyn LogView<'a>, params: FilterParams) -> Self {
        Self::build(parent, params, DEFAULT_PARALLEL_FILTER_THRESHOLD)
    }

    /// keeps records whose message contains (`include`) or lacks the pattern
    pub fn pattern(parent: &dyn LogView<'a>, pattern: impl Into<String>, include: bool) -> Self {
        Self::new(
            parent,
            FilterParams::Pattern {
                pattern: pattern.into(),
                include,
            },
        )
    }

    /// keeps records whose level is one of `levels`
    pub fn levels(parent: &dyn LogView<'a>, levels: HashSet<LogLevel>) -> Self {
        Self::new(parent, FilterParams::Levels(levels))
    }

    pub fn build(parent: &dyn LogView<'a>, params: FilterParams, parallel_threshold: usize) -> Self {
        let predicate = Predicate::new(&params);
        let parent_records = parent.records();

        let records: Vec<LogRecord<'a>> = if parent_records.len() > parallel_threshold {
            parent_records
                .par_iter()
                .filter(|record| predicate.keeps(record))
                .copied()
                .collect()
        } else {
            parent_records
                .iter()
                .filter(|record| predicate.keeps(record))
                .copied()
                .collect()
        };
        let excluded_count = parent_records.len() - records.len();

        log::debug!(
            "LogFilter: {} kept {} of {} records",
            params_summary(&params),
            records.len(),
            parent_records.len()
        );

        Self {
            params,
            records,
            excluded_count,
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.params.kind()
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// number of parent records this filter dropped
    pub fn excluded_count(&self) -> usize {
        self.excluded_count
    }

    pub fn pattern_text(&self) -> Option<&str> {
        match &self.params {
            FilterParams::Pattern { pattern, .. } => Some(pattern),
            FilterParams::Levels(_) => None,
        }
    }

    pub fn included_levels(&self) -> Option<&HashSet<LogLevel>> {
        match &self.params {
            FilterParams::Levels(levels) => Some(levels),
            FilterParams::Pattern { .. } => None,
        }
    }
}

impl<'a> LogView<'a> for LogFilter<'a> {
    fn records(&self) -> &[LogRecord<'a>] {
        &self.records
    }
}

fn params_summary(params: &FilterParams) -> String {
    match params {
        FilterParams::Pattern {
            pattern,
            include: true,
        } => format!("Incl: {}", pattern),
        FilterParams::Pattern {
            pattern,
            include: false,
        } => format!("Excl: {}", pattern),
        FilterParams::Levels(levels) => {
            // iterate in severity order, HashSet order is arbitrary
            let names: Vec<&str> = LogLevel::ALL
                .iter()
                .filter(|level| levels.contains(level))
                .map(|level| level.as_str())
                .collect();
            format!("Levels: {}", names.join(","))
        }
    }
}

impl fmt::Display for FilterParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&params_summary(self))
    }
}

impl fmt::Display for LogFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} excluded)", self.params, self.excluded_count)
    }
}
