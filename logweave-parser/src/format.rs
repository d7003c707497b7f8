use crate::{counter::CounterLogParser, text::TextLogParser};
use logweave_core::LogParser;
use std::{fmt, path::Path};

const TEXT_LOG_SUFFIXES: [&str; 2] = ["-async-stdout.log", "-async-stderr.log"];
const COUNTER_LOG_MARKER: &str = "memorylog";

static COUNTER_PARSER: CounterLogParser = CounterLogParser;
static TEXT_PARSER: TextLogParser = TextLogParser;

/// on-disk log formats logweave can read
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogFormat {
    /// counter-stamped entries with time anchors
    Counter,
    /// line-oriented text with a header per record
    Text,
}

impl LogFormat {
    pub const ALL: [LogFormat; 2] = [Self::Counter, Self::Text];

    /// guesses the format from a file name, `None` if no format claims it
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if TEXT_LOG_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Some(Self::Text)
        } else if name.contains(COUNTER_LOG_MARKER) {
            Some(Self::Counter)
        } else {
            None
        }
    }

    pub fn parser(self) -> &'static dyn LogParser {
        match self {
            Self::Counter => &COUNTER_PARSER,
            Self::Text => &TEXT_PARSER,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_name() {
        assert_eq!(
            LogFormat::from_file_name(Path::new("/var/log/worker-async-stdout.log")),
            Some(LogFormat::Text)
        );
        assert_eq!(
            LogFormat::from_file_name(Path::new("worker-async-stderr.log")),
            Some(LogFormat::Text)
        );
        assert_eq!(
            LogFormat::from_file_name(Path::new("dump/memorylog.bin")),
            Some(LogFormat::Counter)
        );
        assert_eq!(LogFormat::from_file_name(Path::new("worker-stdout.log")), None);
        // the directory does not count
        assert_eq!(LogFormat::from_file_name(Path::new("memorylog/app.log")), None);
    }

    #[test]
    fn test_parser_matches_format() {
        assert_eq!(LogFormat::Counter.parser().name(), "CounterLogParser");
        assert_eq!(LogFormat::Text.parser().name(), "TextLogParser");
        assert_eq!(LogFormat::Text.to_string(), "text");
    }
}
