use crate::error::LoadError;
use logweave_core::LogSource;
use logweave_parser::LogFormat;
use memmap2::{Mmap, MmapOptions};
use rayon::prelude::*;
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// options for opening and parsing log files
#[derive(Clone, Debug)]
pub struct LoadDesc {
    /// format of every file; detected from each file name when `None`
    pub format: Option<LogFormat>,
    /// parse several files on the rayon pool
    pub parallel: bool,
}

impl LoadDesc {
    pub fn new() -> Self {
        Self {
            format: None,
            parallel: true,
        }
    }
}

impl Default for LoadDesc {
    fn default() -> Self {
        Self::new()
    }
}

enum FileData {
    Mapped(Mmap),
    // zero-length files cannot be mapped on every platform
    Empty,
}

/// a log file mapped read-only into memory
///
/// records parsed from it borrow the mapping, so the `LogFile` has to
/// outlive every view built on them
pub struct LogFile {
    path: PathBuf,
    format: LogFormat,
    data: FileData,
}

impl LogFile {
    pub fn open(path: impl AsRef<Path>, desc: &LoadDesc) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let format = desc
            .format
            .or_else(|| LogFormat::from_file_name(path))
            .ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))?;

        let file = File::open(path).map_err(|e| LoadError::file(path, e))?;
        let len = file.metadata().map_err(|e| LoadError::file(path, e))?.len();
        let data = if len == 0 {
            FileData::Empty
        } else {
            // the mapping is read-only, the file is not expected to change while open
            let mmap = unsafe { MmapOptions::new().map(&file) };
            FileData::Mapped(mmap.map_err(|e| LoadError::file(path, e))?)
        };

        log::debug!(
            "LogFile: opened {} ({} format, {} bytes)",
            path.display(),
            format,
            len
        );
        Ok(Self {
            path: path.to_path_buf(),
            format,
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        match &self.data {
            FileData::Mapped(mmap) => &mmap[..],
            FileData::Empty => &[],
        }
    }

    /// parses the whole file into a source labelled with its path
    pub fn parse(&self) -> Result<LogSource<'_>, LoadError> {
        let label = self.path.display().to_string();
        self.format
            .parser()
            .parse_source(&label, self.bytes())
            .map_err(|e| LoadError::file(&self.path, e))
    }
}

pub fn open_all<P: AsRef<Path>>(paths: &[P], desc: &LoadDesc) -> Result<Vec<LogFile>, LoadError> {
    paths.iter().map(|path| LogFile::open(path, desc)).collect()
}

/// parses every file, giving up on the first one that fails
pub fn parse_all<'a>(
    files: &'a [LogFile],
    desc: &LoadDesc,
) -> Result<Vec<LogSource<'a>>, LoadError> {
    if desc.parallel && files.len() > 1 {
        files.par_iter().map(LogFile::parse).collect()
    } else {
        files.iter().map(LogFile::parse).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logweave_core::{LogView, ParseError};
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", b"hello");
        assert!(matches!(
            LogFile::open(&path, &LoadDesc::new()),
            Err(LoadError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_format_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "notes.txt", b"1 | S 1.000 d t z | INFO | hi\n");
        let mut desc = LoadDesc::new();
        desc.format = Some(LogFormat::Text);

        let file = LogFile::open(&path, &desc).unwrap();
        assert_eq!(file.format(), LogFormat::Text);
        let source = file.parse().unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.label(), path.display().to_string());
    }

    #[test]
    fn test_empty_file_is_not_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "idle-async-stdout.log", b"");
        let file = LogFile::open(&path, &LoadDesc::new()).unwrap();
        assert!(file.bytes().is_empty());
        assert!(file.parse().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone-async-stderr.log");
        match LogFile::open(&path, &LoadDesc::new()) {
            Err(LoadError::File {
                path: failed,
                source: ParseError::Io(_),
            }) => assert_eq!(failed, path),
            other => panic!("expected io error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "bad-async-stdout.log", b"no header here\n");
        let file = LogFile::open(&path, &LoadDesc::new()).unwrap();
        let err = file.parse().unwrap_err();
        assert!(err.to_string().contains("bad-async-stdout.log"));
        assert!(matches!(
            err,
            LoadError::File {
                source: ParseError::CorruptedFormat(_),
                ..
            }
        ));
    }
}
