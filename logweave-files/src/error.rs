use logweave_core::ParseError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot tell the log format of '{}' from its name", .0.display())]
    UnknownFormat(PathBuf),

    #[error("failed to load '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: impl Into<ParseError>) -> Self {
        Self::File {
            path: path.into(),
            source: source.into(),
        }
    }
}
