//! loads log files from disk for logweave
//!
//! files are memory-mapped read-only and handed to the parser matching
//! their format; the resulting sources borrow the mappings.
//!
//! ```rust,no_run
//! use logweave_core::LogModel;
//! use logweave_files::{LoadDesc, open_all, parse_all};
//!
//! # fn main() -> Result<(), logweave_files::LoadError> {
//! let desc = LoadDesc::new();
//! let files = open_all(&["node-memorylog.bin", "api-async-stdout.log"], &desc)?;
//! let model = LogModel::new(parse_all(&files, &desc)?);
//! println!("{} records", model.unfiltered_count());
//! # Ok(())
//! # }
//! ```

mod error;
mod file;

pub use error::LoadError;
pub use file::{LoadDesc, LogFile, open_all, parse_all};
