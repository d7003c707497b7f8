//! parsers for the log formats logweave understands
//!
//! every parser implements [`logweave_core::LogParser`] and works on a byte
//! buffer that is already in memory; records borrow their messages from it.

mod bytes;
pub mod counter;
pub mod format;
pub mod text;

pub use counter::CounterLogParser;
pub use format::LogFormat;
pub use text::TextLogParser;
