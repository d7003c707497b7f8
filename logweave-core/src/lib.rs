//! # logweave-core
//!
//! Timestamp-ordered views over parsed log records, with stackable filters,
//! multi-source merging and the navigation state a log inspector needs.
//!
//! ## Overview
//!
//! logweave-core knows nothing about files or formats. A [`LogParser`] turns a
//! byte buffer into a [`LogSource`]; everything built on top of it is a
//! [`LogView`], a read-only slice of [`LogRecord`]s ordered by timestamp.
//!
//! ## Core Concepts
//!
//! ### Zero-copy records
//!
//! A [`LogRecord`] borrows its message from the buffer it was parsed from
//! (usually a memory-mapped file). Views only ever copy the small record
//! values, never message bytes, and the borrow checker keeps the buffer
//! alive for as long as any view uses it.
//!
//! ### View pipeline
//!
//! - **[`LogSource`]**: records of one buffer
//! - **[`MergedView`]**: k-way merge of several views into one timeline
//! - **[`LogFilter`]**: keeps the records of a parent matching a substring
//!   (or not matching it), or having one of a set of levels
//!
//! Every view materializes its records when built, so lookups are plain
//! slice accesses and the ordering invariant is established once.
//!
//! ### Model
//!
//! [`LogModel`] owns the sources, the filter stack and the navigation state:
//! selected record, marked region and search text. When the filter stack
//! changes, the selection and marked region are moved to the records with
//! the same timestamps in the new active view, rather than keeping stale
//! indices.
//!
//! ## Quick Start
//!
//! ```rust
//! use logweave_core::{LogLevel, LogModel, LogRecord, LogSource, ModelEvent, Timestamp};
//!
//! let records = vec![
//!     LogRecord::new(Timestamp::from_nanos(10), LogLevel::Info, b"service started"),
//!     LogRecord::new(Timestamp::from_nanos(20), LogLevel::Error, b"disk full"),
//!     LogRecord::new(Timestamp::from_nanos(30), LogLevel::Info, b"service stopped"),
//! ];
//! let mut model = LogModel::new(vec![LogSource::new("app.log", records)]);
//!
//! model.subscribe(|event| {
//!     if let ModelEvent::SelectionChanged(index) = event {
//!         println!("selected {}", index);
//!     }
//! });
//!
//! model.set_selected_record(2);
//! model.add_pattern_filter("service", true);
//!
//! assert_eq!(model.filtered_count(), 2);
//! assert_eq!(model.unfiltered_count(), 3);
//! assert_eq!(model.selected().map(|r| r.timestamp), Some(Timestamp::from_nanos(30)));
//! ```
//!
//! ## Logging
//!
//! The crate reports through the `log` facade. Terminal front ends should
//! call [`logging::init_file_logger`] so diagnostics do not end up on the
//! screen.

pub mod error;
pub mod filter;
pub mod logging;
pub mod merge;
pub mod model;
pub mod parser;
pub mod record;
pub mod time_format;
pub mod view;

// re-export commonly used types
pub use error::{ParseError, TimestampParseError};
pub use filter::{
    DEFAULT_PARALLEL_FILTER_THRESHOLD, FilterKind, FilterParams, LogFilter, SubstringMatcher,
};
pub use merge::MergedView;
pub use model::{ListenerId, LogModel, ModelDesc, ModelEvent};
pub use parser::LogParser;
pub use record::{LogLevel, LogRecord, Timestamp};
pub use time_format::TimeFormat;
pub use view::{LogSource, LogView, index_at_or_before, is_time_ordered};
