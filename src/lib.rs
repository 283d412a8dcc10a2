//! # relnote-conv
//!
//! Converts release-note exports into plain-text files, one per note.
//!
//! Each record's HTML body is stripped to text and written to
//! `<title>.txt`, where the title has its whitespace removed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use relnote_conv::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .input_file("releaseNotes.json")
//!     .output_dir("./notes")
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Source**: loads records from a bundled dataset or a JSON file
//! 2. **Text**: sanitizes titles and strips HTML from bodies
//! 3. **Writer**: persists each body, replacing any existing file
//!
//! A failed write is reported for its record only; the rest of the batch
//! still runs.

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod console;
mod error;
mod pipeline;
mod record;
mod source;
mod writer;

pub mod text;

pub use config::{Config, ConfigBuilder};
pub use console::{Console, CREATED_LINE};
pub use error::{Error, Result};
pub use pipeline::{ConversionStats, FileOutcome, Pipeline, WriteStatus};
pub use record::{fallback_stem, ReleaseNoteRecord, SkipReason};
pub use source::{parse_records, BundledDataset, RecordSet, RecordSource, SkippedRecord};
pub use text::{BodyConverter, TitleStyle};

/// Runs the complete conversion with the given configuration.
///
/// Diagnostic lines go to stdout/stderr.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The record source cannot be read or parsed
/// - The output directory cannot be created
///
/// Individual write failures are reported in the returned
/// [`ConversionStats`], not as an error.
///
/// # Examples
///
/// ```no_run
/// use relnote_conv::{run, BundledDataset, Config};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .dataset(BundledDataset::FallReleaseNotes)
///     .build()?;
///
/// let stats = run(config)?;
/// assert!(stats.is_complete());
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<ConversionStats> {
    Pipeline::new(config)?.run()
}
