//! Record sources.
//!
//! Release notes come either from one of the datasets compiled into the
//! binary or from a JSON file on disk. Three document shapes are accepted:
//!
//! 1. An object mapping keys to records (the export format)
//! 2. A single record object, keyed as `single_item`
//! 3. An array of records, keyed by index

use crate::{
    error::{Error, Result},
    record::{looks_like_record, ReleaseNoteRecord, SkipReason},
};
use serde_json::Value;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const FALL_RELEASE_NOTES: &str = include_str!("../data/releaseNotes.json");
const RELEASE_NOTES_2024: &str = include_str!("../data/2024-release-notes.json");

/// Key given to a document that is a single record.
pub(crate) const SINGLE_ITEM_KEY: &str = "single_item";

/// Datasets bundled with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundledDataset {
    /// Fall release notes export
    #[default]
    FallReleaseNotes,
    /// 2024 release notes export
    ReleaseNotes2024,
}

impl BundledDataset {
    /// Returns the raw JSON of this dataset.
    #[must_use]
    pub const fn contents(self) -> &'static str {
        match self {
            Self::FallReleaseNotes => FALL_RELEASE_NOTES,
            Self::ReleaseNotes2024 => RELEASE_NOTES_2024,
        }
    }

    /// Returns the file name the dataset was exported as.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::FallReleaseNotes => "releaseNotes.json",
            Self::ReleaseNotes2024 => "2024-release-notes.json",
        }
    }
}

/// Where release-note records are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordSource {
    /// A dataset compiled into the binary
    Bundled(BundledDataset),
    /// A JSON file on disk
    File(PathBuf),
}

impl Default for RecordSource {
    fn default() -> Self {
        Self::Bundled(BundledDataset::default())
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bundled(dataset) => write!(f, "bundled:{}", dataset.file_name()),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An entry of the source collection that was not converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Key of the entry
    pub key: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Records read from a source, in document order.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    /// Records ready for conversion
    pub records: Vec<ReleaseNoteRecord>,
    /// Entries without a usable body
    pub skipped: Vec<SkippedRecord>,
}

impl RecordSet {
    /// Total number of entries in the source collection.
    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    /// Returns true if the source held no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl RecordSource {
    /// Loads all records from this source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// is not one of the accepted document shapes.
    pub fn load(&self) -> Result<RecordSet> {
        match self {
            Self::Bundled(dataset) => {
                debug!("Loading bundled dataset {}", dataset.file_name());
                parse_records(dataset.contents())
            }
            Self::File(path) => load_file(path),
        }
    }
}

fn load_file(path: &Path) -> Result<RecordSet> {
    debug!("Loading records from {}", path.display());
    let json = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_records(&json)
}

/// Parses a JSON document into a [`RecordSet`].
///
/// # Errors
///
/// Returns an error for malformed JSON or a top-level value that is
/// neither an object nor an array.
pub fn parse_records(json: &str) -> Result<RecordSet> {
    let document: Value = serde_json::from_str(json)?;

    let entries: Vec<(String, Value)> = match document {
        Value::Object(object) if looks_like_record(&object) => {
            vec![(SINGLE_ITEM_KEY.to_string(), Value::Object(object))]
        }
        Value::Object(object) => object.into_iter().collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| (i.to_string(), item))
            .collect(),
        other => {
            return Err(Error::serialization(format!(
                "expected an object or array of release notes, got {}",
                value_kind(&other)
            )));
        }
    };

    let mut set = RecordSet::default();
    for (key, value) in entries {
        match ReleaseNoteRecord::from_value(key.clone(), &value) {
            Ok(record) => set.records.push(record),
            Err(reason) => {
                warn!("Skipping entry '{}': {}", key, reason);
                set.skipped.push(SkippedRecord { key, reason });
            }
        }
    }

    Ok(set)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_bundled_datasets_parse() {
        for dataset in [BundledDataset::FallReleaseNotes, BundledDataset::ReleaseNotes2024] {
            let set = RecordSource::Bundled(dataset).load().unwrap();
            assert!(!set.records.is_empty(), "{} is empty", dataset.file_name());
            assert!(set.skipped.is_empty());
        }
    }

    #[test]
    fn test_parse_keyed_object_keeps_document_order() {
        let json = r#"{
            "zeta": {"Title": "Last key first", "Body__c": "<p>1</p>"},
            "alpha": {"Title": "Second", "Body__c": "<p>2</p>"}
        }"#;
        let set = parse_records(json).unwrap();

        let keys: Vec<_> = set.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn test_parse_single_record() {
        let set = parse_records(r#"{"Title": "Only", "Body__c": "<p>one</p>"}"#).unwrap();

        assert_eq!(set.records.len(), 1);
        assert_eq!(set.records[0].key, SINGLE_ITEM_KEY);
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[
            {"Title": "First", "Body__c": "a"},
            {"Title": "Second", "Body__c": "b"}
        ]"#;
        let set = parse_records(json).unwrap();

        let keys: Vec<_> = set.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, ["0", "1"]);
    }

    #[test]
    fn test_parse_collects_skipped_entries() {
        let json = r#"{
            "note1": {"Body__c": "<p>Body without title</p>"},
            "note2": {"Title": "No Body"},
            "note3": "not a record"
        }"#;
        let set = parse_records(json).unwrap();

        assert_eq!(set.records.len(), 1);
        assert_eq!(set.skipped.len(), 2);
        assert_eq!(set.total(), 3);
        assert_eq!(set.skipped[0].key, "note2");
        assert_eq!(set.skipped[0].reason, SkipReason::MissingBody);
        assert_eq!(set.skipped[1].reason, SkipReason::NotAnObject);
    }

    #[test]
    fn test_parse_empty_object() {
        let set = parse_records("{}").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_rejects_scalars_and_bad_json() {
        let err = parse_records(r#""just a string""#).unwrap_err();
        assert!(err.to_string().contains("a string"));

        assert!(parse_records("{not json").is_err());
    }

    #[test]
    fn test_load_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("notes.json");
        file.write_str(r#"{"001": {"Title": "Q3 Update", "Body": "<p>Fixed bugs</p>"}}"#)
            .unwrap();

        let set = RecordSource::File(file.path().to_path_buf()).load().unwrap();
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.records[0].body, "<p>Fixed bugs</p>");
    }

    #[test]
    fn test_load_missing_file() {
        let err = RecordSource::File(PathBuf::from("/nonexistent/notes.json"))
            .load()
            .unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            RecordSource::default().to_string(),
            "bundled:releaseNotes.json"
        );
    }
}
