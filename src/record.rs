use crate::text::{sanitize_title, TitleStyle};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field names accepted for a record's title, in lookup order.
pub(crate) const TITLE_FIELDS: &[&str] = &["Title", "title"];

/// Field names accepted for a record's HTML body, in lookup order.
///
/// `Body__c` is the column name used by the CRM export the bundled
/// datasets come from.
pub(crate) const BODY_FIELDS: &[&str] = &["Body__c", "Body", "body", "content", "Content"];

/// A single release note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseNoteRecord {
    /// Opaque identifier from the source collection
    pub key: String,

    /// Display title, if the record carried one
    pub title: Option<String>,

    /// HTML body
    pub body: String,
}

/// Why an entry of the source collection was not converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The entry is not a JSON object.
    #[error("entry is not an object")]
    NotAnObject,

    /// None of the body fields is present.
    #[error("no body field (expected one of {})", BODY_FIELDS.join(", "))]
    MissingBody,

    /// The body field holds something other than a string.
    #[error("body field '{0}' is not a string")]
    BodyNotString(&'static str),
}

impl ReleaseNoteRecord {
    /// Creates a record from its parts.
    #[must_use]
    pub fn new(key: impl Into<String>, title: Option<String>, body: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title,
            body: body.into(),
        }
    }

    /// Extracts a record from one entry of the source collection.
    ///
    /// A missing or non-string title is tolerated; the file name then
    /// falls back to [`fallback_stem`].
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] when the entry has no usable body.
    pub fn from_value(key: impl Into<String>, value: &Value) -> Result<Self, SkipReason> {
        let object = value.as_object().ok_or(SkipReason::NotAnObject)?;

        let title = find_field(object, TITLE_FIELDS)
            .and_then(|(_, v)| v.as_str())
            .map(str::to_string);

        let (field, body) = find_field(object, BODY_FIELDS).ok_or(SkipReason::MissingBody)?;
        let body = body.as_str().ok_or(SkipReason::BodyNotString(field))?;

        Ok(Self::new(key, title, body))
    }

    /// Returns the file base name for this record.
    #[must_use]
    pub fn file_stem(&self, style: TitleStyle) -> String {
        self.title
            .as_deref()
            .map(|t| sanitize_title(t, style))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| fallback_stem(&self.key))
    }
}

/// File base name used when a record has no usable title.
#[must_use]
pub fn fallback_stem(key: &str) -> String {
    format!("note_{key}")
}

/// Returns true if an object looks like a record rather than a collection.
#[must_use]
pub(crate) fn looks_like_record(object: &Map<String, Value>) -> bool {
    find_field(object, TITLE_FIELDS).is_some() && find_field(object, BODY_FIELDS).is_some()
}

fn find_field<'a>(
    object: &'a Map<String, Value>,
    names: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    names
        .iter()
        .find_map(|&name| object.get(name).map(|v| (name, v)))
}
