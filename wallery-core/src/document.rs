//! Decoding of loosely-typed documents exported from the catalog database.
//!
//! Source documents are JSON objects whose fields may be missing, `null`, or
//! written by older clients. Decoding fills every absent field with an
//! explicit default and only fails when a field is present with a type that
//! cannot be interpreted.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use wallery_core::{Document, Wallpaper};
//!
//! let document = Document::from_value("w1", json!({
//!     "title": "Aurora",
//!     "tags": ["sky", "night"],
//!     "downloads": 12,
//! }))?;
//! let wallpaper = Wallpaper::from_document(&document)?;
//! assert_eq!(wallpaper.downloads, 12);
//! assert_eq!(wallpaper.likes, 0);
//! # Ok::<(), wallery_core::DecodeError>(())
//! ```

use chrono::{DateTime, Utc};
use log::warn;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{Category, Collection, Wallpaper};

/// A single exported document: its identifier plus its raw field map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    /// Document identifier within its collection.
    pub id: String,
    /// Raw field values.
    pub fields: Map<String, Value>,
}

/// Errors raised while decoding a [`Document`] into a catalog entity.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document identifier was empty.
    #[error("document id must not be empty")]
    MissingId,
    /// The document body was not a JSON object.
    #[error("document {id} is not a JSON object")]
    NotAnObject {
        /// Identifier of the offending document.
        id: String,
    },
    /// A field was present but had an unusable type or value.
    #[error("field `{field}` of document {id} must be {expected}")]
    InvalidField {
        /// Identifier of the offending document.
        id: String,
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },
}

impl Document {
    /// Build a document from an identifier and an already-split field map.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from an identifier and a JSON value.
    ///
    /// # Errors
    /// Returns [`DecodeError::NotAnObject`] when `value` is not an object.
    pub fn from_value(id: impl Into<String>, value: Value) -> Result<Self, DecodeError> {
        let id = id.into();
        match value {
            Value::Object(fields) => Ok(Self { id, fields }),
            _ => Err(DecodeError::NotAnObject { id }),
        }
    }

    fn reader(&self) -> Result<FieldReader<'_>, DecodeError> {
        if self.id.trim().is_empty() {
            return Err(DecodeError::MissingId);
        }
        Ok(FieldReader {
            id: &self.id,
            fields: &self.fields,
        })
    }
}

impl Wallpaper {
    /// Decode a wallpaper document, defaulting every missing field.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the identifier is empty or a present
    /// field has the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, DecodeError> {
        let fields = document.reader()?;
        Ok(Self {
            id: document.id.clone(),
            title: fields.string("title")?,
            description: fields.string("description")?,
            category: fields.string("category")?,
            tags: fields.string_list("tags")?,
            image_url: fields.string("imageUrl")?,
            downloads: fields.counter("downloads")?,
            likes: fields.counter("likes")?,
            views: fields.counter("views")?,
            premium: fields.flag("premium")?,
            is_exclusive: fields.flag("isExclusive")?,
            created_at: fields.timestamp("createdAt")?,
            updated_at: fields.timestamp("updatedAt")?,
        })
    }
}

impl Category {
    /// Decode a category document.
    ///
    /// The name falls back to the document identifier when the `name` field
    /// is absent.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the identifier is empty or a present
    /// field has the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, DecodeError> {
        let fields = document.reader()?;
        let name = fields.string("name")?;
        Ok(Self {
            name: if name.is_empty() {
                document.id.clone()
            } else {
                name
            },
            wallpaper_count: fields.counter("wallpaperCount")?,
        })
    }
}

impl Collection {
    /// Decode a collection document.
    ///
    /// # Errors
    /// Returns [`DecodeError`] when the identifier is empty or a present
    /// field has the wrong type.
    pub fn from_document(document: &Document) -> Result<Self, DecodeError> {
        let fields = document.reader()?;
        Ok(Self {
            id: document.id.clone(),
            title: fields.string("title")?,
            description: fields.string("description")?,
            wallpaper_ids: fields.string_list("wallpaperIds")?,
            views: fields.counter("views")?,
            downloads: fields.counter("downloads")?,
        })
    }
}

struct FieldReader<'a> {
    id: &'a str,
    fields: &'a Map<String, Value>,
}

impl FieldReader<'_> {
    fn present(&self, field: &str) -> Option<&Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> DecodeError {
        DecodeError::InvalidField {
            id: self.id.to_owned(),
            field,
            expected,
        }
    }

    fn string(&self, field: &'static str) -> Result<String, DecodeError> {
        match self.present(field) {
            None => Ok(String::new()),
            Some(Value::String(text)) => Ok(text.clone()),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    fn flag(&self, field: &'static str) -> Result<bool, DecodeError> {
        match self.present(field) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(_) => Err(self.invalid(field, "a boolean")),
        }
    }

    fn string_list(&self, field: &'static str) -> Result<Vec<String>, DecodeError> {
        let items = match self.present(field) {
            None => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(self.invalid(field, "an array of strings")),
        };
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(text) => values.push(text.clone()),
                other => warn!(
                    "document {}: skipping non-string entry {other} in `{field}`",
                    self.id
                ),
            }
        }
        Ok(values)
    }

    fn counter(&self, field: &'static str) -> Result<u64, DecodeError> {
        let Some(value) = self.present(field) else {
            return Ok(0);
        };
        let Value::Number(number) = value else {
            return Err(self.invalid(field, "a non-negative number"));
        };
        if let Some(count) = number.as_u64() {
            return Ok(count);
        }
        if number.as_i64().is_some() {
            warn!("document {}: clamping negative `{field}` to zero", self.id);
            return Ok(0);
        }
        match number.as_f64() {
            Some(raw) if raw.is_finite() => Ok(floor_counter(raw, self.id, field)),
            _ => Err(self.invalid(field, "a non-negative number")),
        }
    }

    fn timestamp(&self, field: &'static str) -> Result<Option<DateTime<Utc>>, DecodeError> {
        let Some(value) = self.present(field) else {
            return Ok(None);
        };
        parse_timestamp(value)
            .map(Some)
            .ok_or_else(|| self.invalid(field, "a timestamp"))
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "value is finite, floored and clamped to the u64 range first"
)]
fn floor_counter(raw: f64, id: &str, field: &str) -> u64 {
    if raw < 0.0 {
        warn!("document {id}: clamping negative `{field}` to zero");
        return 0;
    }
    raw.floor().min(u64::MAX as f64) as u64
}

/// Interpret the timestamp shapes produced by document-database exports.
///
/// Accepted forms: `{"_seconds", "_nanoseconds"}` and
/// `{"seconds", "nanoseconds"}` objects, RFC 3339 strings, and integer
/// milliseconds since the Unix epoch.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Object(parts) => {
            let seconds = parts
                .get("_seconds")
                .or_else(|| parts.get("seconds"))
                .and_then(Value::as_i64)?;
            let nanos = parts
                .get("_nanoseconds")
                .or_else(|| parts.get("nanoseconds"))
                .or_else(|| parts.get("nanos"))
                .map_or(Some(0), Value::as_u64)?;
            let nanos = u32::try_from(nanos).ok()?;
            DateTime::from_timestamp(seconds, nanos)
        }
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn document(value: Value) -> Document {
        Document::from_value("doc-1", value).expect("object document")
    }

    #[rstest]
    fn missing_fields_take_defaults() {
        let wallpaper = Wallpaper::from_document(&document(json!({}))).expect("decode");
        assert_eq!(wallpaper, Wallpaper::new("doc-1"));
    }

    #[rstest]
    fn null_fields_take_defaults() {
        let wallpaper = Wallpaper::from_document(&document(json!({
            "tags": null,
            "title": null,
            "likes": null,
        })))
        .expect("decode");
        assert!(wallpaper.tags.is_empty());
        assert_eq!(wallpaper.title, "");
        assert_eq!(wallpaper.likes, 0);
    }

    #[rstest]
    fn non_string_tags_are_skipped() {
        let wallpaper = Wallpaper::from_document(&document(json!({
            "tags": ["sky", 3, null, "Night"],
        })))
        .expect("decode");
        assert_eq!(wallpaper.tags, vec!["sky", "Night"]);
    }

    #[rstest]
    #[case(json!(-4), 0)]
    #[case(json!(7), 7)]
    #[case(json!(7.9), 7)]
    #[case(json!(-2.5), 0)]
    fn counters_are_clamped_and_floored(#[case] raw: Value, #[case] expected: u64) {
        let wallpaper =
            Wallpaper::from_document(&document(json!({ "downloads": raw }))).expect("decode");
        assert_eq!(wallpaper.downloads, expected);
    }

    #[rstest]
    #[case(json!({ "title": 4 }), "title")]
    #[case(json!({ "tags": "sky" }), "tags")]
    #[case(json!({ "views": "many" }), "views")]
    #[case(json!({ "premium": "yes" }), "premium")]
    #[case(json!({ "createdAt": true }), "createdAt")]
    fn wrong_types_are_rejected(#[case] value: Value, #[case] expected_field: &str) {
        let err = Wallpaper::from_document(&document(value)).expect_err("should fail");
        match err {
            DecodeError::InvalidField { field, id, .. } => {
                assert_eq!(field, expected_field);
                assert_eq!(id, "doc-1");
            }
            other => panic!("expected InvalidField, found {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({ "_seconds": 1_700_000_000, "_nanoseconds": 0 }))]
    #[case(json!({ "seconds": 1_700_000_000, "nanoseconds": 0 }))]
    #[case(json!("2023-11-14T22:13:20Z"))]
    #[case(json!(1_700_000_000_000_i64))]
    fn timestamps_accept_export_shapes(#[case] raw: Value) {
        let wallpaper =
            Wallpaper::from_document(&document(json!({ "createdAt": raw }))).expect("decode");
        let expected = DateTime::from_timestamp(1_700_000_000, 0).expect("valid instant");
        assert_eq!(wallpaper.created_at, Some(expected));
    }

    #[rstest]
    fn empty_id_is_rejected() {
        let doc = Document::new("  ", Map::new());
        assert_eq!(Wallpaper::from_document(&doc), Err(DecodeError::MissingId));
    }

    #[rstest]
    fn non_object_bodies_are_rejected() {
        let err = Document::from_value("w1", json!(["not", "an", "object"]))
            .expect_err("array body should fail");
        assert!(matches!(err, DecodeError::NotAnObject { id } if id == "w1"));
    }

    #[rstest]
    fn category_name_falls_back_to_document_id() {
        let doc = Document::from_value("Nature", json!({ "wallpaperCount": 3 })).expect("doc");
        let category = Category::from_document(&doc).expect("decode");
        assert_eq!(category, Category::new("Nature").with_count(3));
    }

    #[rstest]
    fn collection_reads_member_ids() {
        let doc = Document::from_value(
            "c1",
            json!({ "title": "Night skies", "wallpaperIds": ["w1", "w2"], "views": 5 }),
        )
        .expect("doc");
        let collection = Collection::from_document(&doc).expect("decode");
        assert_eq!(collection.wallpaper_ids, vec!["w1", "w2"]);
        assert_eq!(collection.views, 5);
    }
}
