//! Routing-binding records and match results.
//!
//! A configuration snapshot is a list of named documents. Each document
//! holds either a single binding object or an array of them:
//!
//! ```json
//! {"Exchange": "orders", "BindingKey": "proc.v1.0", "OkRoutingKey": "next.v1.0"}
//! ```
//!
//! [`BindingContent`] captures both shapes and [`ConfigEntry`] flattens them
//! into a uniform record list at construction, so nothing downstream needs
//! to branch on the document shape. Array elements that are not binding
//! records are set aside as [`RejectedRecord`]s; their siblings still load.

use std::fmt;

use log::{trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::version::VersionKey;

/// Extension stripped from source identifiers when deriving [`MatchResult::source`].
const SOURCE_EXTENSION: &str = ".json";

/// Substring in a binding key that places a result in the error class.
const ERROR_MARKER: &str = "error";

/// Errors raised while interpreting a snapshot document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("expected a binding object or an array of binding objects, found {0}")]
    Shape(&'static str),

    #[error("invalid binding record: {0}")]
    Record(#[source] serde_json::Error),
}

/// A single routing binding as stored in the configuration snapshot.
///
/// Field names follow the stored document format. Unknown fields are
/// ignored; a missing `Exchange` reads as the empty string and therefore
/// never matches a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    #[serde(rename = "Exchange", default)]
    exchange: String,

    #[serde(rename = "BindingKey", default, skip_serializing_if = "Option::is_none")]
    binding_key: Option<String>,

    #[serde(rename = "OkRoutingKey", default, skip_serializing_if = "Option::is_none")]
    ok_routing_key: Option<String>,

    #[serde(rename = "ErrorRoutingKey", default, skip_serializing_if = "Option::is_none")]
    error_routing_key: Option<String>,
}

impl BindingRecord {
    /// Creates a record for `exchange` bound under `binding_key`.
    pub fn new(exchange: impl Into<String>, binding_key: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            binding_key: Some(binding_key.into()),
            ok_routing_key: None,
            error_routing_key: None,
        }
    }

    /// Sets the routing key used on success.
    pub fn with_ok_routing_key(mut self, key: impl Into<String>) -> Self {
        self.ok_routing_key = Some(key.into());
        self
    }

    /// Sets the routing key used on failure.
    pub fn with_error_routing_key(mut self, key: impl Into<String>) -> Self {
        self.error_routing_key = Some(key.into());
        self
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn binding_key(&self) -> Option<&str> {
        self.binding_key.as_deref()
    }

    pub fn ok_routing_key(&self) -> Option<&str> {
        self.ok_routing_key.as_deref()
    }

    pub fn error_routing_key(&self) -> Option<&str> {
        self.error_routing_key.as_deref()
    }
}

/// An array element that could not be read as a binding record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    index: usize,
    reason: String,
}

impl RejectedRecord {
    /// Position of the element in its document array.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for RejectedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid binding record at index {}: {}", self.index, self.reason)
    }
}

/// Document content: one binding or many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingContent {
    One(BindingRecord),
    Many(Vec<BindingRecord>),
}

impl BindingContent {
    /// Parses document text into binding content.
    ///
    /// Array elements that are not binding records are returned alongside
    /// the content instead of failing the document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the text is not JSON, is neither an
    /// object nor an array, or is an object that is not a binding record.
    pub fn from_json_str(text: &str) -> Result<(Self, Vec<RejectedRecord>), DocumentError> {
        let value: Value = serde_json::from_str(text).map_err(DocumentError::Syntax)?;
        Self::from_value(value)
    }

    /// Interprets an already parsed JSON value as binding content.
    ///
    /// # Errors
    ///
    /// See [`BindingContent::from_json_str`].
    pub fn from_value(value: Value) -> Result<(Self, Vec<RejectedRecord>), DocumentError> {
        match value {
            Value::Array(items) => {
                let mut records = Vec::with_capacity(items.len());
                let mut rejected = Vec::new();
                for (index, item) in items.into_iter().enumerate() {
                    match serde_json::from_value(item) {
                        Ok(record) => records.push(record),
                        Err(err) => rejected.push(RejectedRecord {
                            index,
                            reason: err.to_string(),
                        }),
                    }
                }
                Ok((Self::Many(records), rejected))
            }
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(|record| (Self::One(record), Vec::new()))
                .map_err(DocumentError::Record),
            Value::Null => Err(DocumentError::Shape("null")),
            Value::Bool(_) => Err(DocumentError::Shape("a boolean")),
            Value::Number(_) => Err(DocumentError::Shape("a number")),
            Value::String(_) => Err(DocumentError::Shape("a string")),
        }
    }

    /// Flattens the content into a record list in document order.
    pub fn into_records(self) -> Vec<BindingRecord> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }
}

impl From<BindingRecord> for BindingContent {
    fn from(record: BindingRecord) -> Self {
        Self::One(record)
    }
}

impl From<Vec<BindingRecord>> for BindingContent {
    fn from(records: Vec<BindingRecord>) -> Self {
        Self::Many(records)
    }
}

/// A named snapshot document with its records normalized to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    source_id: String,
    records: Vec<BindingRecord>,
    rejected: Vec<RejectedRecord>,
}

impl ConfigEntry {
    /// Creates an entry from a source identifier and its content.
    pub fn new(source_id: impl Into<String>, content: impl Into<BindingContent>) -> Self {
        Self {
            source_id: source_id.into(),
            records: content.into().into_records(),
            rejected: Vec::new(),
        }
    }

    /// Parses an entry from raw document text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if `text` is not valid binding content.
    pub fn from_json(source_id: impl Into<String>, text: &str) -> Result<Self, DocumentError> {
        let source_id = source_id.into();
        let (content, rejected) = BindingContent::from_json_str(text)?;
        trace!(source_id = source_id.as_str(), content:?; "Parsed snapshot document");
        for record in &rejected {
            warn!(source_id = source_id.as_str(), index = record.index(), reason = record.reason(); "Rejected binding record");
        }
        Ok(Self {
            rejected,
            ..Self::new(source_id, content)
        })
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Returns the source identifier with a trailing `.json` extension removed.
    pub fn source_stem(&self) -> &str {
        self.source_id
            .strip_suffix(SOURCE_EXTENSION)
            .unwrap_or(&self.source_id)
    }

    pub fn records(&self) -> &[BindingRecord] {
        &self.records
    }

    /// Array elements of the document that were not binding records.
    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }
}

/// One binding that matched an exchange query.
///
/// Serializes with the field names `etcd`, `this`, `next` and `error`;
/// absent optional keys are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "etcd")]
    source: String,

    #[serde(rename = "this", default, skip_serializing_if = "Option::is_none")]
    binding_key: Option<String>,

    #[serde(rename = "next", default, skip_serializing_if = "Option::is_none")]
    next_key: Option<String>,

    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    error_key: Option<String>,
}

impl MatchResult {
    /// Creates a result for `binding_key` found in `source`.
    pub fn new(source: impl Into<String>, binding_key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            binding_key: Some(binding_key.into()),
            next_key: None,
            error_key: None,
        }
    }

    /// Builds a result from a record found in the entry named `source`.
    pub fn from_record(source: impl Into<String>, record: &BindingRecord) -> Self {
        Self {
            source: source.into(),
            binding_key: record.binding_key.clone(),
            next_key: record.ok_routing_key.clone(),
            error_key: record.error_routing_key.clone(),
        }
    }

    pub fn with_next_key(mut self, key: impl Into<String>) -> Self {
        self.next_key = Some(key.into());
        self
    }

    pub fn with_error_key(mut self, key: impl Into<String>) -> Self {
        self.error_key = Some(key.into());
        self
    }

    /// Source entry name, without its extension.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn binding_key(&self) -> Option<&str> {
        self.binding_key.as_deref()
    }

    pub fn next_key(&self) -> Option<&str> {
        self.next_key.as_deref()
    }

    pub fn error_key(&self) -> Option<&str> {
        self.error_key.as_deref()
    }

    /// Returns `true` if the binding key contains `"error"` (case-sensitive).
    pub fn is_error_class(&self) -> bool {
        self.binding_key
            .as_deref()
            .is_some_and(|key| key.contains(ERROR_MARKER))
    }

    /// Returns the numeric version embedded in the binding key.
    pub fn version_key(&self) -> VersionKey {
        VersionKey::parse(self.binding_key.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_object_normalizes_to_one_record() {
        let entry = ConfigEntry::from_json(
            "orders.json",
            r#"{"Exchange": "orders", "BindingKey": "proc.v1.0", "OkRoutingKey": "next.v1.0"}"#,
        )
        .unwrap();

        assert_eq!(entry.records().len(), 1);
        assert_eq!(entry.records()[0].exchange(), "orders");
        assert_eq!(entry.records()[0].ok_routing_key(), Some("next.v1.0"));
        assert_eq!(entry.records()[0].error_routing_key(), None);
    }

    #[test]
    fn test_array_normalizes_in_order() {
        let entry = ConfigEntry::from_json(
            "many.json",
            r#"[
                {"Exchange": "a", "BindingKey": "first"},
                {"Exchange": "b", "BindingKey": "second", "Extra": 42}
            ]"#,
        )
        .unwrap();

        let keys: Vec<_> = entry
            .records()
            .iter()
            .map(|r| r.binding_key().unwrap())
            .collect();
        assert_eq!(keys, ["first", "second"]);
    }

    #[test]
    fn test_missing_exchange_reads_as_empty() {
        let entry = ConfigEntry::from_json("x.json", r#"{"BindingKey": "k"}"#).unwrap();
        assert_eq!(entry.records()[0].exchange(), "");
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            ConfigEntry::from_json("bad.json", "{not json"),
            Err(DocumentError::Syntax(_))
        ));
        assert!(matches!(
            ConfigEntry::from_json("str.json", r#""just a string""#),
            Err(DocumentError::Shape("a string"))
        ));
        assert!(matches!(
            ConfigEntry::from_json("num.json", r#"{"Exchange": 7}"#),
            Err(DocumentError::Record(_))
        ));
    }

    #[test]
    fn test_invalid_array_elements_keep_siblings() {
        let entry = ConfigEntry::from_json(
            "mixed.json",
            r#"[
                {"Exchange": "a", "BindingKey": "first"},
                3,
                {"Exchange": 7},
                {"Exchange": "a", "BindingKey": "last"}
            ]"#,
        )
        .unwrap();

        let keys: Vec<_> = entry
            .records()
            .iter()
            .map(|r| r.binding_key().unwrap())
            .collect();
        assert_eq!(keys, ["first", "last"]);

        let indices: Vec<_> = entry.rejected().iter().map(RejectedRecord::index).collect();
        assert_eq!(indices, [1, 2]);
        assert!(
            entry.rejected()[0]
                .to_string()
                .starts_with("invalid binding record at index 1")
        );
    }

    #[test]
    fn test_constructed_entry_has_no_rejections() {
        let entry = ConfigEntry::new("a.json", BindingRecord::new("a", "k"));
        assert!(entry.rejected().is_empty());
    }

    #[test]
    fn test_source_stem() {
        let entry = ConfigEntry::new("svc.orders.json", Vec::<BindingRecord>::new());
        assert_eq!(entry.source_stem(), "svc.orders");

        let entry = ConfigEntry::new("no-extension", Vec::<BindingRecord>::new());
        assert_eq!(entry.source_stem(), "no-extension");
    }

    #[test]
    fn test_match_result_from_record() {
        let record = BindingRecord::new("orders", "proc.v1.0")
            .with_ok_routing_key("next.v1.0")
            .with_error_routing_key("dead.letter");
        let result = MatchResult::from_record("svc", &record);

        assert_eq!(result.source(), "svc");
        assert_eq!(result.binding_key(), Some("proc.v1.0"));
        assert_eq!(result.next_key(), Some("next.v1.0"));
        assert_eq!(result.error_key(), Some("dead.letter"));
    }

    #[test]
    fn test_match_result_serialization_omits_absent_keys() {
        let result = MatchResult::new("svc", "proc.v1.0").with_next_key("next.v1.0");
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"etcd":"svc","this":"proc.v1.0","next":"next.v1.0"}"#
        );
    }

    #[test]
    fn test_error_class() {
        assert!(MatchResult::new("s", "proc.error.v1").is_error_class());
        assert!(MatchResult::new("s", "errors").is_error_class());
        assert!(!MatchResult::new("s", "proc.Error.v1").is_error_class());

        let without_key: MatchResult = serde_json::from_str(r#"{"etcd": "s"}"#).unwrap();
        assert!(!without_key.is_error_class());
    }
}
