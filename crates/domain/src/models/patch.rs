//! Patch documents for partial updates.
//!
//! A patch document is an ordered list of field-level operations in the
//! JSON Patch shape (`{"op", "path", "value", "from"}`). Operations address
//! the top-level fields of an update record; the set of addressable fields is
//! declared per record through [`Patchable`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Supported patch operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
            PatchOp::Move => "move",
            PatchOp::Copy => "copy",
            PatchOp::Test => "test",
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation of a patch document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    /// `Some(Value::Null)` when the document carries an explicit `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PatchOperation {
    /// Builds a `replace` operation.
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: Some(value),
            from: None,
        }
    }

    /// Builds a `remove` operation.
    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
            from: None,
        }
    }
}

/// Errors raised while applying a patch document.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PatchError {
    #[error("The path '{0}' does not address a patchable field")]
    UnknownPath(String),

    #[error("The '{op}' operation at '{path}' requires a value")]
    MissingValue { op: PatchOp, path: String },

    #[error("The '{op}' operation at '{path}' requires a 'from' path")]
    MissingFrom { op: PatchOp, path: String },

    #[error("Invalid value for '{path}': {message}")]
    InvalidValue { path: String, message: String },

    #[error("The test operation at '{path}' did not match the current value")]
    TestFailed { path: String },
}

/// A record whose fields can be addressed by patch operations.
pub trait Patchable: Clone {
    /// Addressable fields of the record.
    type Field: Copy + Eq + fmt::Debug + 'static;

    /// All addressable fields.
    const FIELDS: &'static [Self::Field];

    /// Wire name of a field (camelCase).
    fn field_name(field: Self::Field) -> &'static str;

    /// Current value of a field as JSON.
    fn get(&self, field: Self::Field) -> Value;

    /// Overwrites a field with a JSON value.
    fn set(&mut self, field: Self::Field, value: Value) -> Result<(), serde_json::Error>;

    /// Resets a field to its default value.
    fn reset(&mut self, field: Self::Field);

    /// Resolves a patch path (`/firstName` or `firstName`, any case).
    fn parse_path(path: &str) -> Option<Self::Field> {
        let name = path.strip_prefix('/').unwrap_or(path);
        if name.is_empty() || name.contains('/') {
            return None;
        }
        Self::FIELDS
            .iter()
            .copied()
            .find(|field| Self::field_name(*field).eq_ignore_ascii_case(name))
    }
}

/// An ordered list of patch operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Applies every operation, in order, to a copy of `target`.
    ///
    /// The patched copy is returned only if all operations succeed; `target`
    /// itself is never modified.
    pub fn apply_to<T: Patchable>(&self, target: &T) -> Result<T, PatchError> {
        let mut patched = target.clone();
        for operation in &self.operations {
            apply_operation(&mut patched, operation)?;
        }
        Ok(patched)
    }
}

impl From<Vec<PatchOperation>> for PatchDocument {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self::new(operations)
    }
}

fn resolve<T: Patchable>(path: &str) -> Result<T::Field, PatchError> {
    T::parse_path(path).ok_or_else(|| PatchError::UnknownPath(path.to_string()))
}

fn set_field<T: Patchable>(
    target: &mut T,
    field: T::Field,
    path: &str,
    value: Value,
) -> Result<(), PatchError> {
    target
        .set(field, value)
        .map_err(|e| PatchError::InvalidValue {
            path: path.to_string(),
            message: e.to_string(),
        })
}

fn required_value(operation: &PatchOperation) -> Result<Value, PatchError> {
    operation
        .value
        .clone()
        .ok_or_else(|| PatchError::MissingValue {
            op: operation.op,
            path: operation.path.clone(),
        })
}

fn required_from(operation: &PatchOperation) -> Result<&str, PatchError> {
    operation
        .from
        .as_deref()
        .ok_or_else(|| PatchError::MissingFrom {
            op: operation.op,
            path: operation.path.clone(),
        })
}

fn apply_operation<T: Patchable>(
    target: &mut T,
    operation: &PatchOperation,
) -> Result<(), PatchError> {
    let path = operation.path.as_str();
    let field = resolve::<T>(path)?;

    match operation.op {
        PatchOp::Add | PatchOp::Replace => {
            let value = required_value(operation)?;
            set_field(target, field, path, value)
        }
        PatchOp::Remove => {
            target.reset(field);
            Ok(())
        }
        PatchOp::Copy => {
            let source = resolve::<T>(required_from(operation)?)?;
            let value = target.get(source);
            set_field(target, field, path, value)
        }
        PatchOp::Move => {
            let source = resolve::<T>(required_from(operation)?)?;
            let value = target.get(source);
            target.reset(source);
            set_field(target, field, path, value)
        }
        PatchOp::Test => {
            let expected = required_value(operation)?;
            // Normalise the expected value through the field's own type so that
            // e.g. `95000` and `95000.0` compare equal for decimal fields.
            let mut candidate = target.clone();
            set_field(&mut candidate, field, path, expected)?;
            if candidate.get(field) == target.get(field) {
                Ok(())
            } else {
                Err(PatchError::TestFailed {
                    path: path.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Default)]
    struct Sample {
        title: String,
        count: i32,
        note: Option<String>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SampleField {
        Title,
        Count,
        Note,
    }

    impl Patchable for Sample {
        type Field = SampleField;

        const FIELDS: &'static [SampleField] =
            &[SampleField::Title, SampleField::Count, SampleField::Note];

        fn field_name(field: SampleField) -> &'static str {
            match field {
                SampleField::Title => "title",
                SampleField::Count => "count",
                SampleField::Note => "note",
            }
        }

        fn get(&self, field: SampleField) -> Value {
            match field {
                SampleField::Title => json!(self.title),
                SampleField::Count => json!(self.count),
                SampleField::Note => json!(self.note),
            }
        }

        fn set(&mut self, field: SampleField, value: Value) -> Result<(), serde_json::Error> {
            match field {
                SampleField::Title => self.title = serde_json::from_value(value)?,
                SampleField::Count => self.count = serde_json::from_value(value)?,
                SampleField::Note => self.note = serde_json::from_value(value)?,
            }
            Ok(())
        }

        fn reset(&mut self, field: SampleField) {
            match field {
                SampleField::Title => self.title = String::new(),
                SampleField::Count => self.count = 0,
                SampleField::Note => self.note = None,
            }
        }
    }

    fn sample() -> Sample {
        Sample {
            title: "Original".to_string(),
            count: 3,
            note: Some("keep".to_string()),
        }
    }

    fn doc(value: Value) -> PatchDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_patch_op_deserialization() {
        let op: PatchOp = serde_json::from_str("\"replace\"").unwrap();
        assert_eq!(op, PatchOp::Replace);
        assert!(serde_json::from_str::<PatchOp>("\"merge\"").is_err());
    }

    #[test]
    fn test_patch_document_deserializes_from_array() {
        let document = doc(json!([
            {"op": "replace", "path": "/title", "value": "New"},
            {"op": "remove", "path": "/note"}
        ]));
        assert_eq!(document.len(), 2);
        assert_eq!(document.operations()[0].op, PatchOp::Replace);
        assert_eq!(document.operations()[1].value, None);
    }

    #[test]
    fn test_explicit_null_value_is_present() {
        let document = doc(json!([{"op": "replace", "path": "/note", "value": null}]));
        assert_eq!(document.operations()[0].value, Some(Value::Null));
    }

    #[test]
    fn test_object_document_is_rejected() {
        assert!(serde_json::from_str::<PatchDocument>("{}").is_err());
    }

    #[test]
    fn test_parse_path_variants() {
        assert_eq!(Sample::parse_path("/title"), Some(SampleField::Title));
        assert_eq!(Sample::parse_path("title"), Some(SampleField::Title));
        assert_eq!(Sample::parse_path("/TITLE"), Some(SampleField::Title));
        assert_eq!(Sample::parse_path("/unknown"), None);
        assert_eq!(Sample::parse_path("/title/0"), None);
        assert_eq!(Sample::parse_path("/"), None);
        assert_eq!(Sample::parse_path(""), None);
    }

    #[test]
    fn test_replace_sets_field() {
        let patched = PatchDocument::new(vec![PatchOperation::replace("/title", json!("Updated"))])
            .apply_to(&sample())
            .unwrap();
        assert_eq!(patched.title, "Updated");
        assert_eq!(patched.count, 3);
        assert_eq!(patched.note.as_deref(), Some("keep"));
    }

    #[test]
    fn test_add_behaves_like_replace() {
        let patched = doc(json!([{"op": "add", "path": "/count", "value": 9}]))
            .apply_to(&sample())
            .unwrap();
        assert_eq!(patched.count, 9);
    }

    #[test]
    fn test_remove_resets_to_default() {
        let patched = PatchDocument::new(vec![PatchOperation::remove("/note")])
            .apply_to(&sample())
            .unwrap();
        assert_eq!(patched.note, None);
    }

    #[test]
    fn test_operations_apply_in_order() {
        let patched = doc(json!([
            {"op": "replace", "path": "/title", "value": "First"},
            {"op": "replace", "path": "/title", "value": "Second"}
        ]))
        .apply_to(&sample())
        .unwrap();
        assert_eq!(patched.title, "Second");
    }

    #[test]
    fn test_copy_and_move() {
        let copied = doc(json!([{"op": "copy", "from": "/title", "path": "/note"}]))
            .apply_to(&sample())
            .unwrap();
        assert_eq!(copied.note.as_deref(), Some("Original"));
        assert_eq!(copied.title, "Original");

        let moved = doc(json!([{"op": "move", "from": "/title", "path": "/note"}]))
            .apply_to(&sample())
            .unwrap();
        assert_eq!(moved.note.as_deref(), Some("Original"));
        assert_eq!(moved.title, "");
    }

    #[test]
    fn test_test_operation() {
        assert!(doc(json!([{"op": "test", "path": "/count", "value": 3}]))
            .apply_to(&sample())
            .is_ok());

        let err = doc(json!([{"op": "test", "path": "/count", "value": 4}]))
            .apply_to(&sample())
            .unwrap_err();
        assert_eq!(
            err,
            PatchError::TestFailed {
                path: "/count".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_path_fails_whole_document() {
        let original = sample();
        let err = doc(json!([
            {"op": "replace", "path": "/title", "value": "Changed"},
            {"op": "replace", "path": "/bogus", "value": 1}
        ]))
        .apply_to(&original)
        .unwrap_err();

        assert_eq!(err, PatchError::UnknownPath("/bogus".to_string()));
        assert_eq!(original, sample());
    }

    #[test]
    fn test_missing_value_and_from() {
        let err = doc(json!([{"op": "replace", "path": "/title"}]))
            .apply_to(&sample())
            .unwrap_err();
        assert!(matches!(err, PatchError::MissingValue { .. }));

        let err = doc(json!([{"op": "copy", "path": "/title"}]))
            .apply_to(&sample())
            .unwrap_err();
        assert!(matches!(err, PatchError::MissingFrom { .. }));
    }

    #[test]
    fn test_ill_typed_value() {
        let err = doc(json!([{"op": "replace", "path": "/count", "value": "lots"}]))
            .apply_to(&sample())
            .unwrap_err();
        match err {
            PatchError::InvalidValue { path, .. } => assert_eq!(path, "/count"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_is_identity() {
        let patched = PatchDocument::default().apply_to(&sample()).unwrap();
        assert_eq!(patched, sample());
    }

    #[test]
    fn test_patch_error_display() {
        assert_eq!(
            PatchError::UnknownPath("/x".to_string()).to_string(),
            "The path '/x' does not address a patchable field"
        );
        assert_eq!(
            PatchError::MissingValue {
                op: PatchOp::Replace,
                path: "/title".to_string()
            }
            .to_string(),
            "The 'replace' operation at '/title' requires a value"
        );
    }
}
