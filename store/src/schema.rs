//! The schema validator capability (§6 of the spec): `parse`/`safe_parse` over a
//! `serde_json::Value`, producing a typed `T` or a structured [`ValidationError`]. No
//! concrete validator crate is bundled — only the capability — but [`JsonSchema`] ships as
//! a reference implementation usable in tests and as documentation of the contract.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;

/// Capability satisfied by any schema validator: parse a raw JSON value into `T`, or report
/// structured issues. `safe_parse` exists for API-shape fidelity with the language-neutral
/// spec's `parse`/`safeParse` pair — in Rust both already return `Result`, so the default
/// implementation simply delegates.
pub trait Schema<T>: Send + Sync {
    fn parse(&self, value: &Value) -> Result<T, ValidationError>;

    fn safe_parse(&self, value: &Value) -> Result<T, ValidationError> { self.parse(value) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Object,
    Array,
    Any,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Int => value.is_i64() || value.is_u64(),
            FieldKind::Float => value.is_number(),
            FieldKind::Bool => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
            FieldKind::Any => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: FieldKind) -> Self { FieldSpec { name, kind, required: true } }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self { FieldSpec { name, kind, required: false } }
}

/// A field-presence/type-checking `Schema<T>` over plain JSON objects, then a final
/// `serde_json::from_value` to materialize `T`. Field checks run first so a type mismatch
/// reports a structured `{path, message}` rather than serde's raw deserialization message.
pub struct JsonSchema<T> {
    fields: Vec<FieldSpec>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    pub fn new(fields: Vec<FieldSpec>) -> Self { JsonSchema { fields, _marker: PhantomData } }
}

impl<T: DeserializeOwned + Send + Sync> Schema<T> for JsonSchema<T> {
    fn parse(&self, value: &Value) -> Result<T, ValidationError> {
        let obj = value
            .as_object()
            .ok_or_else(|| ValidationError::single("$", "expected an object"))?;

        let mut issues = Vec::new();
        for field in &self.fields {
            match obj.get(field.name) {
                Some(v) if !field.kind.matches(v) => {
                    issues.push(crate::error::ValidationIssue { path: field.name.to_string(), message: format!("expected {:?}", field.kind) });
                }
                None if field.required => {
                    issues.push(crate::error::ValidationIssue { path: field.name.to_string(), message: "missing required field".to_string() });
                }
                _ => {}
            }
        }
        if !issues.is_empty() {
            return Err(ValidationError { issues });
        }

        serde_json::from_value(value.clone()).map_err(|e| ValidationError::single("$", e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct User {
        id: String,
        name: String,
        age: i64,
    }

    fn user_schema() -> JsonSchema<User> {
        JsonSchema::new(vec![
            FieldSpec::required("id", FieldKind::String),
            FieldSpec::required("name", FieldKind::String),
            FieldSpec::required("age", FieldKind::Int),
        ])
    }

    #[test]
    fn test_parse_valid_record() {
        let schema = user_schema();
        let user = schema.parse(&json!({"id": "1", "name": "Alice", "age": 30})).unwrap();
        assert_eq!(user, User { id: "1".into(), name: "Alice".into(), age: 30 });
    }

    #[test]
    fn test_parse_reports_missing_and_wrong_type_fields() {
        let schema = user_schema();
        let err = schema.parse(&json!({"id": "1", "age": "thirty"})).unwrap_err();
        let paths: Vec<&str> = err.issues.iter().map(|i| i.path.as_str()).collect();
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"age"));
    }
}
