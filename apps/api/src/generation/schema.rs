//! Response schemas and structural validation of extracted JSON.
//!
//! Validation never coerces: a score delivered as `"80"` is a type mismatch,
//! not a number. Callers downstream (progress bars, score colouring) assume
//! the declared primitive types.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    // No built-in payload declares a boolean key yet.
    #[allow(dead_code)]
    Boolean,
    /// Homogeneous array; every element must match the inner type.
    Array(Box<FieldType>),
    Object(ObjectSchema),
}

impl FieldType {
    pub fn array_of(inner: FieldType) -> Self {
        FieldType::Array(Box::new(inner))
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array(_) => "array",
            FieldType::Object(_) => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
}

/// Required keys with declared types. Keys not declared here are allowed and ignored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<FieldSpec>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
        });
        self
    }
}

/// Expected top-level shape of a structured generation response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSchema {
    Object(ObjectSchema),
    ArrayOf {
        items: ObjectSchema,
        min_items: usize,
    },
}

impl ResponseSchema {
    pub fn array_of(items: ObjectSchema) -> Self {
        ResponseSchema::ArrayOf {
            items,
            min_items: 0,
        }
    }

    /// Rejects arrays shorter than `min`. No-op on object schemas.
    pub fn with_min_items(self, min: usize) -> Self {
        match self {
            ResponseSchema::ArrayOf { items, .. } => ResponseSchema::ArrayOf {
                items,
                min_items: min,
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required key `{path}`")]
    MissingKey { path: String },

    #[error("`{path}` expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("element {index} of `{path}` is invalid: {source}")]
    ArrayElementInvalid {
        path: String,
        index: usize,
        source: Box<ValidationError>,
    },

    #[error("validated payload could not be decoded: {message}")]
    Decode { message: String },
}

impl ValidationError {
    /// JSON path of the offending value, `$`-rooted.
    pub fn path(&self) -> &str {
        match self {
            ValidationError::MissingKey { path }
            | ValidationError::TypeMismatch { path, .. }
            | ValidationError::ArrayElementInvalid { path, .. } => path,
            ValidationError::Decode { .. } => "$",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(path: &str, expected: &str, actual: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        actual: json_type_name(actual).to_string(),
    }
}

fn check_elements(
    path: &str,
    elements: &[Value],
    mut check: impl FnMut(&str, &Value) -> Result<(), ValidationError>,
) -> Result<(), ValidationError> {
    for (index, element) in elements.iter().enumerate() {
        check(&format!("{path}[{index}]"), element).map_err(|e| {
            ValidationError::ArrayElementInvalid {
                path: path.to_string(),
                index,
                source: Box::new(e),
            }
        })?;
    }
    Ok(())
}

fn check_field(path: &str, value: &Value, field_type: &FieldType) -> Result<(), ValidationError> {
    let matches = match (field_type, value) {
        (FieldType::String, Value::String(_))
        | (FieldType::Number, Value::Number(_))
        | (FieldType::Boolean, Value::Bool(_)) => true,
        (FieldType::Array(inner), Value::Array(elements)) => {
            return check_elements(path, elements, |p, v| check_field(p, v, inner));
        }
        (FieldType::Object(schema), Value::Object(_)) => {
            return check_object(path, value, schema);
        }
        _ => false,
    };

    if matches {
        Ok(())
    } else {
        Err(mismatch(path, field_type.describe(), value))
    }
}

fn check_object(path: &str, value: &Value, schema: &ObjectSchema) -> Result<(), ValidationError> {
    let Value::Object(map) = value else {
        return Err(mismatch(path, "object", value));
    };

    for field in &schema.fields {
        let field_path = format!("{path}.{}", field.name);
        match map.get(&field.name) {
            None => return Err(ValidationError::MissingKey { path: field_path }),
            Some(v) => check_field(&field_path, v, &field.field_type)?,
        }
    }
    Ok(())
}

/// Checks `value` against `schema` and hands it back unchanged on success.
pub fn validate(value: Value, schema: &ResponseSchema) -> Result<Value, ValidationError> {
    match schema {
        ResponseSchema::Object(object) => check_object("$", &value, object)?,
        ResponseSchema::ArrayOf { items, min_items } => {
            let Value::Array(elements) = &value else {
                return Err(mismatch("$", "array", &value));
            };
            if elements.len() < *min_items {
                return Err(ValidationError::TypeMismatch {
                    path: "$".to_string(),
                    expected: format!("array with at least {min_items} items"),
                    actual: format!("array with {} items", elements.len()),
                });
            }
            check_elements("$", elements, |p, v| check_object(p, v, items))?;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn score_schema() -> ResponseSchema {
        ResponseSchema::Object(ObjectSchema::new().required("resumeScore", FieldType::Number))
    }

    fn roadmap_schema() -> ResponseSchema {
        let step = ObjectSchema::new()
            .required("step", FieldType::Number)
            .required("title", FieldType::String)
            .required("description", FieldType::String)
            .required("duration", FieldType::String);
        ResponseSchema::Object(
            ObjectSchema::new().required("careerPath", FieldType::array_of(FieldType::Object(step))),
        )
    }

    #[test]
    fn test_numeric_string_is_type_mismatch() {
        let err = validate(json!({"resumeScore": "80"}), &score_schema()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                path: "$.resumeScore".into(),
                expected: "number".into(),
                actual: "string".into(),
            }
        );
    }

    #[test]
    fn test_valid_value_is_returned_unchanged() {
        let value = json!({"resumeScore": 80, "extra": "ignored"});
        assert_eq!(validate(value.clone(), &score_schema()).unwrap(), value);
    }

    #[test]
    fn test_missing_required_key() {
        let err = validate(json!({}), &score_schema()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingKey {
                path: "$.resumeScore".into()
            }
        );
    }

    #[test]
    fn test_null_required_value_is_mismatch() {
        let err = validate(json!({"resumeScore": null}), &score_schema()).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { ref actual, .. } if actual == "null"));
    }

    #[test]
    fn test_boolean_keys_are_not_coerced() {
        let schema = ResponseSchema::Object(
            ObjectSchema::new()
                .required("a", FieldType::String)
                .required("remote", FieldType::Boolean),
        );
        assert!(validate(json!({"a": "x", "remote": false}), &schema).is_ok());
        assert!(validate(json!({"a": "x", "remote": "false"}), &schema).is_err());
        assert!(validate(json!({"a": "x", "extra": 1, "remote": true}), &schema).is_ok());
    }

    #[test]
    fn test_nested_array_element_error_carries_index_and_path() {
        let value = json!({"careerPath": [
            {"step": 1, "title": "Learn Python", "description": "...", "duration": "3 months"},
            {"step": "2", "title": "Automate", "description": "...", "duration": "6 months"}
        ]});
        let err = validate(value, &roadmap_schema()).unwrap_err();
        match err {
            ValidationError::ArrayElementInvalid {
                path,
                index,
                source,
            } => {
                assert_eq!(path, "$.careerPath");
                assert_eq!(index, 1);
                assert_eq!(source.path(), "$.careerPath[1].step");
            }
            other => panic!("expected ArrayElementInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_array_of_strings_rejects_mixed_elements() {
        let schema = ResponseSchema::Object(
            ObjectSchema::new().required("strengths", FieldType::array_of(FieldType::String)),
        );
        let err = validate(json!({"strengths": ["a", 3]}), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::ArrayElementInvalid { index: 1, .. }));
    }

    #[test]
    fn test_top_level_array_of_objects() {
        let schema = ResponseSchema::array_of(
            ObjectSchema::new()
                .required("question", FieldType::String)
                .required("answer", FieldType::String),
        );
        let ok = json!([{"question": "Q?", "answer": "A."}]);
        assert!(validate(ok, &schema).is_ok());

        let err = validate(json!([{"question": "Q?"}]), &schema).unwrap_err();
        match err {
            ValidationError::ArrayElementInvalid { index, source, .. } => {
                assert_eq!(index, 0);
                assert_eq!(
                    *source,
                    ValidationError::MissingKey {
                        path: "$[0].answer".into()
                    }
                );
            }
            other => panic!("expected ArrayElementInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_object_where_array_expected() {
        let schema = ResponseSchema::array_of(ObjectSchema::new());
        let err = validate(json!({"section": "Overview"}), &schema).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { ref expected, .. } if expected == "array"));
    }

    #[test]
    fn test_min_items() {
        let schema = ResponseSchema::array_of(ObjectSchema::new()).with_min_items(1);
        assert!(validate(json!([]), &schema).is_err());
        assert!(validate(json!([{}]), &schema).is_ok());
    }

    #[test]
    fn test_boolean_is_not_number() {
        let err = validate(json!({"resumeScore": true}), &score_schema()).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { ref actual, .. } if actual == "boolean"));
    }
}
