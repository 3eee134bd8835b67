//! Shared action schema helpers.

use crate::{Error, Result};
use schemars::generate::SchemaSettings;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const ROOT_PATH: &str = "input";

fn schema_any(_: &mut SchemaGenerator) -> Schema {
    true.into()
}

/// Wrapper for arbitrary JSON payloads when an action output is dynamic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(schema_with = "schema_any")]
pub struct AnyJson(pub Value);

impl AnyJson {
    pub fn new(value: Value) -> Self {
        Self(value)
    }
}

impl From<Value> for AnyJson {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<AnyJson> for Value {
    fn from(value: AnyJson) -> Self {
        value.0
    }
}

/// Self-contained JSON schema for an action input, with every subschema
/// inlined so it can be walked without resolving references.
pub fn input_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft2020_12()
        .with(|s| s.inline_subschemas = true)
        .into_generator();
    generator.into_root_schema_for::<T>().into()
}

/// Validate untyped input against `schema`, then deserialize it.
///
/// Schema violations and deserialization failures both surface as
/// [`Error::Validation`] naming the offending path.
pub fn parse_input<T: DeserializeOwned>(schema: &Value, input: Value) -> Result<T> {
    check(schema, &input, "")?;
    serde_json::from_value(input)
        .map_err(|e| Error::validation(ROOT_PATH, e.to_string()))
}

/// Re-root a validation error raised on a nested value under `prefix`
pub(crate) fn nest_error(prefix: &str, err: Error) -> Error {
    match err {
        Error::Validation { path, expected } => Error::validation(child_path(prefix, &path), expected),
        other => other,
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        ROOT_PATH
    } else {
        path
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn is_null_schema(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

fn check(schema: &Value, value: &Value, path: &str) -> Result<()> {
    let schema = match schema {
        Value::Object(map) => map,
        Value::Bool(false) => return Err(Error::validation(display_path(path), "no value")),
        _ => return Ok(()),
    };

    for key in ["anyOf", "oneOf"] {
        if let Some(variants) = schema.get(key).and_then(Value::as_array) {
            check_variants(variants, value, path)?;
        }
    }
    if let Some(all) = schema.get("allOf").and_then(Value::as_array) {
        for sub in all {
            check(sub, value, path)?;
        }
    }

    match schema.get("type") {
        Some(Value::String(expected)) if !matches_type(expected, value) => {
            return Err(Error::validation(display_path(path), format!("type {}", expected)));
        }
        Some(Value::Array(expected)) => {
            let names: Vec<&str> = expected.iter().filter_map(Value::as_str).collect();
            if !names.iter().any(|t| matches_type(t, value)) {
                return Err(Error::validation(
                    display_path(path),
                    format!("type {}", names.join(" or ")),
                ));
            }
        }
        _ => {}
    }

    if let Some(allowed) = schema.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            let options: Vec<String> = allowed.iter().map(Value::to_string).collect();
            return Err(Error::validation(
                display_path(path),
                format!("one of {}", options.join(", ")),
            ));
        }
    }
    if let Some(constant) = schema.get("const") {
        if constant != value {
            return Err(Error::validation(display_path(path), constant.to_string()));
        }
    }

    if let (Some(minimum), Some(n)) = (schema.get("minimum").and_then(Value::as_f64), value.as_f64()) {
        if n < minimum {
            return Err(Error::validation(
                display_path(path),
                format!("a number >= {}", minimum),
            ));
        }
    }

    if let Value::Object(object) = value {
        check_object(schema, object, path)?;
    }

    if let (Value::Array(items), Some(item_schema)) = (value, schema.get("items")) {
        for (i, item) in items.iter().enumerate() {
            check(item_schema, item, &format!("{}[{}]", display_path(path), i))?;
        }
    }

    Ok(())
}

fn check_variants(variants: &[Value], value: &Value, path: &str) -> Result<()> {
    let mut first_error = None;
    for variant in variants {
        match check(variant, value, path) {
            Ok(()) => return Ok(()),
            Err(e) if first_error.is_none() && !is_null_schema(variant) => first_error = Some(e),
            Err(_) => {}
        }
    }
    Err(first_error
        .unwrap_or_else(|| Error::validation(display_path(path), "a value matching the schema")))
}

fn check_object(schema: &Map<String, Value>, object: &Map<String, Value>, path: &str) -> Result<()> {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(key) {
                return Err(Error::validation(child_path(path, key), "a value"));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, sub) in properties {
            if let Some(field) = object.get(key) {
                check(sub, field, &child_path(path, key))?;
            }
        }
    }

    Ok(())
}
