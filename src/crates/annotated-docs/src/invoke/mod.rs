//! Argument validation and invocation
//!
//! The invoke path is linear: collect every declared argument, validate all of
//! them, then call the function once. Any failure aborts before the call, so a
//! function is never invoked with a partially valid argument set.
//!
//! Validation is strict about JSON kinds: a number is never accepted where a
//! string is declared, and an integer parameter rejects `2.5`. Undeclared keys
//! are ignored (and never reach the function) unless
//! [`SchemaOptions::reject_unknown_arguments`] is set.

use crate::config::SchemaOptions;
use crate::logging::OperationGuard;
use crate::reflect::{ObjectType, Primitive, TypeDescriptor};
use crate::signature::introspect;
use crate::{Callable, FieldPath, FunctionDescriptor, Result, SchemaError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Validated arguments, in declaration order
///
/// Nested objects are reconstructed: only declared fields are kept and
/// missing fields with defaults are filled in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    /// Decode one argument into a Rust type
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| SchemaError::MissingArgument(name.to_string()))?;
        decode_value(name, value.clone())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// The arguments as a JSON object
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.iter().cloned().collect())
    }

    pub fn into_inner(self) -> Vec<(String, Value)> {
        self.values
    }
}

/// Decode a validated value with `serde`, reporting failures against the argument name
pub(crate) fn decode_value<T: DeserializeOwned>(name: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| SchemaError::invalid(FieldPath::root().child(name), e.to_string()))
}

/// Call a function with a raw JSON argument object
pub fn call_with_json<C>(callable: &C, raw_arguments: &Value) -> Result<C::Output>
where
    C: Callable + ?Sized,
{
    call_with_json_with_options(callable, raw_arguments, &SchemaOptions::default())
}

/// Call a function with a raw JSON argument object using explicit options
pub fn call_with_json_with_options<C>(
    callable: &C,
    raw_arguments: &Value,
    options: &SchemaOptions,
) -> Result<C::Output>
where
    C: Callable + ?Sized,
{
    let descriptor = introspect(callable, options)?;
    invoke_with_descriptor(callable, &descriptor, raw_arguments, options)
}

/// Call a function using a previously introspected descriptor
pub fn invoke_with_descriptor<C>(
    callable: &C,
    descriptor: &FunctionDescriptor,
    raw_arguments: &Value,
    options: &SchemaOptions,
) -> Result<C::Output>
where
    C: Callable + ?Sized,
{
    let _guard = OperationGuard::new("call_with_json", &descriptor.name);

    let arguments = bind_arguments(descriptor, raw_arguments, options).map_err(|err| {
        debug!(function = %descriptor.name, error = %err, "argument validation failed");
        err
    })?;
    callable.call(arguments)
}

/// Validate a raw argument object against a descriptor
///
/// Returns the first failure found, in declaration order.
pub fn bind_arguments(
    descriptor: &FunctionDescriptor,
    raw_arguments: &Value,
    options: &SchemaOptions,
) -> Result<Arguments> {
    let Value::Object(raw) = raw_arguments else {
        return Err(SchemaError::invalid(
            FieldPath::root(),
            format!("expected an object of arguments, got {}", json_kind(raw_arguments)),
        ));
    };

    for key in raw.keys() {
        if descriptor.parameter(key).is_some() {
            continue;
        }
        if options.reject_unknown_arguments {
            return Err(SchemaError::invalid(
                FieldPath::root().child(key),
                "unexpected argument",
            ));
        }
        debug!(function = %descriptor.name, argument = %key, "ignoring undeclared argument");
    }

    let validator = Validator {
        reject_unknown: options.reject_unknown_arguments,
        max_depth: options.max_depth,
    };
    let mut values = Vec::with_capacity(descriptor.parameters.len());

    for parameter in &descriptor.parameters {
        let value = match (raw.get(&parameter.name), &parameter.default) {
            (Some(value), _) => {
                let path = FieldPath::root().child(&parameter.name);
                validator.validate(&parameter.ty, value, &path, 1)?
            }
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(SchemaError::MissingArgument(parameter.name.clone())),
        };
        values.push((parameter.name.clone(), value));
    }

    Ok(Arguments { values })
}

/// JSON kind of a value, as used in validation messages
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integer form of an integral float; `3.0` becomes `3`
///
/// Values outside the `i64`/`u64` range keep their float form.
fn integral(value: &Value) -> Value {
    match value.as_f64() {
        Some(f) if value.is_f64() && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Value::from(f as i64)
        }
        Some(f) if value.is_f64() && f >= 0.0 && f < u64::MAX as f64 => Value::from(f as u64),
        _ => value.clone(),
    }
}

/// Literal equality where numbers compare by value, as JSON Schema `enum` does
fn same_literal(member: &Value, value: &Value) -> bool {
    match (member, value) {
        (Value::Number(a), Value::Number(b)) if a.is_f64() || b.is_f64() => {
            a.as_f64() == b.as_f64()
        }
        _ => member == value,
    }
}

struct Validator {
    reject_unknown: bool,
    max_depth: usize,
}

impl Validator {
    /// Validate `value` against `ty` and return its reconstructed form
    fn validate(
        &self,
        ty: &TypeDescriptor,
        value: &Value,
        path: &FieldPath,
        depth: usize,
    ) -> Result<Value> {
        if depth > self.max_depth {
            return Err(SchemaError::invalid(
                path.clone(),
                format!("value is nested deeper than {} levels", self.max_depth),
            ));
        }

        match ty {
            TypeDescriptor::Primitive(primitive) => {
                if !primitive.accepts(value) {
                    Err(mismatch(path, primitive.json_type(), value))
                } else if *primitive == Primitive::Integer {
                    Ok(integral(value))
                } else {
                    Ok(value.clone())
                }
            }
            // The declared member is returned so `2.0` decodes as the member `2`
            TypeDescriptor::Enumeration(allowed) => allowed
                .iter()
                .find(|member| same_literal(member, value))
                .cloned()
                .ok_or_else(|| mismatch(path, &ty.to_string(), value)),
            TypeDescriptor::Object(object) => self.validate_object(object, value, path, depth),
            TypeDescriptor::Sequence(item) => {
                let Value::Array(elements) = value else {
                    return Err(mismatch(path, "array", value));
                };
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| self.validate(item, element, &path.index(i), depth + 1))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            TypeDescriptor::Optional(inner) => {
                if value.is_null() {
                    Ok(Value::Null)
                } else {
                    self.validate(inner, value, path, depth)
                }
            }
            TypeDescriptor::Union(members) => members
                .iter()
                .find_map(|member| self.validate(member, value, path, depth).ok())
                .ok_or_else(|| mismatch(path, &ty.to_string(), value)),
            TypeDescriptor::Map(inner) => {
                let Value::Object(entries) = value else {
                    return Err(mismatch(path, "object", value));
                };
                entries
                    .iter()
                    .map(|(key, entry)| {
                        self.validate(inner, entry, &path.child(key), depth + 1)
                            .map(|validated| (key.clone(), validated))
                    })
                    .collect::<Result<Map<_, _>>>()
                    .map(Value::Object)
            }
            TypeDescriptor::Annotated(inner, _) => self.validate(inner, value, path, depth),
            TypeDescriptor::Any => Err(SchemaError::generation(
                path.to_string(),
                "untyped values (`Any`) cannot be validated",
            )),
            TypeDescriptor::Opaque(name) => Err(SchemaError::generation(
                path.to_string(),
                format!("`{name}` cannot be constructed from JSON"),
            )),
        }
    }

    fn validate_object(
        &self,
        object: &ObjectType,
        value: &Value,
        path: &FieldPath,
        depth: usize,
    ) -> Result<Value> {
        let Value::Object(raw) = value else {
            return Err(mismatch(path, &format!("object `{}`", object.name()), value));
        };
        let fields = object.fields();

        if self.reject_unknown {
            if let Some(key) = raw
                .keys()
                .find(|key| !fields.iter().any(|field| &field.name == *key))
            {
                return Err(SchemaError::invalid(path.child(key), "unexpected field"));
            }
        }

        let mut reconstructed = Map::new();
        for field in fields {
            let field_path = path.child(&field.name);
            let value = match raw.get(&field.name) {
                Some(value) => self.validate(&field.ty, value, &field_path, depth + 1)?,
                None => match field.default {
                    Some(default) => default,
                    None if field.ty.is_optional() => Value::Null,
                    None => return Err(SchemaError::invalid(field_path, "field required")),
                },
            };
            reconstructed.insert(field.name, value);
        }
        Ok(Value::Object(reconstructed))
    }
}

fn mismatch(path: &FieldPath, expected: &str, value: &Value) -> SchemaError {
    SchemaError::invalid(
        path.clone(),
        format!("expected {expected}, got {}", json_kind(value)),
    )
}
