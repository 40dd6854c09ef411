//! JSON Schema synthesis
//!
//! Turns a [`FunctionDescriptor`] into the tool document consumed by
//! function-calling APIs:
//!
//! ```json
//! {
//!   "name": "get_current_weather",
//!   "description": "Get the current weather",
//!   "parameters": {
//!     "type": "object",
//!     "properties": {
//!       "location": {"$ref": "#/$defs/Location"},
//!       "unit": {"type": "string", "enum": ["celsius", "fahrenheit"], "default": "fahrenheit"}
//!     },
//!     "required": ["location"],
//!     "$defs": {
//!       "Location": {
//!         "type": "object",
//!         "properties": {"city": {"type": "string"}, "country": {"type": "string"}},
//!         "required": ["city", "country"]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Properties keep declaration order. Structured types are rendered once into
//! `$defs` and referenced everywhere else, including from inside themselves.

use crate::config::{DescriptionPolicy, SchemaOptions};
use crate::logging::OperationGuard;
use crate::reflect::{ObjectType, TypeDescriptor};
use crate::signature::{enumeration_kind, field_description, introspect, resolve_description};
use crate::{Callable, FunctionDescriptor, Result, SchemaError};
use serde_json::{json, Map, Value};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};

/// Describe a callable as a JSON Schema tool document
pub fn as_json_schema<C>(callable: &C) -> Result<Value>
where
    C: Callable + ?Sized,
{
    as_json_schema_with_options(callable, &SchemaOptions::default())
}

/// Describe a callable as a JSON Schema tool document using explicit options
pub fn as_json_schema_with_options<C>(callable: &C, options: &SchemaOptions) -> Result<Value>
where
    C: Callable + ?Sized,
{
    let descriptor = introspect(callable, options)?;
    let _guard = OperationGuard::new("as_json_schema", &descriptor.name);
    synthesize(&descriptor, options)
}

/// Render a function descriptor as a JSON Schema tool document
pub fn synthesize(descriptor: &FunctionDescriptor, options: &SchemaOptions) -> Result<Value> {
    let mut renderer = SchemaRenderer::new(options.description_policy);
    let mut properties = Map::new();
    let mut required = Vec::new();

    for parameter in &descriptor.parameters {
        let mut fragment = renderer.render_property(&parameter.ty, &parameter.name)?;
        decorate(
            &mut fragment,
            parameter.description.as_deref(),
            parameter.default.as_ref(),
        );
        properties.insert(parameter.name.clone(), fragment);
        if parameter.is_required() {
            required.push(Value::String(parameter.name.clone()));
        }
    }

    let mut parameters = Map::new();
    parameters.insert("type".into(), json!("object"));
    parameters.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        parameters.insert("required".into(), Value::Array(required));
    }
    if let Some(defs) = renderer.into_defs() {
        parameters.insert("$defs".into(), defs);
    }

    let mut document = Map::new();
    document.insert("name".into(), json!(descriptor.name));
    if let Some(description) = &descriptor.description {
        document.insert("description".into(), json!(description));
    }
    document.insert("parameters".into(), Value::Object(parameters));

    if options.include_returns {
        let Some(return_type) = &descriptor.return_type else {
            return Err(SchemaError::unsupported(
                &descriptor.name,
                "returns",
                "has no declared return type",
            ));
        };
        document.insert(
            "returns".into(),
            render_returns(return_type, options.description_policy)?,
        );
    }

    Ok(Value::Object(document))
}

/// Standalone schema for a return type, carrying its own `$defs`
fn render_returns(return_type: &TypeDescriptor, policy: DescriptionPolicy) -> Result<Value> {
    let (inner, annotations) = return_type.unannotated();
    let description = resolve_description(&annotations, policy).map_err(|count| {
        SchemaError::generation("returns", format!("has {count} conflicting descriptions"))
    })?;

    let mut renderer = SchemaRenderer::new(policy);
    let mut fragment = renderer.render(inner, "returns")?;
    decorate(&mut fragment, description.as_deref(), None);
    if let (Some(defs), Value::Object(object)) = (renderer.into_defs(), &mut fragment) {
        object.insert("$defs".into(), defs);
    }
    Ok(fragment)
}

fn decorate(fragment: &mut Value, description: Option<&str>, default: Option<&Value>) {
    let Value::Object(object) = fragment else {
        return;
    };
    if let Some(description) = description {
        object.insert("description".into(), json!(description));
    }
    if let Some(default) = default {
        object.insert("default".into(), default.clone());
    }
}

fn reference(name: &str) -> Value {
    json!({ "$ref": format!("#/$defs/{name}") })
}

/// Renders type descriptors, collecting structured types into `$defs`
struct SchemaRenderer {
    policy: DescriptionPolicy,
    defs: Map<String, Value>,
    names: HashMap<TypeId, String>,
}

impl SchemaRenderer {
    fn new(policy: DescriptionPolicy) -> Self {
        Self {
            policy,
            defs: Map::new(),
            names: HashMap::new(),
        }
    }

    fn into_defs(self) -> Option<Value> {
        (!self.defs.is_empty()).then_some(Value::Object(self.defs))
    }

    /// Fragment for a parameter or field; an optional one renders as its
    /// inner type, since its optionality is the absence from `required`
    fn render_property(&mut self, ty: &TypeDescriptor, path: &str) -> Result<Value> {
        match ty {
            TypeDescriptor::Optional(inner) => self.render(inner, path),
            _ => self.render(ty, path),
        }
    }

    fn render(&mut self, ty: &TypeDescriptor, path: &str) -> Result<Value> {
        match ty {
            TypeDescriptor::Primitive(primitive) => Ok(json!({ "type": primitive.json_type() })),
            TypeDescriptor::Enumeration(values) => {
                let kind = enumeration_kind(values)
                    .map_err(|reason| SchemaError::generation(path, reason))?;
                Ok(json!({ "type": kind.json_type(), "enum": values }))
            }
            TypeDescriptor::Object(object) => self.render_object(object, path),
            TypeDescriptor::Sequence(item) => {
                let items = self.render(item, path)?;
                Ok(json!({ "type": "array", "items": items }))
            }
            // Items, map values and union members have no `required` to drop out of
            TypeDescriptor::Optional(inner) => {
                let inner = self.render(inner, path)?;
                Ok(json!({ "anyOf": [inner, { "type": "null" }] }))
            }
            TypeDescriptor::Union(members) => {
                if members.is_empty() {
                    return Err(SchemaError::generation(path, "union has no members"));
                }
                let any_of = members
                    .iter()
                    .map(|member| self.render(member, path))
                    .collect::<Result<Vec<_>>>()?;
                Ok(json!({ "anyOf": any_of }))
            }
            TypeDescriptor::Map(value) => {
                let values = self.render(value, path)?;
                Ok(json!({ "type": "object", "additionalProperties": values }))
            }
            TypeDescriptor::Annotated(inner, description) => {
                let mut fragment = self.render(inner, path)?;
                decorate(&mut fragment, Some(description), None);
                Ok(fragment)
            }
            TypeDescriptor::Any => Err(SchemaError::generation(
                path,
                "untyped values (`Any`) have no JSON Schema representation",
            )),
            TypeDescriptor::Opaque(name) => Err(SchemaError::generation(
                path,
                format!("`{name}` has no JSON Schema representation"),
            )),
        }
    }

    fn render_object(&mut self, object: &ObjectType, path: &str) -> Result<Value> {
        if let Some(name) = self.names.get(&object.id()) {
            return Ok(reference(name));
        }

        // Reserve the slot first so self-references resolve to it
        let name = self.unique_name(object.name());
        self.names.insert(object.id(), name.clone());
        self.defs.insert(name.clone(), Value::Null);

        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut seen = HashSet::new();

        for field in object.fields() {
            let field_path = format!("{path}.{}", field.name);
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::generation(
                    field_path,
                    format!("field is declared more than once in `{}`", object.name()),
                ));
            }

            let description = field_description(&field, self.policy).map_err(|count| {
                let reason = format!("has {count} conflicting descriptions");
                SchemaError::generation(&field_path, reason)
            })?;
            let (inner, _) = field.ty.unannotated();
            let default = field
                .default
                .clone()
                .or_else(|| inner.is_optional().then_some(Value::Null));

            let mut fragment = self.render_property(inner, &field_path)?;
            decorate(&mut fragment, description.as_deref(), default.as_ref());
            if default.is_none() {
                required.push(Value::String(field.name.clone()));
            }
            properties.insert(field.name, fragment);
        }

        let mut definition = Map::new();
        definition.insert("type".into(), json!("object"));
        if let Some(description) = object.description() {
            definition.insert("description".into(), json!(description));
        }
        definition.insert("properties".into(), Value::Object(properties));
        if !required.is_empty() {
            definition.insert("required".into(), Value::Array(required));
        }
        self.defs.insert(name.clone(), Value::Object(definition));

        Ok(reference(&name))
    }

    /// `$defs` key for a type name, suffixed when another type already uses it
    fn unique_name(&self, base: &str) -> String {
        if !self.defs.contains_key(base) {
            return base.to_string();
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{base}{suffix}");
            if !self.defs.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Field, Reflect};
    use crate::signature::{describe_signature, DeclaredParameter, Signature};

    struct Category;

    impl Reflect for Category {
        fn reflect() -> TypeDescriptor {
            TypeDescriptor::Object(
                ObjectType::of::<Self>("Category", || {
                    vec![
                        Field::new::<String>("name"),
                        Field::new::<Vec<Category>>("children").with_default(json!([])),
                        Field::new::<Option<Category>>("parent"),
                    ]
                })
                .with_description("A node in the category tree"),
            )
        }
    }

    fn schema_for(signature: Signature) -> Result<Value> {
        let options = SchemaOptions::default();
        synthesize(&describe_signature(signature, &options)?, &options)
    }

    #[test]
    fn test_empty_signature() {
        let schema = schema_for(Signature::new("noop")).unwrap();
        assert_eq!(
            schema,
            json!({
                "name": "noop",
                "parameters": {"type": "object", "properties": {}}
            })
        );
    }

    #[test]
    fn test_primitive_fragments() {
        let mut renderer = SchemaRenderer::new(DescriptionPolicy::Last);
        assert_eq!(
            renderer.render(&TypeDescriptor::integer(), "a").unwrap(),
            json!({"type": "integer"})
        );
        assert_eq!(
            renderer
                .render(&TypeDescriptor::sequence(TypeDescriptor::number()), "a")
                .unwrap(),
            json!({"type": "array", "items": {"type": "number"}})
        );
        assert_eq!(
            renderer
                .render(&TypeDescriptor::optional(TypeDescriptor::boolean()), "a")
                .unwrap(),
            json!({"anyOf": [{"type": "boolean"}, {"type": "null"}]})
        );
        assert_eq!(
            renderer
                .render_property(&TypeDescriptor::optional(TypeDescriptor::boolean()), "a")
                .unwrap(),
            json!({"type": "boolean"})
        );
        assert_eq!(
            renderer
                .render(&TypeDescriptor::map(TypeDescriptor::string()), "a")
                .unwrap(),
            json!({"type": "object", "additionalProperties": {"type": "string"}})
        );
        assert!(renderer.into_defs().is_none());
    }

    #[test]
    fn test_self_referential_type() {
        let schema = schema_for(
            Signature::new("add_category")
                .with_parameter(DeclaredParameter::new("category", Category::reflect())),
        )
        .unwrap();

        let parameters = &schema["parameters"];
        assert_eq!(parameters["properties"]["category"], json!({"$ref": "#/$defs/Category"}));
        assert_eq!(
            parameters["$defs"],
            json!({
                "Category": {
                    "type": "object",
                    "description": "A node in the category tree",
                    "properties": {
                        "name": {"type": "string"},
                        "children": {
                            "type": "array",
                            "items": {"$ref": "#/$defs/Category"},
                            "default": []
                        },
                        "parent": {"$ref": "#/$defs/Category", "default": null}
                    },
                    "required": ["name"]
                }
            })
        );
    }

    #[test]
    fn test_nullable_items_and_values() {
        let schema = schema_for(
            Signature::new("record")
                .with_parameter(DeclaredParameter::new(
                    "readings",
                    TypeDescriptor::sequence(TypeDescriptor::optional(TypeDescriptor::number())),
                ))
                .with_parameter(DeclaredParameter::new(
                    "labels",
                    TypeDescriptor::map(TypeDescriptor::optional(TypeDescriptor::string())),
                ))
                .with_parameter(DeclaredParameter::new(
                    "note",
                    TypeDescriptor::optional(TypeDescriptor::string()),
                )),
        )
        .unwrap();

        let properties = &schema["parameters"]["properties"];
        assert_eq!(
            properties["readings"],
            json!({
                "type": "array",
                "items": {"anyOf": [{"type": "number"}, {"type": "null"}]}
            })
        );
        assert_eq!(
            properties["labels"],
            json!({
                "type": "object",
                "additionalProperties": {"anyOf": [{"type": "string"}, {"type": "null"}]}
            })
        );
        assert_eq!(properties["note"], json!({"type": "string", "default": null}));
        assert_eq!(schema["parameters"]["required"], json!(["readings", "labels"]));
    }

    #[test]
    fn test_opaque_type_fails() {
        let err = schema_for(Signature::new("schedule").with_parameter(DeclaredParameter::new(
            "callback",
            TypeDescriptor::opaque("fn(Event)"),
        )))
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::generation("callback", "`fn(Event)` has no JSON Schema representation")
        );
    }

    #[test]
    fn test_unique_names() {
        let mut renderer = SchemaRenderer::new(DescriptionPolicy::Last);
        renderer.defs.insert("Item".into(), Value::Null);
        renderer.defs.insert("Item2".into(), Value::Null);
        assert_eq!(renderer.unique_name("Item"), "Item3");
        assert_eq!(renderer.unique_name("Other"), "Other");
    }

    #[test]
    fn test_returns_requires_declared_type() {
        let options = SchemaOptions::new().with_include_returns(true);
        let descriptor = describe_signature(Signature::new("f"), &options).unwrap();
        let err = synthesize(&descriptor, &options).unwrap_err();
        assert_eq!(
            err,
            SchemaError::unsupported("f", "returns", "has no declared return type")
        );
    }
}
