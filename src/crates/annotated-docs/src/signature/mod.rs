//! Signature introspection
//!
//! A [`Callable`](crate::Callable) exposes its declared metadata as a
//! [`Signature`]. [`introspect`] checks that metadata and turns it into a
//! [`FunctionDescriptor`], the input of both schema synthesis and argument
//! binding:
//!
//! - every parameter must have a declared, non-`Any` type, including fields of
//!   nested structured types;
//! - variadic parameters are rejected;
//! - `Annotated` wrappers are stripped and their descriptions merged with the
//!   parameter's own docs according to the [`DescriptionPolicy`];
//! - an `Optional` parameter without a default gets an implicit `null` default.

use crate::config::{DescriptionPolicy, SchemaOptions};
use crate::reflect::{Field, TypeDescriptor};
use crate::{Callable, Result, SchemaError};
use serde_json::Value;
use std::any::TypeId;
use std::collections::HashSet;
use tracing::debug;

/// How a declared parameter receives its value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterKind {
    /// Matched by name from the argument object
    #[default]
    Named,
    /// Collects any number of positional values
    VariadicPositional,
    /// Collects any number of extra named values
    VariadicKeyword,
}

/// A parameter exactly as the callable declares it
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredParameter {
    pub name: String,
    /// `None` when the parameter has no declared type
    pub ty: Option<TypeDescriptor>,
    pub kind: ParameterKind,
    pub default: Option<Value>,
    /// Descriptions attached directly to the parameter, in declaration order
    pub docs: Vec<String>,
}

impl DeclaredParameter {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            kind: ParameterKind::Named,
            default: None,
            docs: Vec::new(),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            kind: ParameterKind::Named,
            default: None,
            docs: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: ParameterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn doc(mut self, description: impl Into<String>) -> Self {
        self.docs.push(description.into());
        self
    }
}

/// Declared metadata of a callable
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub name: String,
    /// Raw docstring; cleaned during introspection
    pub doc: Option<String>,
    pub parameters: Vec<DeclaredParameter>,
    pub returns: Option<TypeDescriptor>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_parameter(mut self, parameter: DeclaredParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_returns(mut self, returns: TypeDescriptor) -> Self {
        self.returns = Some(returns);
        self
    }
}

/// An introspected parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Declared type with `Annotated` wrappers removed
    pub ty: TypeDescriptor,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl ParameterDescriptor {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn is_required(&self) -> bool {
        !self.has_default()
    }
}

/// An introspected callable
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_type: Option<TypeDescriptor>,
}

impl FunctionDescriptor {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of parameters without a default, in declaration order
    pub fn required(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.is_required())
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Introspect a callable's declared signature
pub fn introspect<C>(callable: &C, options: &SchemaOptions) -> Result<FunctionDescriptor>
where
    C: Callable + ?Sized,
{
    describe_signature(callable.signature()?, options)
}

/// Check a [`Signature`] and resolve it into a [`FunctionDescriptor`]
pub fn describe_signature(
    signature: Signature,
    options: &SchemaOptions,
) -> Result<FunctionDescriptor> {
    let function = signature.name;
    let mut seen = HashSet::new();
    let mut parameters = Vec::with_capacity(signature.parameters.len());

    for declared in signature.parameters {
        let name = declared.name;
        if !seen.insert(name.clone()) {
            return Err(SchemaError::unsupported(
                &function,
                &name,
                "is declared more than once",
            ));
        }
        if declared.kind != ParameterKind::Named {
            return Err(SchemaError::unsupported(
                &function,
                &name,
                "is variadic; JSON object keys cannot be mapped onto variadic arguments",
            ));
        }
        let Some(ty) = declared.ty else {
            return Err(SchemaError::unsupported(
                &function,
                &name,
                "has no declared type",
            ));
        };

        check_type(&function, &ty, &name, options.description_policy, &mut HashSet::new())?;

        let (inner, annotations) = ty.unannotated();
        let candidates: Vec<&str> = declared
            .docs
            .iter()
            .map(String::as_str)
            .chain(annotations)
            .collect();
        let description = resolve_description(&candidates, options.description_policy)
            .map_err(|count| {
                SchemaError::unsupported(
                    &function,
                    &name,
                    format!("has {count} conflicting descriptions"),
                )
            })?;

        let default = match declared.default {
            Some(default) => Some(default),
            None if inner.is_optional() => Some(Value::Null),
            None => None,
        };

        parameters.push(ParameterDescriptor {
            name,
            ty: inner.clone(),
            default,
            description,
        });
    }

    debug!(
        function = %function,
        parameters = parameters.len(),
        "introspected signature"
    );

    Ok(FunctionDescriptor {
        description: signature.doc.as_deref().and_then(clean_doc),
        name: function,
        parameters,
        return_type: signature.returns,
    })
}

/// Walk a declared type, rejecting untyped members, duplicate object fields,
/// malformed enumerations and ambiguous field descriptions
fn check_type(
    function: &str,
    ty: &TypeDescriptor,
    path: &str,
    policy: DescriptionPolicy,
    visited: &mut HashSet<TypeId>,
) -> Result<()> {
    match ty {
        TypeDescriptor::Any => Err(SchemaError::unsupported(
            function,
            path,
            "is untyped (`Any`); declare a concrete type",
        )),
        TypeDescriptor::Primitive(_) | TypeDescriptor::Opaque(_) => Ok(()),
        TypeDescriptor::Enumeration(values) => {
            enumeration_kind(values)
                .map(|_| ())
                .map_err(|reason| SchemaError::generation(path, reason))
        }
        TypeDescriptor::Sequence(inner)
        | TypeDescriptor::Optional(inner)
        | TypeDescriptor::Map(inner)
        | TypeDescriptor::Annotated(inner, _) => check_type(function, inner, path, policy, visited),
        TypeDescriptor::Union(members) => {
            if members.is_empty() {
                return Err(SchemaError::generation(path, "union has no members"));
            }
            members
                .iter()
                .try_for_each(|member| check_type(function, member, path, policy, visited))
        }
        TypeDescriptor::Object(object) => {
            if !visited.insert(object.id()) {
                return Ok(());
            }
            let fields = object.fields();
            let mut names = HashSet::new();
            for field in &fields {
                let field_path = format!("{path}.{}", field.name);
                if !names.insert(field.name.as_str()) {
                    return Err(SchemaError::generation(
                        field_path,
                        format!("field is declared more than once in `{}`", object.name()),
                    ));
                }
                field_description(field, policy).map_err(|count| {
                    SchemaError::unsupported(
                        function,
                        &field_path,
                        format!("has {count} conflicting descriptions"),
                    )
                })?;
                check_type(function, &field.ty, &field_path, policy, visited)?;
            }
            Ok(())
        }
    }
}

/// Scalar kind shared by every value of an enumeration
pub(crate) fn enumeration_kind(
    values: &[Value],
) -> std::result::Result<crate::reflect::Primitive, String> {
    use crate::reflect::Primitive;

    let mut kinds = values.iter().map(Primitive::of_value);
    let first = match kinds.next() {
        None => return Err("enumeration has no values".to_string()),
        Some(None) => return Err("enumeration values must be scalars".to_string()),
        Some(Some(kind)) => kind,
    };
    for kind in kinds {
        match kind {
            None => return Err("enumeration values must be scalars".to_string()),
            // integers and floats both satisfy a "number" enumeration
            Some(Primitive::Integer | Primitive::Number)
                if matches!(first, Primitive::Integer | Primitive::Number) => {}
            Some(kind) if kind == first => {}
            Some(kind) => {
                return Err(format!(
                    "enumeration mixes {} and {} values",
                    first.json_type(),
                    kind.json_type()
                ))
            }
        }
    }
    let all_integers = values.iter().all(|v| v.is_i64() || v.is_u64());
    Ok(match first {
        Primitive::Integer | Primitive::Number if all_integers => Primitive::Integer,
        Primitive::Integer | Primitive::Number => Primitive::Number,
        other => other,
    })
}

/// Description of an object field: its docs first, then its type annotations
pub(crate) fn field_description(
    field: &Field,
    policy: DescriptionPolicy,
) -> std::result::Result<Option<String>, usize> {
    let (_, annotations) = field.ty.unannotated();
    let candidates: Vec<&str> = field
        .docs
        .iter()
        .map(String::as_str)
        .chain(annotations)
        .collect();
    resolve_description(&candidates, policy)
}

/// Pick one description from the candidates
///
/// Returns `Err(count)` when the policy is [`DescriptionPolicy::Reject`] and
/// more than one candidate exists.
pub(crate) fn resolve_description(
    candidates: &[&str],
    policy: DescriptionPolicy,
) -> std::result::Result<Option<String>, usize> {
    let picked = match policy {
        DescriptionPolicy::First => candidates.first(),
        DescriptionPolicy::Last => candidates.last(),
        DescriptionPolicy::Reject if candidates.len() > 1 => return Err(candidates.len()),
        DescriptionPolicy::Reject => candidates.first(),
    };
    Ok(picked.map(|description| description.to_string()))
}

/// Clean a docstring: drop the common indentation of all lines after the
/// first, then trim surrounding whitespace
///
/// Returns `None` when nothing remains.
///
/// ```rust
/// use annotated_docs::signature::clean_doc;
///
/// let doc = "
///     Get the weather.
///
///       Units default to fahrenheit.
/// ";
/// assert_eq!(
///     clean_doc(doc).as_deref(),
///     Some("Get the weather.\n\n  Units default to fahrenheit.")
/// );
/// assert_eq!(clean_doc("   \n  "), None);
/// ```
pub fn clean_doc(doc: &str) -> Option<String> {
    let lines: Vec<&str> = doc.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.trim()
            } else {
                line.get(indent..).unwrap_or_else(|| line.trim_start()).trim_end()
            }
        })
        .collect();

    let cleaned = cleaned.join("\n");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}
