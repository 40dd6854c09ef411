//! Declared type metadata
//!
//! Rust has no runtime reflection over function signatures, so every type
//! that can appear as a parameter describes itself through [`Reflect`].
//! Standard types are covered in this crate; structured types and literal
//! enumerations implement it next to their `serde` derives:
//!
//! ```rust
//! use annotated_docs::reflect::{Field, ObjectType, Reflect, TypeDescriptor};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Location {
//!     city: String,
//!     country: String,
//! }
//!
//! impl Reflect for Location {
//!     fn reflect() -> TypeDescriptor {
//!         TypeDescriptor::Object(ObjectType::of::<Self>("Location", || {
//!             vec![
//!                 Field::new::<String>("city").doc("City name"),
//!                 Field::new::<String>("country"),
//!             ]
//!         }))
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! #[serde(rename_all = "lowercase")]
//! enum Unit {
//!     Celsius,
//!     Fahrenheit,
//! }
//!
//! impl Reflect for Unit {
//!     fn reflect() -> TypeDescriptor {
//!         TypeDescriptor::literals(["celsius", "fahrenheit"])
//!     }
//! }
//! ```
//!
//! Object fields are produced by a plain `fn` that is only called when the
//! object is rendered or validated, so a type may refer to itself.

mod impls;

use serde_json::Value;
use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// Types that can describe their JSON shape
pub trait Reflect {
    fn reflect() -> TypeDescriptor;
}

/// Scalar JSON kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl Primitive {
    /// JSON Schema `type` keyword for this kind
    pub fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Kind match by JSON value; `3.0` is an integer, `3.5` is not
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Null => value.is_null(),
        }
    }

    /// Kind of a scalar JSON value; `None` for arrays and objects
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(_) => Some(Self::Boolean),
            Value::Number(n) if n.is_f64() => Some(Self::Number),
            Value::Number(_) => Some(Self::Integer),
            Value::String(_) => Some(Self::String),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Declared type of a parameter or field
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(Primitive),
    /// Closed, ordered set of allowed scalar values
    Enumeration(Vec<Value>),
    /// Named aggregate with ordered fields
    Object(ObjectType),
    Sequence(Box<TypeDescriptor>),
    /// `null` or the inner type
    Optional(Box<TypeDescriptor>),
    /// Any of the listed types, tried in order
    Union(Vec<TypeDescriptor>),
    /// Object with arbitrary string keys and uniformly typed values
    Map(Box<TypeDescriptor>),
    /// Inner type carrying a human-readable description
    Annotated(Box<TypeDescriptor>, String),
    /// Untyped; no schema can be derived
    Any,
    /// A type without a JSON representation, such as a function type
    Opaque(Cow<'static, str>),
}

impl TypeDescriptor {
    pub fn of<T: Reflect + ?Sized>() -> Self {
        T::reflect()
    }

    pub fn string() -> Self {
        Self::Primitive(Primitive::String)
    }

    pub fn integer() -> Self {
        Self::Primitive(Primitive::Integer)
    }

    pub fn number() -> Self {
        Self::Primitive(Primitive::Number)
    }

    pub fn boolean() -> Self {
        Self::Primitive(Primitive::Boolean)
    }

    pub fn null() -> Self {
        Self::Primitive(Primitive::Null)
    }

    /// Enumeration of literal values, in the given order
    pub fn literals<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Enumeration(values.into_iter().map(Into::into).collect())
    }

    pub fn sequence(item: Self) -> Self {
        Self::Sequence(Box::new(item))
    }

    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn union(members: impl IntoIterator<Item = Self>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn opaque(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Opaque(name.into())
    }

    /// Wrap this type with a description
    pub fn annotated(self, description: impl Into<String>) -> Self {
        Self::Annotated(Box::new(self), description.into())
    }

    /// Strip `Annotated` wrappers, returning the inner type and the
    /// descriptions found, outermost first
    pub fn unannotated(&self) -> (&TypeDescriptor, Vec<&str>) {
        let mut current = self;
        let mut descriptions = Vec::new();
        while let Self::Annotated(inner, description) = current {
            descriptions.push(description.as_str());
            current = inner;
        }
        (current, descriptions)
    }

    /// Whether `null` is accepted, looking through annotations
    pub fn is_optional(&self) -> bool {
        matches!(self.unannotated().0, Self::Optional(_))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => f.write_str(primitive.json_type()),
            Self::Enumeration(values) => {
                let values: Vec<String> = values.iter().map(Value::to_string).collect();
                write!(f, "one of [{}]", values.join(", "))
            }
            Self::Object(object) => f.write_str(object.name()),
            Self::Sequence(item) => write!(f, "array of {item}"),
            Self::Optional(inner) => write!(f, "{inner} or null"),
            Self::Union(members) => {
                let members: Vec<String> = members.iter().map(ToString::to_string).collect();
                f.write_str(&members.join(" | "))
            }
            Self::Map(value) => write!(f, "map of {value}"),
            Self::Annotated(inner, _) => write!(f, "{inner}"),
            Self::Any => f.write_str("any"),
            Self::Opaque(name) => f.write_str(name),
        }
    }
}

/// A structured object type
///
/// Identity is the [`TypeId`] of the declaring Rust type, so two types with
/// the same shape are still distinct.
#[derive(Clone)]
pub struct ObjectType {
    id: TypeId,
    name: Cow<'static, str>,
    description: Option<Cow<'static, str>>,
    fields: fn() -> Vec<Field>,
}

impl ObjectType {
    /// Object type identified by `T`, with lazily produced fields
    pub fn of<T: ?Sized + 'static>(
        name: impl Into<Cow<'static, str>>,
        fields: fn() -> Vec<Field>,
    ) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: name.into(),
            description: None,
            fields,
        }
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Declared fields, in order
    pub fn fields(&self) -> Vec<Field> {
        (self.fields)()
    }
}

impl PartialEq for ObjectType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A field of a structured object type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDescriptor,
    pub default: Option<Value>,
    /// Descriptions attached to the field, in declaration order
    pub docs: Vec<String>,
}

impl Field {
    pub fn new<T: Reflect + ?Sized>(name: impl Into<String>) -> Self {
        Self::with_type(name, T::reflect())
    }

    pub fn with_type(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            docs: Vec::new(),
        }
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
