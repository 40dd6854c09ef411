//! JSON Schema descriptions and validated JSON invocation for typed functions
//!
//! This crate turns a Rust function with declared parameter metadata into a
//! JSON Schema "function description" suitable for LLM tool calling, and
//! invokes the same function from a raw JSON argument object after validating
//! it against the declared types.
//!
//! # Modules
//!
//! - `reflect` - Declared type metadata and the [`Reflect`] trait
//! - `signature` - Signature introspection into a [`FunctionDescriptor`]
//! - `schema` - JSON Schema synthesis with shared `$defs`
//! - `invoke` - Argument validation and invocation
//! - `function` - The [`Callable`] trait and the [`Function`] adapter
//! - `config` - [`SchemaOptions`] with environment and YAML loading
//! - `error` - [`SchemaError`] and dotted [`FieldPath`]s
//! - `logging` - Operation timing helpers
//!
//! # Example
//!
//! ```rust
//! use annotated_docs::{as_json_schema, call_with_json, Function, Param};
//! use annotated_docs::reflect::{Reflect, TypeDescriptor};
//! use serde::Deserialize;
//! use serde_json::json;
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
//!
//! fn get_weather(city: String, unit: Unit) -> String {
//!     match unit {
//!         Unit::Celsius => format!("22 degrees in {city}"),
//!         Unit::Fahrenheit => format!("72 degrees in {city}"),
//!     }
//! }
//!
//! let tool = Function::new("get_weather", get_weather)
//!     .doc("Get the weather for a city.")
//!     .param(Param::new("city").doc("City name"))
//!     .param(Param::new("unit").default("fahrenheit"));
//!
//! let schema = as_json_schema(&tool).unwrap();
//! assert_eq!(schema["parameters"]["required"], json!(["city"]));
//!
//! let report = call_with_json(&tool, &json!({"city": "Paris"})).unwrap();
//! assert_eq!(report, "72 degrees in Paris");
//! ```

pub mod config;
pub mod error;
pub mod function;
pub mod invoke;
pub mod logging;
pub mod reflect;
pub mod schema;
pub mod signature;

pub use config::{ConfigBuilder, DescriptionPolicy, SchemaOptions};
pub use error::{FieldPath, Result, SchemaError};
pub use function::{Callable, Function, Handler, Param};
pub use invoke::{
    bind_arguments, call_with_json, call_with_json_with_options, invoke_with_descriptor,
    Arguments,
};
pub use reflect::{Field, ObjectType, Primitive, Reflect, TypeDescriptor};
pub use schema::{as_json_schema, as_json_schema_with_options, synthesize};
pub use signature::{
    describe_signature, introspect, DeclaredParameter, FunctionDescriptor, ParameterDescriptor,
    ParameterKind, Signature,
};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
