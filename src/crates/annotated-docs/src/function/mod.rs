//! Describable functions
//!
//! A [`Callable`] is anything that can report its declared [`Signature`] and
//! be invoked with validated [`Arguments`]. [`Function`] adapts a plain Rust
//! function or closure: parameter types come from the function's own argument
//! types through [`Reflect`], while names, defaults and descriptions are
//! declared alongside it.
//!
//! ```rust
//! use annotated_docs::{as_json_schema, call_with_json, Function, Param};
//! use serde_json::json;
//!
//! fn repeat(text: String, times: u32) -> String {
//!     text.repeat(times as usize)
//! }
//!
//! let repeat = Function::new("repeat", repeat)
//!     .doc("Repeat a piece of text.")
//!     .param(Param::new("text").doc("Text to repeat"))
//!     .param(Param::new("times").default(2));
//!
//! let schema = as_json_schema(&repeat).unwrap();
//! assert_eq!(schema["parameters"]["required"], json!(["text"]));
//!
//! let output = call_with_json(&repeat, &json!({"text": "ab"})).unwrap();
//! assert_eq!(output, "abab");
//! ```

use crate::invoke::Arguments;
use crate::reflect::{Reflect, TypeDescriptor};
use crate::signature::{DeclaredParameter, ParameterKind, Signature};
use crate::{Result, SchemaError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A function that can be described and invoked with JSON arguments
pub trait Callable {
    type Output;

    /// Declared metadata, checked by [`introspect`](crate::introspect)
    fn signature(&self) -> Result<Signature>;

    /// Invoke with arguments that were already bound against the signature
    fn call(&self, arguments: Arguments) -> Result<Self::Output>;
}

impl<C: Callable + ?Sized> Callable for &C {
    type Output = C::Output;

    fn signature(&self) -> Result<Signature> {
        (**self).signature()
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output> {
        (**self).call(arguments)
    }
}

/// Declared name and metadata of one function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
    docs: Vec<String>,
    kind: ParameterKind,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            docs: Vec::new(),
            kind: ParameterKind::Named,
        }
    }

    /// Value used when the argument is omitted
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Attach a description; repeated calls add further candidates
    pub fn doc(mut self, description: impl Into<String>) -> Self {
        self.docs.push(description.into());
        self
    }

    /// Mark as collecting any number of positional values
    pub fn variadic(mut self) -> Self {
        self.kind = ParameterKind::VariadicPositional;
        self
    }

    /// Mark as collecting any number of extra named values
    pub fn keywords(mut self) -> Self {
        self.kind = ParameterKind::VariadicKeyword;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Param {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Functions whose argument types can be reflected and deserialized
///
/// Implemented for `Fn` closures and function items of up to eight
/// arguments. `Args` is the tuple of argument types.
pub trait Handler<Args> {
    type Output;

    /// Declared type of each argument, in order
    fn parameter_types() -> Vec<TypeDescriptor>;

    /// Decode each argument by name and call the function
    fn invoke(&self, names: &[&str], arguments: &Arguments) -> Result<Self::Output>;
}

macro_rules! impl_handler {
    ($($arg:ident),*) => {
        impl<F, R, $($arg,)*> Handler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R,
            $($arg: Reflect + DeserializeOwned,)*
        {
            type Output = R;

            fn parameter_types() -> Vec<TypeDescriptor> {
                vec![$($arg::reflect()),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, names: &[&str], arguments: &Arguments) -> Result<R> {
                let mut names = names.iter();
                $(
                    let name = names.next().ok_or_else(|| {
                        SchemaError::MissingArgument(stringify!($arg).to_lowercase())
                    })?;
                    let $arg: $arg = arguments.decode(name)?;
                )*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_handler!();
impl_handler!(A1);
impl_handler!(A1, A2);
impl_handler!(A1, A2, A3);
impl_handler!(A1, A2, A3, A4);
impl_handler!(A1, A2, A3, A4, A5);
impl_handler!(A1, A2, A3, A4, A5, A6);
impl_handler!(A1, A2, A3, A4, A5, A6, A7);
impl_handler!(A1, A2, A3, A4, A5, A6, A7, A8);

/// A Rust function with declared parameter names, defaults and docs
///
/// Parameters are matched to the handler's arguments by position. A handler
/// argument without a matching [`Param`] makes the signature unsupported, and
/// a [`Param`] beyond the handler's arity is reported as untyped.
pub struct Function<H, Args> {
    name: String,
    doc: Option<String>,
    params: Vec<Param>,
    returns: Option<TypeDescriptor>,
    handler: H,
    _args: PhantomData<fn(Args)>,
}

impl<H, Args> Function<H, Args>
where
    H: Handler<Args>,
{
    pub fn new(name: impl Into<String>, handler: H) -> Self {
        Self {
            name: name.into(),
            doc: None,
            params: Vec::new(),
            returns: None,
            handler,
            _args: PhantomData,
        }
    }

    /// Set the docstring; it is cleaned when the function is introspected
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Declare the return type from a Rust type
    pub fn returns<R: Reflect + ?Sized>(self) -> Self {
        self.returns_type(R::reflect())
    }

    pub fn returns_type(mut self, ty: TypeDescriptor) -> Self {
        self.returns = Some(ty);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn unnamed_argument(&self, arity: usize) -> Result<()> {
        if arity > self.params.len() {
            return Err(SchemaError::unsupported(
                &self.name,
                format!("arg{}", self.params.len()),
                "is not named; declare it with `Function::param`",
            ));
        }
        Ok(())
    }
}

impl<H, Args> Callable for Function<H, Args>
where
    H: Handler<Args>,
{
    type Output = H::Output;

    fn signature(&self) -> Result<Signature> {
        let mut types = H::parameter_types().into_iter();
        self.unnamed_argument(types.len())?;

        let parameters = self
            .params
            .iter()
            .map(|param| {
                let declared = match types.next() {
                    Some(ty) => DeclaredParameter::new(&param.name, ty),
                    None => DeclaredParameter::untyped(&param.name),
                };
                let declared = param
                    .docs
                    .iter()
                    .fold(declared.with_kind(param.kind), |declared, doc| {
                        declared.doc(doc)
                    });
                match &param.default {
                    Some(default) => declared.with_default(default.clone()),
                    None => declared,
                }
            })
            .collect();

        Ok(Signature {
            name: self.name.clone(),
            doc: self.doc.clone(),
            parameters,
            returns: self.returns.clone(),
        })
    }

    fn call(&self, arguments: Arguments) -> Result<Self::Output> {
        self.unnamed_argument(H::parameter_types().len())?;
        let names: Vec<&str> = self.params.iter().map(Param::name).collect();
        self.handler.invoke(&names, &arguments)
    }
}

impl<H, Args> fmt::Debug for Function<H, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}
