//! Common test fixtures

#![allow(dead_code)]

use annotated_docs::reflect::{Field, ObjectType, Reflect, TypeDescriptor};
use annotated_docs::{Function, Handler, Param};
use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Reflect for Location {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::Object(ObjectType::of::<Self>("Location", || {
            vec![
                Field::new::<String>("city"),
                Field::new::<String>("country"),
            ]
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Celsius,
    Fahrenheit,
}

impl Reflect for Unit {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::literals(["celsius", "fahrenheit"])
    }
}

pub fn get_current_weather(location: Location, unit: Unit) -> String {
    let degrees = match unit {
        Unit::Celsius => "22C",
        Unit::Fahrenheit => "72F",
    };
    format!("{degrees} in {}, {}", location.city, location.country)
}

/// `get_current_weather` wrapped with any handler of the same shape
pub fn weather_tool<H, Args>(handler: H) -> Function<H, Args>
where
    H: Handler<Args>,
{
    Function::new("get_current_weather", handler)
        .doc("Get the current weather in a given location")
        .param(Param::new("location"))
        .param(Param::new("unit").default("fahrenheit"))
        .returns::<String>()
}

/// Install a test subscriber; set `RUST_LOG=annotated_docs=debug` to see events
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compile the `parameters` object of a tool document
pub fn compile_parameters(document: &Value) -> JSONSchema {
    JSONSchema::compile(&document["parameters"]).expect("parameters should be a valid JSON Schema")
}
