//! Property-based tests for describe and invoke
//!
//! Covers the required set, extra-key tolerance, wrong-kind rejection, and
//! agreement between the generated schema and `call_with_json` for string and
//! numeric arguments.

mod common;

use annotated_docs::reflect::{Reflect, TypeDescriptor};
use annotated_docs::{
    as_json_schema, call_with_json, describe_signature, synthesize, DeclaredParameter, Function,
    SchemaError, SchemaOptions, Signature,
};
use common::{compile_parameters, get_current_weather, weather_tool, Location, Unit};
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};

fn scalar_type() -> impl Strategy<Value = TypeDescriptor> {
    prop_oneof![
        Just(TypeDescriptor::string()),
        Just(TypeDescriptor::integer()),
        Just(TypeDescriptor::number()),
        Just(TypeDescriptor::boolean()),
        Just(TypeDescriptor::sequence(TypeDescriptor::string())),
    ]
}

/// Parameters with unique names, each with an optional default
fn parameters() -> impl Strategy<Value = Vec<(String, TypeDescriptor, bool)>> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,8}", 0..8).prop_flat_map(|names| {
        let count = names.len();
        (
            Just(names.into_iter().collect::<Vec<_>>()),
            prop::collection::vec((scalar_type(), any::<bool>()), count),
        )
            .prop_map(|(names, specs)| {
                names
                    .into_iter()
                    .zip(specs)
                    .map(|(name, (ty, has_default))| (name, ty, has_default))
                    .collect()
            })
    })
}

/// Gain setting restricted to a mixed numeric set
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
struct Gain(f64);

const GAINS: [f64; 3] = [0.5, 1.0, 2.0];

impl Reflect for Gain {
    fn reflect() -> TypeDescriptor {
        TypeDescriptor::literals([json!(0.5), json!(1), json!(2)])
    }
}

/// An integral value sent either as a JSON integer or as a float like `3.0`
fn integral_json(n: i64, as_float: bool) -> Value {
    if as_float {
        json!(n as f64)
    } else {
        json!(n)
    }
}

/// JSON values that are never strings
fn non_string() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e6f64..1.0e6).prop_map(|n| json!(n)),
        prop::collection::vec(any::<i32>(), 0..3).prop_map(|items| json!(items)),
        Just(json!({"city": "Paris"})),
    ]
}

proptest! {
    #[test]
    fn required_matches_parameters_without_default(params in parameters()) {
        let signature = params
            .iter()
            .fold(Signature::new("f"), |signature, (name, ty, has_default)| {
                let parameter = DeclaredParameter::new(name, ty.clone());
                let parameter = if *has_default {
                    parameter.with_default(Value::Null)
                } else {
                    parameter
                };
                signature.with_parameter(parameter)
            });
        let options = SchemaOptions::default();
        let descriptor = describe_signature(signature, &options).unwrap();
        let schema = synthesize(&descriptor, &options).unwrap();

        let expected: Vec<Value> = params
            .iter()
            .filter(|(_, _, has_default)| !has_default)
            .map(|(name, _, _)| json!(name))
            .collect();
        let required = schema["parameters"]
            .get("required")
            .cloned()
            .unwrap_or_else(|| json!([]));
        prop_assert_eq!(required, Value::Array(expected.clone()));
        prop_assert_eq!(schema["parameters"].get("required").is_none(), expected.is_empty());

        let declared: BTreeSet<&str> = params.iter().map(|(name, _, _)| name.as_str()).collect();
        let properties: BTreeSet<&str> = schema["parameters"]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        prop_assert_eq!(declared, properties);
    }

    #[test]
    fn undeclared_keys_are_ignored(
        extras in prop::collection::btree_map("[a-z]{1,10}", any::<i32>(), 0..5),
    ) {
        let seen = RefCell::new(Vec::new());
        let tool = weather_tool(|location: Location, unit: Unit| {
            seen.borrow_mut().push((location.clone(), unit));
            get_current_weather(location, unit)
        });

        let mut arguments = Map::new();
        arguments.insert("location".into(), json!({"city": "Paris", "country": "France"}));
        for (key, value) in &extras {
            if key != "location" && key != "unit" {
                arguments.insert(key.clone(), json!(value));
            }
        }

        let result = call_with_json(&tool, &Value::Object(arguments));
        prop_assert!(result.is_ok());
        prop_assert_eq!(seen.borrow().len(), 1);
        prop_assert_eq!(seen.borrow()[0].1, Unit::Fahrenheit);
    }

    #[test]
    fn wrong_kind_never_reaches_function(city in non_string()) {
        let calls = AtomicUsize::new(0);
        let tool = weather_tool(|location: Location, unit: Unit| {
            calls.fetch_add(1, Ordering::SeqCst);
            get_current_weather(location, unit)
        });

        let err = call_with_json(
            &tool,
            &json!({"location": {"city": city, "country": "France"}}),
        )
        .unwrap_err();

        let is_city_error = matches!(
            err,
            SchemaError::ArgumentValidation { ref path, .. } if path.to_string() == "location.city"
        );
        prop_assert!(is_city_error);
        prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn schema_valid_instances_are_accepted(
        city in "[A-Za-z ]{0,16}",
        country in "[A-Za-z ]{0,16}",
        unit in prop::option::of(prop_oneof![Just("celsius"), Just("fahrenheit")]),
    ) {
        let seen = RefCell::new(None);
        let tool = weather_tool(|location: Location, unit: Unit| {
            *seen.borrow_mut() = Some((location.clone(), unit));
            get_current_weather(location, unit)
        });
        let schema = as_json_schema(&tool).unwrap();
        let compiled = compile_parameters(&schema);

        let mut arguments = json!({"location": {"city": city, "country": country}});
        if let Some(unit) = unit {
            arguments["unit"] = json!(unit);
        }
        prop_assert!(compiled.is_valid(&arguments));

        call_with_json(&tool, &arguments).unwrap();
        let expected_unit = match unit {
            Some("celsius") => Unit::Celsius,
            _ => Unit::Fahrenheit,
        };
        prop_assert_eq!(
            seen.borrow().clone(),
            Some((Location { city: city.clone(), country: country.clone() }, expected_unit))
        );
    }

    #[test]
    fn schema_valid_numbers_are_accepted(
        count in -1_000_000_000i64..1_000_000_000,
        count_as_float in any::<bool>(),
        ratio in prop_oneof![
            (-1.0e6f64..1.0e6).prop_map(|r| (json!(r), r)),
            any::<i32>().prop_map(|r| (json!(r), f64::from(r))),
        ],
        gain in 0..GAINS.len(),
        gain_as_float in any::<bool>(),
    ) {
        let seen = RefCell::new(None);
        let tool = Function::new("measure", |count: i64, ratio: f64, gain: Gain| {
            *seen.borrow_mut() = Some((count, ratio, gain));
        })
        .param("count")
        .param("ratio")
        .param("gain");
        let schema = as_json_schema(&tool).unwrap();
        let compiled = compile_parameters(&schema);

        let (ratio_json, ratio) = ratio;
        let gain_json = match GAINS[gain] {
            g if g.fract() == 0.0 => integral_json(g as i64, gain_as_float),
            g => json!(g),
        };
        let arguments = json!({
            "count": integral_json(count, count_as_float),
            "ratio": ratio_json,
            "gain": gain_json,
        });
        prop_assert!(compiled.is_valid(&arguments));

        call_with_json(&tool, &arguments).unwrap();
        prop_assert_eq!(seen.borrow().clone(), Some((count, ratio, Gain(GAINS[gain]))));
    }
}
