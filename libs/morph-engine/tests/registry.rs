use std::sync::Arc;

use morph_api::converter::{Converter, FnConverter, IdentityConverter};
use morph_api::convertible::{DynValue, TypeKey, Undefined};
use morph_api::error::ConversionError;
use morph_api::value::Value;
use morph_api::Convertible;

use morph_engine::builtin::CanonicalText;
use morph_engine::registry::ConverterRegistry;

#[derive(Debug, PartialEq, Convertible)]
struct Celsius(f64);

#[derive(Debug, PartialEq, Convertible)]
struct Fahrenheit(f64);

/// Canonical-keyed converter producing `Fahrenheit` from a neutral float.
struct CanonicalToFahrenheit;

impl Converter for CanonicalToFahrenheit {
    fn source_type(&self) -> TypeKey {
        TypeKey::canonical()
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::of::<Fahrenheit>()
    }

    fn convert(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        let degrees = value
            .as_any()
            .downcast_ref::<Value>()
            .and_then(|v| match v {
                Value::Float64(f) => Some(*f),
                _ => None,
            })
            .ok_or_else(|| ConversionError::new("expected a float in neutral form"))?;
        Ok(Arc::new(Fahrenheit(degrees * 9.0 / 5.0 + 32.0)))
    }
}

fn celsius_to_canonical() -> Arc<dyn Converter> {
    Arc::new(FnConverter::to_canonical(|c: &Celsius| {
        Ok(Value::Float64(c.0))
    }))
}

#[test]
fn identity_returns_value_unchanged() {
    let registry = ConverterRegistry::new();
    let value: DynValue = Arc::new(42i64);

    let out = registry.convert(value.clone(), TypeKey::of::<i64>()).unwrap();
    assert!(Arc::ptr_eq(&out, &value));
}

#[test]
fn any_target_returns_value_unchanged() {
    let registry = ConverterRegistry::new();
    let value: DynValue = Arc::new(Celsius(21.5));

    let out = registry.convert(value.clone(), TypeKey::any()).unwrap();
    assert!(Arc::ptr_eq(&out, &value));
}

#[test]
fn undefined_short_circuits_before_converters() {
    let registry = ConverterRegistry::new();
    // A converter that would panic if consulted.
    registry.register_converter(Arc::new(FnConverter::new(
        |_: &String| -> Result<i64, ConversionError> {
            panic!("converter must not run for an absent value")
        },
    )));

    let value: DynValue = Arc::new(Undefined);
    let out = registry.convert(value.clone(), TypeKey::of::<i64>()).unwrap();
    assert!(Arc::ptr_eq(&out, &value));
}

#[test]
fn bridging_composes_source_to_canonical_to_target() {
    let registry = ConverterRegistry::new();
    let to_canonical = celsius_to_canonical();
    let from_canonical: Arc<dyn Converter> = Arc::new(CanonicalToFahrenheit);
    registry.register_converter(to_canonical.clone());
    registry.register_converter(from_canonical.clone());

    let via_registry = registry
        .convert(Arc::new(Celsius(100.0)), TypeKey::of::<Fahrenheit>())
        .unwrap();

    // Same result as composing the two converters by hand.
    let intermediate = to_canonical.convert(Arc::new(Celsius(100.0))).unwrap();
    let by_hand = from_canonical.convert(intermediate).unwrap();

    assert_eq!(
        via_registry.as_any().downcast_ref::<Fahrenheit>(),
        by_hand.as_any().downcast_ref::<Fahrenheit>()
    );
    assert_eq!(
        via_registry.as_any().downcast_ref::<Fahrenheit>(),
        Some(&Fahrenheit(212.0))
    );
}

#[test]
fn no_path_fails_after_single_bridge_attempt() {
    let registry = ConverterRegistry::new();
    // The source canonicalizes, but nothing consumes the canonical form.
    registry.register_converter(celsius_to_canonical());

    let err = registry
        .convert(Arc::new(Celsius(0.0)), TypeKey::of::<Fahrenheit>())
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Celsius"), "got: {msg}");
    assert!(msg.contains("Fahrenheit"), "got: {msg}");
}

#[test]
fn already_canonical_value_with_no_consumer_trips_cycle_guard() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Arc::new(IdentityConverter::canonical::<String>()));

    // String is already neutral; canonicalization makes no progress, so the
    // bridge must fail rather than recurse.
    let err = registry
        .convert(
            Arc::new("hello".to_string()),
            TypeKey::of::<Fahrenheit>(),
        )
        .unwrap_err();
    assert!(err.to_string().contains("Fahrenheit"));
}

#[test]
fn conversion_below_canonical_fails_immediately() {
    let registry = ConverterRegistry::new();
    let err = registry
        .convert(Arc::new(Celsius(1.0)), TypeKey::canonical())
        .unwrap_err();
    assert!(err.to_string().contains("Celsius"));
}

#[test]
fn last_write_wins_for_same_pair() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Arc::new(FnConverter::new(|s: &String| {
        s.parse::<i64>().map_err(ConversionError::from)
    })));
    registry.register_converter(Arc::new(FnConverter::new(|s: &String| {
        Ok(s.len() as i64)
    })));

    let out = registry
        .convert(Arc::new("12345".to_string()), TypeKey::of::<i64>())
        .unwrap();
    // The length converter replaced the parser.
    assert_eq!(out.as_any().downcast_ref::<i64>(), Some(&5));
}

#[test]
fn unregister_removes_exact_pair() {
    let registry = ConverterRegistry::new();
    let parser: Arc<dyn Converter> = Arc::new(FnConverter::new(|s: &String| {
        s.parse::<i64>().map_err(ConversionError::from)
    }));
    registry.register_converter(parser.clone());
    registry.unregister_converter(parser.as_ref());

    assert!(registry
        .convert(Arc::new("42".to_string()), TypeKey::of::<i64>())
        .is_err());

    // Unregistering again (or for an unknown pair) is a no-op.
    registry.unregister_converter(parser.as_ref());
}

#[test]
fn reregistering_identical_instance_is_idempotent() {
    let registry = ConverterRegistry::new();
    let parser: Arc<dyn Converter> = Arc::new(FnConverter::new(|s: &String| {
        s.parse::<i64>().map_err(ConversionError::from)
    }));
    registry.register_converter(parser.clone());
    registry.register_converter(parser);

    let out = registry
        .convert(Arc::new("7".to_string()), TypeKey::of::<i64>())
        .unwrap();
    assert_eq!(out.as_any().downcast_ref::<i64>(), Some(&7));
}

// --- concrete scenarios -----------------------------------------------------

#[test]
fn scenario_decimal_text_parse() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Arc::new(FnConverter::new(|s: &String| {
        s.parse::<i64>().map_err(ConversionError::from)
    })));

    let out = registry
        .convert(Arc::new("42".to_string()), TypeKey::of::<i64>())
        .unwrap();
    assert_eq!(out.as_any().downcast_ref::<i64>(), Some(&42));

    let err = registry
        .convert(Arc::new("abc".to_string()), TypeKey::of::<i64>())
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("String"), "got: {msg}");
    assert!(msg.contains("i64"), "got: {msg}");
}

#[test]
fn scenario_empty_registry_has_no_path() {
    let registry = ConverterRegistry::new();
    let err = registry
        .convert(Arc::new(42i64), TypeKey::of::<Fahrenheit>())
        .unwrap_err();
    assert!(err.to_string().contains("Fahrenheit"));
}

#[test]
fn scenario_integer_to_text_through_canonical() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Arc::new(IdentityConverter::canonical::<i64>()));
    registry.register_converter(Arc::new(CanonicalText));

    let out = registry
        .convert(Arc::new(42i64), TypeKey::of::<String>())
        .unwrap();
    assert_eq!(
        out.as_any().downcast_ref::<String>().map(String::as_str),
        Some("42")
    );
}

#[test]
fn converter_failure_is_stamped_with_the_pair() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Arc::new(FnConverter::new(
        |_: &Celsius| -> Result<Fahrenheit, ConversionError> {
            Err(ConversionError::new("sensor fault"))
        },
    )));

    let err = registry
        .convert(Arc::new(Celsius(0.0)), TypeKey::of::<Fahrenheit>())
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Celsius"), "got: {msg}");
    assert!(msg.contains("Fahrenheit"), "got: {msg}");
    assert!(msg.contains("sensor fault"), "got: {msg}");
}
