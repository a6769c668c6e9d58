use std::sync::Arc;

use morph_api::converter::Converter;
use morph_api::convertible::{DynValue, TypeDescribed, TypeKey};
use morph_api::error::ConversionError;
use morph_api::Convertible;

use morph_engine::dispatch::Dispatcher;
use morph_engine::registry::ConverterRegistry;

#[derive(Convertible)]
struct Streamable;

#[derive(Convertible)]
#[convert(implements(Streamable))]
struct Readable;

#[derive(Convertible)]
struct Printable;

#[derive(Convertible)]
struct Asset;

#[derive(Convertible)]
#[convert(implements(Readable, Printable), extends = Asset)]
struct Document;

/// Test converter keyed on an arbitrary source type; converts anything to a
/// fixed tag so tests can see which entry won.
struct Tagged {
    source: TypeKey,
    tag: &'static str,
}

impl Tagged {
    fn new(source: TypeKey, tag: &'static str) -> Arc<dyn Converter> {
        Arc::new(Self { source, tag })
    }
}

impl Converter for Tagged {
    fn source_type(&self) -> TypeKey {
        self.source
    }

    fn target_type(&self) -> TypeKey {
        TypeKey::of::<String>()
    }

    fn convert(&self, _value: DynValue) -> Result<DynValue, ConversionError> {
        Ok(Arc::new(self.tag.to_string()))
    }
}

fn resolve_tag(dispatcher: &Dispatcher) -> Option<&'static str> {
    let converter = dispatcher.resolve(<Document as TypeDescribed>::type_info())?;
    let out = converter.convert(Arc::new(Document)).ok()?;
    out.as_any()
        .downcast_ref::<String>()
        .map(|s| match s.as_str() {
            "exact" => "exact",
            "readable" => "readable",
            "printable" => "printable",
            "asset" => "asset",
            "streamable" => "streamable",
            _ => "?",
        })
}

#[test]
fn exact_match_beats_everything() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Document>(), "exact"));
    dispatcher.register(Tagged::new(TypeKey::of::<Readable>(), "readable"));
    dispatcher.register(Tagged::new(TypeKey::of::<Asset>(), "asset"));

    assert_eq!(resolve_tag(&dispatcher), Some("exact"));
}

#[test]
fn first_declared_marker_wins() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Readable>(), "readable"));
    dispatcher.register(Tagged::new(TypeKey::of::<Printable>(), "printable"));

    // Readable is declared before Printable; declaration order is the only
    // tie-break.
    assert_eq!(resolve_tag(&dispatcher), Some("readable"));
}

#[test]
fn later_marker_used_when_earlier_absent() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Printable>(), "printable"));

    assert_eq!(resolve_tag(&dispatcher), Some("printable"));
}

#[test]
fn markers_are_tried_before_the_parent_chain() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Printable>(), "printable"));
    dispatcher.register(Tagged::new(TypeKey::of::<Asset>(), "asset"));

    assert_eq!(resolve_tag(&dispatcher), Some("printable"));
}

#[test]
fn parent_chain_is_the_last_resort() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Asset>(), "asset"));

    assert_eq!(resolve_tag(&dispatcher), Some("asset"));
}

#[test]
fn walk_recurses_into_each_marker() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    // Streamable is only reachable through Readable's own declaration.
    dispatcher.register(Tagged::new(TypeKey::of::<Streamable>(), "streamable"));

    assert_eq!(resolve_tag(&dispatcher), Some("streamable"));
}

#[test]
fn exhausted_walk_returns_none() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<i64>(), "unrelated"));

    assert!(dispatcher
        .resolve(<Document as TypeDescribed>::type_info())
        .is_none());
}

#[test]
fn unregister_touches_only_the_exact_key() {
    let dispatcher = Dispatcher::new(TypeKey::of::<String>());
    dispatcher.register(Tagged::new(TypeKey::of::<Readable>(), "readable"));
    dispatcher.register(Tagged::new(TypeKey::of::<Asset>(), "asset"));

    // Removing the Document key is a no-op; resolution still walks to the
    // marker entry.
    dispatcher.unregister(TypeKey::of::<Document>());
    assert_eq!(resolve_tag(&dispatcher), Some("readable"));

    dispatcher.unregister(TypeKey::of::<Readable>());
    assert_eq!(resolve_tag(&dispatcher), Some("asset"));
}

#[test]
fn registry_falls_back_through_the_hierarchy() {
    let registry = ConverterRegistry::new();
    registry.register_converter(Tagged::new(TypeKey::of::<Readable>(), "readable"));

    // Document has no exact-type converter; the marker's converter resolves.
    let out = registry
        .convert(Arc::new(Document), TypeKey::of::<String>())
        .unwrap();
    assert_eq!(
        out.as_any().downcast_ref::<String>().map(String::as_str),
        Some("readable")
    );
}
