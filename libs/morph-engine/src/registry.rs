use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use morph_api::converter::Converter;
use morph_api::convertible::{Convertible, DynValue, TypeDescribed, TypeInfo, TypeKey};
use morph_api::error::ConversionError;

use crate::dispatch::Dispatcher;
use crate::provider::ConverterProvider;

/// Process-wide entry point of the conversion engine.
///
/// Owns one `Dispatcher` per target type ever requested or registered for,
/// and implements the canonical-bridge fallback. Constructible as an isolated
/// instance — hosts keep one for the application lifetime, tests build their
/// own.
///
/// Lock order is always "dispatcher map, then dispatcher table", and no lock
/// is held while a converter runs: conversion functions may re-enter the
/// registry or be arbitrarily slow.
pub struct ConverterRegistry {
    dispatchers: RwLock<HashMap<TypeKey, Arc<Dispatcher>>>,
    discovery: Mutex<DiscoveryState>,
}

struct DiscoveryState {
    pending: Vec<Box<dyn ConverterProvider>>,
    done: bool,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterRegistry").finish()
    }
}

impl ConverterRegistry {
    /// Empty registry: no converters, no providers.
    pub fn new() -> Self {
        Self::with_providers(Vec::new())
    }

    /// Registry that drains `providers` lazily on first use.
    pub fn with_providers(providers: Vec<Box<dyn ConverterProvider>>) -> Self {
        Self {
            dispatchers: RwLock::new(HashMap::new()),
            discovery: Mutex::new(DiscoveryState {
                pending: providers,
                done: false,
            }),
        }
    }

    /// Convert `value` into an instance of `target`.
    ///
    /// The `Undefined` sentinel passes through untouched. A value that
    /// already satisfies the target (or a request for the universal "any"
    /// target) is returned unchanged. Otherwise the target's dispatcher
    /// resolves a converter through the hierarchy walk; failing that, the
    /// engine makes exactly one bridge attempt through the canonical form.
    pub fn convert(&self, value: DynValue, target: TypeKey) -> Result<DynValue, ConversionError> {
        self.ensure_discovered();

        let info = value.type_info();

        // Absent value: converters are never consulted.
        if info.key == TypeKey::undefined() {
            return Ok(value);
        }

        // Identity fast path.
        if target == TypeKey::any() || info.satisfies(target) {
            return Ok(value);
        }

        if let Some(converter) = self.resolve(info, target) {
            return converter
                .convert(value)
                .map_err(|e| e.with_types(info.key, target));
        }

        // No direct path. Recursion must not go below canonical.
        if target == TypeKey::canonical() {
            return Err(ConversionError::no_path(info.key, target));
        }

        // One bridge attempt through the neutral form, written as a straight
        // line so a second hop is structurally impossible.
        let canonical = if info.satisfies(TypeKey::canonical()) {
            value.clone()
        } else if let Some(converter) = self.resolve(info, TypeKey::canonical()) {
            converter
                .convert(value.clone())
                .map_err(|e| ConversionError::bridged(info.key, target, e))?
        } else {
            return Err(ConversionError::no_path(info.key, target));
        };

        // Cycle guard: canonicalization made no progress, so retrying the
        // target through it would loop forever.
        if Arc::ptr_eq(&canonical, &value) {
            return Err(ConversionError::no_progress(info.key, target));
        }

        let canonical_info = canonical.type_info();
        if canonical_info.satisfies(target) {
            return Ok(canonical);
        }
        match self.resolve(canonical_info, target) {
            Some(converter) => converter
                .convert(canonical)
                .map_err(|e| ConversionError::bridged(info.key, target, e)),
            None => Err(ConversionError::no_path(info.key, target)),
        }
    }

    /// `convert` with the target given as a type parameter.
    pub fn convert_to<T: TypeDescribed>(&self, value: DynValue) -> Result<DynValue, ConversionError> {
        self.convert(value, TypeKey::of::<T>())
    }

    /// Store a converter under its exact `(source, target)` pair, replacing
    /// any prior entry for the same pair.
    pub fn register_converter(&self, converter: Arc<dyn Converter>) {
        self.ensure_discovered();
        self.dispatcher_for(converter.target_type())
            .register(converter);
    }

    /// Remove the entry for the converter's exact `(source, target)` pair,
    /// if both the dispatcher and the entry exist; no-op otherwise.
    pub fn unregister_converter(&self, converter: &dyn Converter) {
        if let Some(dispatcher) = self.find_dispatcher(converter.target_type()) {
            dispatcher.unregister(converter.source_type());
        }
    }

    /// Resolve a converter for `info` against the dispatcher of `target`.
    ///
    /// Absence of a dispatcher is not an error — it only means no direct
    /// path is known yet.
    fn resolve(&self, info: TypeInfo, target: TypeKey) -> Option<Arc<dyn Converter>> {
        self.find_dispatcher(target)?.resolve(info)
    }

    fn find_dispatcher(&self, target: TypeKey) -> Option<Arc<Dispatcher>> {
        let guard = match self.dispatchers.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher map read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.get(&target).cloned()
    }

    fn dispatcher_for(&self, target: TypeKey) -> Arc<Dispatcher> {
        if let Some(existing) = self.find_dispatcher(target) {
            return existing;
        }
        let mut guard = match self.dispatchers.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher map write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard
            .entry(target)
            .or_insert_with(|| Arc::new(Dispatcher::new(target)))
            .clone()
    }

    /// Drain providers at most once per registry instance.
    ///
    /// The done flag flips before any candidate registers, so providers that
    /// call back into the registry see discovery as already finished. A
    /// candidate that fails to construct is logged and skipped — it never
    /// aborts discovery for the rest of the batch.
    fn ensure_discovered(&self) {
        let pending = {
            let mut state = match self.discovery.lock() {
                Ok(g) => g,
                Err(poisoned) => {
                    tracing::warn!("discovery lock was poisoned, recovering");
                    poisoned.into_inner()
                }
            };
            if state.done {
                return;
            }
            state.done = true;
            std::mem::take(&mut state.pending)
        };

        for provider in pending {
            for candidate in provider.converters() {
                match candidate {
                    Ok(converter) => {
                        tracing::debug!(
                            source = %converter.source_type(),
                            target = %converter.target_type(),
                            "registering discovered converter"
                        );
                        self.register_converter(converter);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping discovered converter");
                    }
                }
            }
        }
    }
}
