use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use morph_api::converter::Converter;
use morph_api::convertible::{TypeInfo, TypeKey};

/// Per-target-type lookup table mapping source types to a converter.
///
/// Registration and unregistration touch only the exact source key;
/// supertype expansion happens only during `resolve`.
pub struct Dispatcher {
    target: TypeKey,
    by_source: RwLock<HashMap<TypeKey, Arc<dyn Converter>>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("target", &self.target)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(target: TypeKey) -> Self {
        Self {
            target,
            by_source: RwLock::new(HashMap::new()),
        }
    }

    /// The one target type this dispatcher serves.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    /// Store `converter` under its exact source key, replacing any prior
    /// entry for the same key (last-write-wins, not merge).
    pub fn register(&self, converter: Arc<dyn Converter>) {
        let key = converter.source_type();
        let mut guard = match self.by_source.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.insert(key, converter);
    }

    /// Remove the entry under the exact source key, if present.
    pub fn unregister(&self, source: TypeKey) {
        let mut guard = match self.by_source.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.remove(&source);
    }

    /// Resolve a converter for a runtime type.
    ///
    /// Exact match first, then the declared capability markers in declaration
    /// order (recursing into each), then the parent chain. The first match
    /// anywhere in that walk wins; there is no "most specific type" ranking
    /// among equally-applicable entries. Returns `None` when the walk is
    /// exhausted — the registry decides what happens next.
    pub fn resolve(&self, info: TypeInfo) -> Option<Arc<dyn Converter>> {
        if let Some(found) = self.lookup(info.key) {
            return Some(found);
        }
        for trait_info in info.traits {
            if let Some(found) = self.resolve(trait_info()) {
                return Some(found);
            }
        }
        match info.parent {
            Some(parent) => self.resolve(parent()),
            None => None,
        }
    }

    fn lookup(&self, key: TypeKey) -> Option<Arc<dyn Converter>> {
        let guard = match self.by_source.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.get(&key).cloned()
    }

    /// Number of registered source keys (teardown diagnostics).
    pub fn len(&self) -> usize {
        let guard = match self.by_source.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("dispatcher read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
