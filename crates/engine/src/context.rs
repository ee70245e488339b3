//! Deserialization contexts
//!
//! A [`ClassContext`] decides which Rust types a marshalled value may be
//! materialized as. Different subtrees of a cache can be served by different
//! contexts (see [`RegionManager`](crate::RegionManager)), so components that
//! share one cache do not need to know each other's types.

use crate::marshal::Marshalled;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use treecache_core::{Error, Result};

/// Type-resolution context used to materialize marshalled values
pub trait ClassContext: Send + Sync + fmt::Debug {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Turn a marshalled value back into an object
    fn unmarshal(&self, value: &Marshalled) -> Result<Box<dyn Any + Send + Sync>>;
}

type DecodeFn = fn(&[u8]) -> serde_json::Result<Box<dyn Any + Send + Sync>>;

fn decode_as<T>(payload: &[u8]) -> serde_json::Result<Box<dyn Any + Send + Sync>>
where
    T: DeserializeOwned + Any + Send + Sync,
{
    let value: T = serde_json::from_slice(payload)?;
    Ok(Box::new(value))
}

/// A [`ClassContext`] backed by an explicit list of known types
pub struct TypeRegistry {
    name: String,
    decoders: RwLock<HashMap<&'static str, DecodeFn>>,
}

impl TypeRegistry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decoders: RwLock::new(HashMap::new()),
        }
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<T>(self) -> Self
    where
        T: DeserializeOwned + Any + Send + Sync,
    {
        self.register::<T>();
        self
    }

    /// Make `T` resolvable through this context
    pub fn register<T>(&self)
    where
        T: DeserializeOwned + Any + Send + Sync,
    {
        self.decoders
            .write()
            .insert(type_name::<T>(), decode_as::<T> as DecodeFn);
    }

    pub fn knows(&self, type_name: &str) -> bool {
        self.decoders.read().contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.decoders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.read().is_empty()
    }
}

impl ClassContext for TypeRegistry {
    fn name(&self) -> &str {
        &self.name
    }

    fn unmarshal(&self, value: &Marshalled) -> Result<Box<dyn Any + Send + Sync>> {
        let decode = self
            .decoders
            .read()
            .get(value.type_name())
            .copied()
            .ok_or_else(|| {
                Error::unmarshal(value.type_name(), &self.name, "type is not registered")
            })?;
        decode(value.payload())
            .map_err(|e| Error::unmarshal(value.type_name(), &self.name, e.to_string()))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&'static str> = self.decoders.read().keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("name", &self.name)
            .field("types", &types)
            .finish()
    }
}

static DEFAULT_CONTEXT: Lazy<Arc<TypeRegistry>> = Lazy::new(|| {
    Arc::new(
        TypeRegistry::new("default")
            .with::<String>()
            .with::<bool>()
            .with::<i32>()
            .with::<i64>()
            .with::<u32>()
            .with::<u64>()
            .with::<f64>()
            .with::<Vec<u8>>()
            .with::<Vec<String>>()
            .with::<serde_json::Value>(),
    )
});

/// Process-wide fallback context, used where no region or decorated cache
/// supplies one. Applications may register additional types on it.
pub fn default_context() -> Arc<TypeRegistry> {
    Arc::clone(&DEFAULT_CONTEXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Dialog {
        id: String,
        state: u8,
    }

    #[test]
    fn test_registered_type_round_trips() {
        let registry = TypeRegistry::new("dialogs").with::<Dialog>();
        let dialog = Dialog {
            id: "a1".to_string(),
            state: 2,
        };
        let marshalled = Marshalled::marshal(&dialog).unwrap();

        let object = registry.unmarshal(&marshalled).unwrap();
        assert_eq!(object.downcast_ref::<Dialog>(), Some(&dialog));
        assert!(registry.knows(type_name::<Dialog>()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let registry = TypeRegistry::new("empty");
        let marshalled = Marshalled::marshal(&Dialog {
            id: "x".to_string(),
            state: 0,
        })
        .unwrap();

        match registry.unmarshal(&marshalled) {
            Err(Error::Unmarshal { context, .. }) => assert_eq!(context, "empty"),
            other => panic!("expected Unmarshal error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_context_knows_primitives() {
        let context = default_context();
        assert_eq!(context.name(), "default");
        assert!(context.knows(type_name::<String>()));
        assert!(!context.knows(type_name::<Dialog>()));
    }
}
