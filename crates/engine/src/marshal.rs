//! Stored value forms
//!
//! A local cache keeps live objects. A clustered cache keeps every value in
//! its marshalled form so it can be handed to other members as-is; turning
//! it back into an object needs a [`ClassContext`](crate::ClassContext).

use serde::Serialize;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use treecache_core::{Error, Result};

/// A value serialized together with the name of its Rust type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marshalled {
    type_name: String,
    payload: Vec<u8>,
}

impl Marshalled {
    /// Serialize `value`, tagging it with the type it must be read back as
    pub fn marshal<T>(value: &T) -> Result<Self>
    where
        T: Serialize + Any,
    {
        let payload =
            serde_json::to_vec(value).map_err(|e| Error::marshal(type_name::<T>(), e.to_string()))?;
        Ok(Self {
            type_name: type_name::<T>().to_string(),
            payload,
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// One value held under a key of a node
#[derive(Clone)]
pub enum Entry {
    Object {
        type_name: &'static str,
        value: Arc<dyn Any + Send + Sync>,
    },
    Marshalled(Marshalled),
}

impl Entry {
    pub fn object<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Entry::Object {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Entry::Object { type_name, .. } => type_name,
            Entry::Marshalled(marshalled) => marshalled.type_name(),
        }
    }

    /// Short human-readable rendering used when printing cache content
    pub fn describe(&self) -> String {
        match self {
            Entry::Object { type_name, .. } => format!("<{type_name}>"),
            Entry::Marshalled(marshalled) => String::from_utf8_lossy(marshalled.payload()).into_owned(),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Object { type_name, .. } => f.debug_struct("Object").field("type_name", type_name).finish(),
            Entry::Marshalled(marshalled) => f.debug_tuple("Marshalled").field(marshalled).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marshal_tags_type() {
        let marshalled = Marshalled::marshal(&vec![1u32, 2, 3]).unwrap();
        assert_eq!(marshalled.type_name(), type_name::<Vec<u32>>());
        assert_eq!(marshalled.payload(), b"[1,2,3]");
    }

    #[test]
    fn test_entry_describe() {
        let object = Entry::object(5u8);
        assert_eq!(object.describe(), "<u8>");
        assert_eq!(object.type_name(), "u8");

        let marshalled = Entry::Marshalled(Marshalled::marshal(&"hi").unwrap());
        assert_eq!(marshalled.describe(), "\"hi\"");
    }
}
