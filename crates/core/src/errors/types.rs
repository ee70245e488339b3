//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for treecache operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for treecache operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A hierarchical name could not be parsed from its text form
    MalformedName { input: String, reason: String },

    /// An operation needed at least one element but the name was the root
    EmptyName { operation: &'static str },

    /// Container or cache construction failed
    Bootstrap {
        source_kind: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Start or stop of an engine component failed
    Lifecycle {
        component: String,
        operation: &'static str,
        message: String,
    },

    /// A data operation was attempted on a component that is not running
    IllegalState {
        component: String,
        status: String,
        operation: &'static str,
    },

    /// Configuration errors
    Configuration { message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be marshalled for storage in a clustered cache
    Marshal { type_name: String, message: String },

    /// A marshalled value could not be materialized by the resolved context
    Unmarshal {
        type_name: String,
        context: String,
        message: String,
    },

    /// A typed read asked for a different type than the one stored
    TypeMismatch {
        fqn: String,
        key: String,
        expected: String,
        found: String,
    },
}
