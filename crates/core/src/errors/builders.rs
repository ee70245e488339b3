//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create a malformed name error
    #[must_use]
    pub fn malformed_name(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedName {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a bootstrap error without an underlying cause
    #[must_use]
    pub fn bootstrap(source_kind: &'static str, message: impl Into<String>) -> Self {
        Error::Bootstrap {
            source_kind,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying failure as a bootstrap error
    #[must_use]
    pub fn bootstrap_with_source(
        source_kind: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let source = source.into();
        Error::Bootstrap {
            source_kind,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a lifecycle error
    #[must_use]
    pub fn lifecycle(
        component: impl Into<String>,
        operation: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Error::Lifecycle {
            component: component.into(),
            operation,
            message: message.into(),
        }
    }

    /// Create an illegal state error
    #[must_use]
    pub fn illegal_state(
        component: impl Into<String>,
        status: impl ToString,
        operation: &'static str,
    ) -> Self {
        Error::IllegalState {
            component: component.into(),
            status: status.to_string(),
            operation,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a marshal error
    #[must_use]
    pub fn marshal(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Marshal {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create an unmarshal error
    #[must_use]
    pub fn unmarshal(
        type_name: impl Into<String>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Unmarshal {
            type_name: type_name.into(),
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from construction rather than from use
    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Error::Bootstrap { .. })
    }
}
