//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedName { input, reason } => {
                write!(f, "malformed name '{input}': {reason}")
            }
            Error::EmptyName { operation } => {
                write!(f, "{operation} requires a non-root name")
            }
            Error::Bootstrap {
                source_kind,
                message,
                ..
            } => {
                write!(f, "failed to bootstrap cache from {source_kind}: {message}")
            }
            Error::Lifecycle {
                component,
                operation,
                message,
            } => {
                write!(f, "failed to {operation} '{component}': {message}")
            }
            Error::IllegalState {
                component,
                status,
                operation,
            } => {
                write!(
                    f,
                    "cannot {operation} on '{component}' while it is {status}"
                )
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
            Error::Marshal { type_name, message } => {
                write!(f, "failed to marshal value of type '{type_name}': {message}")
            }
            Error::Unmarshal {
                type_name,
                context,
                message,
            } => {
                write!(
                    f,
                    "context '{context}' cannot materialize '{type_name}': {message}"
                )
            }
            Error::TypeMismatch {
                fqn,
                key,
                expected,
                found,
            } => {
                write!(
                    f,
                    "value at {fqn}[{key}] is '{found}', not the requested '{expected}'"
                )
            }
        }
    }
}
