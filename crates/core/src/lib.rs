//! Core domain types, errors, and constants for `treecache`.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias shared by every crate
//!   in the workspace.
//! - **`fqn`**: fully-qualified names (`Fqn`) that address nodes in the
//!   cache tree.
//! - **`constants`**: shared names, defaults and environment variables.

pub mod constants;
pub mod errors;
pub mod fqn;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    fqn::{Element, Fqn},
};
