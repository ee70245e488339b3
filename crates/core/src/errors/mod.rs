//! Error types and result extensions for treecache operations

mod builders;
mod conversions;
mod display;
mod extensions;
mod types;

pub use extensions::*;
pub use types::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::malformed_name("/a/\u{7}", "control character in segment 2");
        assert_eq!(
            err.to_string(),
            "malformed name '/a/\u{7}': control character in segment 2"
        );

        let err = Error::EmptyName {
            operation: "last_element",
        };
        assert_eq!(err.to_string(), "last_element requires a non-root name");

        let err = Error::illegal_state("sessions", "TERMINATED", "read");
        assert_eq!(
            err.to_string(),
            "cannot read on 'sessions' while it is TERMINATED"
        );
    }

    #[test]
    fn test_bootstrap_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::bootstrap_with_source("file", Error::file_system("/x.json", "read", io));
        assert!(err.is_bootstrap());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("failed to bootstrap cache from file"));
    }
}
