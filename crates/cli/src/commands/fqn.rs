use anyhow::Context;
use clap::Subcommand;
use std::fmt::Write as _;
use treecache::{Element, Fqn};

#[derive(Subcommand)]
pub enum FqnCommands {
    /// Print the normalised form of a name and its elements
    Parse {
        /// Name such as `/calls/abc/legs`
        text: String,
    },
    /// Append elements to a base name
    Extend {
        base: String,
        #[arg(required = true)]
        elements: Vec<String>,
    },
}

impl FqnCommands {
    pub fn execute(self) -> anyhow::Result<String> {
        match self {
            FqnCommands::Parse { text } => {
                let name = Fqn::parse(&text).with_context(|| format!("Invalid name '{text}'"))?;
                let mut out = format!("{name}\n");
                for (index, element) in name.elements().iter().enumerate() {
                    let _ = writeln!(out, "  [{index}] {}", describe(element));
                }
                Ok(out)
            }
            FqnCommands::Extend { base, elements } => {
                let base = Fqn::parse(&base).with_context(|| format!("Invalid base name '{base}'"))?;
                Ok(format!("{}\n", base.extend(elements)))
            }
        }
    }
}

fn describe(element: &Element) -> String {
    match element {
        Element::Text(text) => format!("text {text:?}"),
        Element::Integer(value) => format!("integer {value}"),
        Element::Uuid(id) => format!("uuid {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises() {
        let out = FqnCommands::Parse {
            text: "calls//abc/".to_string(),
        }
        .execute()
        .unwrap();
        assert_eq!(out, "/calls/abc\n  [0] text \"calls\"\n  [1] text \"abc\"\n");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = FqnCommands::Parse {
            text: "a/b\u{7}c".to_string(),
        }
        .execute()
        .unwrap_err();
        assert!(err.to_string().contains("Invalid name"));
    }

    #[test]
    fn test_extend() {
        let out = FqnCommands::Extend {
            base: "/calls".to_string(),
            elements: vec!["abc".to_string(), "legs".to_string()],
        }
        .execute()
        .unwrap();
        assert_eq!(out, "/calls/abc/legs\n");
    }
}
