//! Fully-qualified names addressing nodes in a tree-structured cache.
//!
//! An [`Fqn`] is an immutable, ordered sequence of [`Element`]s. Names are
//! cheap to clone (the element slice is shared) and are composed by building
//! new names, never by mutating an existing one, so a common base such as a
//! session identifier can be extended into many sibling names safely.
//!
//! ```
//! use treecache_core::{fqn, Fqn};
//!
//! let session = Fqn::parse("/sessions/42").unwrap();
//! let dialog = session.extend(["dialogs", "a1"]);
//! assert_eq!(dialog.to_string(), "/sessions/42/dialogs/a1");
//! assert_eq!(dialog, fqn!["sessions", "42", "dialogs", "a1"]);
//! ```

use crate::constants::FQN_SEPARATOR;
use crate::errors::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// A single path component of an [`Fqn`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    Text(String),
    Integer(i64),
    Uuid(Uuid),
}

impl Element {
    /// The text of this element, if it is a text element
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Element::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Text(text) => f.write_str(text),
            Element::Integer(value) => write!(f, "{value}"),
            Element::Uuid(id) => write!(f, "{}", id.hyphenated()),
        }
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::Text(value.to_string())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::Text(value)
    }
}

impl From<&String> for Element {
    fn from(value: &String) -> Self {
        Element::Text(value.clone())
    }
}

impl From<i64> for Element {
    fn from(value: i64) -> Self {
        Element::Integer(value)
    }
}

impl From<i32> for Element {
    fn from(value: i32) -> Self {
        Element::Integer(i64::from(value))
    }
}

impl From<u32> for Element {
    fn from(value: u32) -> Self {
        Element::Integer(i64::from(value))
    }
}

impl From<Uuid> for Element {
    fn from(value: Uuid) -> Self {
        Element::Uuid(value)
    }
}

/// Fully-qualified name of a node in the cache tree
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fqn {
    elements: Arc<[Element]>,
}

impl Fqn {
    /// The root name, which has no elements
    pub fn root() -> Self {
        Self {
            elements: Arc::from(Vec::new()),
        }
    }

    /// Parse a `/`-delimited representation.
    ///
    /// The leading separator is optional and redundant separators collapse,
    /// so `"a//b/"` and `"/a/b"` name the same node. Every parsed element is
    /// [`Element::Text`].
    pub fn parse(text: &str) -> Result<Self> {
        let mut elements = Vec::new();
        for (index, segment) in text.split(FQN_SEPARATOR).enumerate() {
            if segment.is_empty() {
                continue;
            }
            if segment.chars().any(char::is_control) {
                return Err(Error::malformed_name(
                    text,
                    format!("control character in segment {index}"),
                ));
            }
            elements.push(Element::Text(segment.to_string()));
        }
        Ok(Self {
            elements: Arc::from(elements),
        })
    }

    /// Build a name from an explicit ordered list; an empty list is the root
    pub fn from_elements<I, E>(elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        let elements: Vec<Element> = elements.into_iter().map(Into::into).collect();
        Self {
            elements: Arc::from(elements),
        }
    }

    /// A new name made of this name's elements followed by `elements`
    pub fn extend<I, E>(&self, elements: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        let mut joined = self.elements.to_vec();
        joined.extend(elements.into_iter().map(Into::into));
        Self {
            elements: Arc::from(joined),
        }
    }

    /// Shorthand for extending by a single element
    pub fn child(&self, element: impl Into<Element>) -> Self {
        self.extend(std::iter::once(element.into()))
    }

    /// The final component of the name
    pub fn last_element(&self) -> Result<&Element> {
        self.elements.last().ok_or(Error::EmptyName {
            operation: "last_element",
        })
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// The enclosing name, or `None` for the root
    pub fn parent(&self) -> Option<Fqn> {
        if self.is_root() {
            return None;
        }
        Some(self.prefix(self.len() - 1))
    }

    /// Whether `ancestor` is this name or one of its ancestors
    pub fn starts_with(&self, ancestor: &Fqn) -> bool {
        self.elements.starts_with(&ancestor.elements)
    }

    /// Whether this name is a direct child of `parent`
    pub fn is_child_of(&self, parent: &Fqn) -> bool {
        self.len() == parent.len() + 1 && self.starts_with(parent)
    }

    /// This name followed by each of its ancestors, ending with the root
    pub fn ancestors(&self) -> impl Iterator<Item = Fqn> + '_ {
        (0..=self.len()).rev().map(move |depth| self.prefix(depth))
    }

    fn prefix(&self, depth: usize) -> Fqn {
        Self {
            elements: Arc::from(&self.elements[..depth]),
        }
    }
}

impl Default for Fqn {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(FQN_SEPARATOR);
        }
        for element in self.elements.iter() {
            write!(f, "{FQN_SEPARATOR}{element}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fqn({self})")
    }
}

impl FromStr for Fqn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Build an [`Fqn`] from a list of elements: `fqn!["calls", 7]`
#[macro_export]
macro_rules! fqn {
    () => {
        $crate::Fqn::root()
    };
    ($($element:expr),+ $(,)?) => {
        $crate::Fqn::from_elements([$($crate::Element::from($element)),+])
    };
}
