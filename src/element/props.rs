//! Props and children - The property bag of an element description.
//!
//! Properties keep insertion order, which is also the order attributes are
//! first written to the host. Children sit in their own slot instead of a
//! `children` entry so text, element lists and "nothing" are distinct states.

use std::collections::HashSet;
use std::rc::Rc;

use super::Element;
use crate::error::KeyError;
use crate::types::{Key, PropValue};

/// Name of the reserved key property.
pub const KEY: &str = "key";

// =============================================================================
// Children
// =============================================================================

/// The reserved `children` slot.
#[derive(Debug, Clone, Default)]
pub enum Children {
    #[default]
    None,
    Text(Rc<str>),
    Elements(Vec<Element>),
}

impl Children {
    pub fn is_none(&self) -> bool {
        matches!(self, Children::None)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Children::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_elements(&self) -> Option<&[Element]> {
        match self {
            Children::Elements(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_elements_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Children::Elements(e) => Some(e),
            _ => None,
        }
    }

    /// Element children by value; empty for text or nothing.
    pub fn into_elements(self) -> Vec<Element> {
        match self {
            Children::Elements(e) => e,
            _ => Vec::new(),
        }
    }
}

impl From<Vec<Element>> for Children {
    fn from(value: Vec<Element>) -> Self {
        Children::Elements(value)
    }
}

impl From<&str> for Children {
    fn from(value: &str) -> Self {
        Children::Text(value.into())
    }
}

impl From<String> for Children {
    fn from(value: String) -> Self {
        Children::Text(value.into())
    }
}

// =============================================================================
// Child Mode
// =============================================================================

/// How a child list is matched against its previous version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildMode {
    /// Pair children by position.
    Indexed,
    /// Pair children by their `key` property.
    Keyed,
}

impl ChildMode {
    /// Keyed when the first child carries a key.
    pub fn of(children: &[Element]) -> Self {
        match children.first() {
            Some(first) if first.key().is_some() => ChildMode::Keyed,
            _ => ChildMode::Indexed,
        }
    }
}

/// Check that every child has a key and no key repeats.
pub fn validate_keys(children: &[Element]) -> Result<(), KeyError> {
    let mut seen = HashSet::with_capacity(children.len());
    for (index, child) in children.iter().enumerate() {
        let key = child.key().ok_or(KeyError::Missing { index })?;
        if !seen.insert(key.clone()) {
            return Err(KeyError::Duplicate(key));
        }
    }
    Ok(())
}

// =============================================================================
// Props
// =============================================================================

/// Ordered property bag plus the children slot.
///
/// ```ignore
/// let props = Props::new()
///     .with("key", 1)
///     .with("class", "label")
///     .with_children("hello");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: Vec<(Rc<str>, PropValue)>,
    pub children: Children,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_children(mut self, children: impl Into<Children>) -> Self {
        self.children = children.into();
        self
    }

    /// Set a property, keeping its original position if it already exists.
    pub fn set(&mut self, name: impl Into<Rc<str>>, value: impl Into<PropValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|(n, _)| &**n == name)
            .map(|(_, v)| v)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        let position = self.entries.iter().position(|(n, _)| &**n == name)?;
        Some(self.entries.remove(position).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Properties in insertion order, children excluded.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(n, v)| (&**n, v))
    }

    /// Number of properties, children excluded.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key(&self) -> Option<Key> {
        self.get(KEY).and_then(PropValue::to_key)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(PropValue::as_int)
    }
}

// =============================================================================
// Tests
// =============================================================================
