//! Child Mapping - Ordered key to element association.
//!
//! An animated list has to keep rendering children that were removed from
//! its input until their exit transition finishes. The mapping helpers here
//! compute that combined list:
//!
//! - [`ChildMapping::from_children`] indexes a child list by key
//! - [`merge_child_mappings`] unions two mappings, keeping both orders
//! - [`initial_child_mapping`] / [`next_child_mapping`] add the `in` and
//!   `status` props a [`Transition`](super::Transition) reads
//!
//! # Merge Order
//!
//! Keys of the next mapping appear in next order. A key only in the previous
//! mapping is placed right before the next key that followed it in the
//! previous mapping; trailing previous-only keys go last.
//!
//! ```text
//! prev: [a, b, c, d]
//! next: [c, x]
//! merged: [a, b, c, x, d]
//! ```

use std::collections::{HashMap, HashSet};

use crate::element::Element;
use crate::types::Key;

/// Transition prop: whether the child is present in the input list.
pub const IN: &str = "in";

/// Transition prop: one-shot hint for the first render.
pub const STATUS: &str = "status";

/// Children indexed by key, in order.
#[derive(Debug, Clone, Default)]
pub struct ChildMapping {
    entries: Vec<(Key, Element)>,
}

impl ChildMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index children by key. Unkeyed children are skipped; a repeated key
    /// keeps its first position and takes the last value.
    pub fn from_children(children: impl IntoIterator<Item = Element>) -> Self {
        let mut mapping = Self::new();
        for child in children {
            if let Some(key) = child.key() {
                mapping.insert(key, child);
            }
        }
        mapping
    }

    pub fn get(&self, key: &Key) -> Option<&Element> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Element> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. Replacing keeps the original position.
    pub fn insert(&mut self, key: Key, element: Element) {
        match self.get_mut(&key) {
            Some(existing) => *existing = element,
            None => self.entries.push((key, element)),
        }
    }

    pub fn remove(&mut self, key: &Key) -> Option<Element> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Element> {
        self.entries.iter().map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Element)> {
        self.entries.iter().map(|(k, e)| (k, e))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Element)> {
        self.entries.iter_mut().map(|(k, e)| (&*k, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_values(self) -> Vec<Element> {
        self.entries.into_iter().map(|(_, e)| e).collect()
    }
}

/// Union of two mappings. Values come from `next` where a key is in both.
pub fn merge_child_mappings(prev: ChildMapping, next: ChildMapping) -> ChildMapping {
    // Previous-only keys waiting for the next shared key.
    let mut pending_before: HashMap<Key, Vec<Key>> = HashMap::new();
    let mut pending = Vec::new();
    for key in prev.keys() {
        if next.contains(key) {
            if !pending.is_empty() {
                pending_before.insert(key.clone(), std::mem::take(&mut pending));
            }
        } else {
            pending.push(key.clone());
        }
    }

    let mut prev = prev;
    let mut merged = ChildMapping {
        entries: Vec::with_capacity(prev.len() + next.len()),
    };
    for (key, element) in next.entries {
        for leaving in pending_before.remove(&key).unwrap_or_default() {
            if let Some(old) = prev.remove(&leaving) {
                merged.entries.push((leaving, old));
            }
        }
        merged.entries.push((key, element));
    }
    for leaving in pending {
        if let Some(old) = prev.remove(&leaving) {
            merged.entries.push((leaving, old));
        }
    }
    merged
}

/// Mapping for a group's first render: every child is present and settled.
pub fn initial_child_mapping(children: impl IntoIterator<Item = Element>) -> ChildMapping {
    let mut mapping = ChildMapping::from_children(children);
    for (_, child) in mapping.iter_mut() {
        child.props.set(IN, true);
        child.props.set(STATUS, "enter");
    }
    mapping
}

/// Mapping for a later render.
///
/// New keys, and keys that come back while leaving, enter with `status:
/// "appear"`. Keys missing from `next_children` are kept with `in: false`.
/// Keys in both keep their previous `in`.
pub fn next_child_mapping(next_children: impl IntoIterator<Item = Element>, prev: &ChildMapping) -> ChildMapping {
    let next = ChildMapping::from_children(next_children);
    let next_keys: HashSet<Key> = next.keys().cloned().collect();
    let mut merged = merge_child_mappings(prev.clone(), next);

    for (key, child) in merged.iter_mut() {
        let prev_in = prev.get(key).map(is_in);
        let has_next = next_keys.contains(key);

        match (prev_in, has_next) {
            (None, true) | (Some(false), true) => enter(child),
            (Some(true), false) => child.props.set(IN, false),
            (Some(true), true) => child.props.set(IN, true),
            // Already leaving and still absent.
            _ => {}
        }
    }
    merged
}

fn enter(child: &mut Element) {
    child.props.set(IN, true);
    child.props.set(STATUS, "appear");
}

/// The `in` prop of a mapped child. Absent means present.
pub fn is_in(child: &Element) -> bool {
    child.props.bool(IN).unwrap_or(true)
}

// =============================================================================
// Tests
// =============================================================================
