//! Keyed child reconciliation.
//!
//! Children are matched across updates by their `key` prop instead of by
//! position. Afterwards the host order under the parent equals the order of
//! the next list:
//!
//! ```text
//! prev: [a, b, c]        next: [c, x, a]
//!
//! remove b               [a, c]
//! c: stable, move front  [c, a]
//! x: new, after c        [c, x, a]
//! a: stable, in place    [c, x, a]
//! ```
//!
//! A new key goes right after the node of the nearest preceding key in the
//! next list; with no predecessor it goes before the parent's first child.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use super::Runtime;
use crate::element::{validate_keys, ChildMode, Element};
use crate::error::Result;
use crate::host::{Host, NodeId};
use crate::types::Key;

/// Pick the matching strategy for a child list update.
///
/// Keyed only when the next list opts in (its first child has a key) and both
/// lists are fully and uniquely keyed. Anything else falls back to positions.
pub(super) fn child_mode(prev: &[Element], next: &[Element]) -> ChildMode {
    if ChildMode::of(next) == ChildMode::Indexed {
        return ChildMode::Indexed;
    }
    match validate_keys(next).and_then(|()| validate_keys(prev)) {
        Ok(()) => ChildMode::Keyed,
        Err(error) => {
            warn!(%error, "malformed keyed child list; reconciling by position");
            ChildMode::Indexed
        }
    }
}

impl<H: Host> Runtime<H> {
    /// Reconcile children under `parent` by key. Both lists must be validated.
    pub(super) fn reconcile_keyed(&mut self, parent: NodeId, prev: Vec<Element>, next: &mut [Element]) -> Result<()> {
        let next_keys: HashSet<Key> = next.iter().filter_map(Element::key).collect();

        let mut stable: HashMap<Key, Element> = HashMap::with_capacity(prev.len());
        for old in prev {
            match old.key() {
                Some(key) if next_keys.contains(&key) => {
                    stable.insert(key, old);
                }
                _ => self.remove_element(&old)?,
            }
        }

        let mut cursor: Option<NodeId> = None;
        for child in next.iter_mut() {
            match child.key().and_then(|key| stable.remove(&key)) {
                Some(mut old) => {
                    self.reconcile_element(&mut old, child)?;
                    let anchor = self.anchor(parent, cursor);
                    if let Some(node) = self.node_of(child) {
                        if Some(node) != anchor {
                            self.host.insert(parent, node, anchor)?;
                        }
                    }
                }
                None => {
                    let anchor = self.anchor(parent, cursor);
                    self.mount_into(child, parent, anchor)?;
                }
            }
            cursor = self.node_of(child).or(cursor);
        }
        Ok(())
    }

    /// The node a child placed after `cursor` must precede.
    fn anchor(&self, parent: NodeId, cursor: Option<NodeId>) -> Option<NodeId> {
        match cursor {
            Some(node) => self.host.next_sibling(node),
            None => self.host.first_child(parent),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
