//! In-memory host tree.
//!
//! Nodes live in a generational [`Registry`]. Removing a node releases its
//! whole subtree (children first), so ids of removed nodes stop resolving.
//! Every mutation is counted in [`MutationStats`], which is how the
//! minimality guarantees of the diff engine are observed in tests.

use std::fmt::Write as _;
use std::rc::Rc;

use tracing::trace;

use super::{Host, NodeId};
use crate::engine::Registry;
use crate::error::HostError;
use crate::types::Listener;

// =============================================================================
// Mutation Stats
// =============================================================================

/// Counters for every mutation applied to a [`HostTree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub created: usize,
    pub attribute_writes: usize,
    pub attribute_removals: usize,
    pub text_writes: usize,
    pub inserts: usize,
    pub removals: usize,
    pub listener_changes: usize,
}

impl MutationStats {
    /// Node creations, insertions (including moves) and removals.
    pub fn structural(&self) -> usize {
        self.created + self.inserts + self.removals
    }

    /// Attribute writes and removals.
    pub fn attributes(&self) -> usize {
        self.attribute_writes + self.attribute_removals
    }

    pub fn total(&self) -> usize {
        self.structural() + self.attributes() + self.text_writes + self.listener_changes
    }
}

// =============================================================================
// Node Storage
// =============================================================================

struct NodeData {
    tag: Rc<str>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    listeners: Vec<(String, Listener)>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent: None,
            listeners: Vec::new(),
        }
    }
}

/// The crate's own host: a mutable document rooted at a `#root` node.
pub struct HostTree {
    nodes: Registry<NodeData>,
    root: NodeId,
    stats: MutationStats,
}

impl HostTree {
    pub fn new() -> Self {
        let mut nodes = Registry::new();
        let root = NodeId(nodes.insert(NodeData::new("#root")));
        Self {
            nodes,
            root,
            stats: MutationStats::default(),
        }
    }

    /// The document root. Use it as the container for `Runtime::mount`.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn stats(&self) -> MutationStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = MutationStats::default();
    }

    /// Return the counters and reset them.
    pub fn take_stats(&mut self) -> MutationStats {
        std::mem::take(&mut self.stats)
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node.0)
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|n| &*n.tag)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        let data = self.nodes.get(node.0)?;
        data.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in first-write order.
    pub fn attributes(&self, node: NodeId) -> Vec<(&str, &str)> {
        self.nodes
            .get(node.0)
            .map(|n| n.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
            .unwrap_or_default()
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).and_then(|n| n.text.as_deref())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_listener(&self, node: NodeId, event: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|n| n.listeners.iter().any(|(e, _)| e == event))
    }

    /// Serialize a node and its subtree: `<g status="entered">text<span/></g>`.
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    /// Serialize only the children of a node.
    pub fn inner_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_markup(*child, &mut out);
        }
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.nodes.get(node.0) else {
            return;
        };

        let _ = write!(out, "<{}", data.tag);
        for (name, value) in &data.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value, true));
        }
        if data.text.is_none() && data.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &data.text {
            out.push_str(&escape(text, false));
        }
        for child in &data.children {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", data.tag);
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut NodeData, HostError> {
        self.nodes.get_mut(node.0).ok_or(HostError::NodeNotFound(node))
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node.0).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: NodeId) {
        let parent = self.nodes.get(child.0).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(data) = self.nodes.get_mut(parent.0) {
                data.children.retain(|c| *c != child);
            }
        }
        if let Some(data) = self.nodes.get_mut(child.0) {
            data.parent = None;
        }
    }

    /// Release a node and everything below it.
    fn release(&mut self, node: NodeId) {
        let Some(data) = self.nodes.remove(node.0) else {
            return;
        };
        for child in data.children {
            self.release(child);
        }
    }
}

impl Default for HostTree {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for HostTree {
    fn create_node(&mut self, tag: &str) -> NodeId {
        self.stats.created += 1;
        NodeId(self.nodes.insert(NodeData::new(tag)))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError> {
        trace!(%node, name, value, "set attribute");
        let data = self.node_mut(node)?;
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
        self.stats.attribute_writes += 1;
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        let data = self.node_mut(node)?;
        data.attributes.retain(|(n, _)| n != name);
        self.stats.attribute_removals += 1;
        Ok(())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError> {
        let data = self.node_mut(node)?;
        data.text = if text.is_empty() { None } else { Some(text.to_string()) };
        self.stats.text_writes += 1;
        Ok(())
    }

    fn add_listener(&mut self, node: NodeId, event: &str, listener: Listener) -> Result<(), HostError> {
        let data = self.node_mut(node)?;
        match data.listeners.iter_mut().find(|(e, _)| e == event) {
            Some((_, existing)) => *existing = listener,
            None => data.listeners.push((event.to_string(), listener)),
        }
        self.stats.listener_changes += 1;
        Ok(())
    }

    fn remove_listener(&mut self, node: NodeId, event: &str) -> Result<(), HostError> {
        let data = self.node_mut(node)?;
        data.listeners.retain(|(e, _)| e != event);
        self.stats.listener_changes += 1;
        Ok(())
    }

    fn listener(&self, node: NodeId, event: &str) -> Option<Listener> {
        let data = self.nodes.get(node.0)?;
        data.listeners
            .iter()
            .find(|(e, _)| e == event)
            .map(|(_, l)| l.clone())
    }

    fn insert(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<(), HostError> {
        if !self.contains(parent) {
            return Err(HostError::NodeNotFound(parent));
        }
        if !self.contains(child) {
            return Err(HostError::NodeNotFound(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(HostError::Cycle { parent, child });
        }
        if let Some(sibling) = before {
            let sibling_parent = self.nodes.get(sibling.0).and_then(|n| n.parent);
            if sibling_parent != Some(parent) || sibling == child {
                return Err(HostError::NotAChild {
                    parent,
                    child: sibling,
                });
            }
        }

        self.detach(child);

        let data = self.node_mut(parent)?;
        let position = before
            .and_then(|sibling| data.children.iter().position(|c| *c == sibling))
            .unwrap_or(data.children.len());
        data.children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);

        self.stats.inserts += 1;
        Ok(())
    }

    fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let actual = self
            .nodes
            .get(child.0)
            .ok_or(HostError::NodeNotFound(child))?
            .parent;
        if actual != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }

        self.detach(child);
        self.release(child);
        self.stats.removals += 1;
        Ok(())
    }

    fn discard(&mut self, node: NodeId) {
        trace!(%node, "discard node");
        self.detach(node);
        self.release(node);
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.children.first().copied())
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.nodes.get(parent.0)?.children;
        let position = siblings.iter().position(|c| *c == node)?;
        siblings.get(position + 1).copied()
    }
}

fn escape(value: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
