//! Host boundary - The live tree the reconciler writes into.
//!
//! The reconciler never owns host nodes directly. It talks to a [`Host`]
//! through a small set of primitive operations and refers to nodes by
//! [`NodeId`] handles that the host hands out.
//!
//! [`HostTree`] is the in-memory host shipped with the crate. It is a plain
//! mutable document with attribute, text and listener storage, mutation
//! counters and a markup serializer.

mod tree;

use std::fmt;

use crate::engine::Slot;
use crate::error::HostError;
use crate::types::Listener;

pub use tree::{HostTree, MutationStats};

/// Handle to a host node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) Slot);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}v{}", self.0.index(), self.0.generation())
    }
}

/// Operations the reconciler consumes from the host platform.
///
/// `insert` has DOM semantics: inserting a node that already has a parent
/// moves it. `remove` detaches a node together with its whole subtree; the
/// host may recycle the ids of removed nodes.
pub trait Host {
    /// Create a detached node for `tag`.
    fn create_node(&mut self, tag: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), HostError>;

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError>;

    /// Replace the node's text content. An empty string clears it.
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), HostError>;

    /// Attach a listener for `event`, replacing any previous one.
    fn add_listener(&mut self, node: NodeId, event: &str, listener: Listener) -> Result<(), HostError>;

    fn remove_listener(&mut self, node: NodeId, event: &str) -> Result<(), HostError>;

    /// The listener attached for `event`, if any.
    fn listener(&self, node: NodeId, event: &str) -> Option<Listener>;

    /// Insert `child` under `parent`, before `before` or at the end.
    fn insert(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<(), HostError>;

    /// Detach and discard `child` and its subtree.
    fn remove(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Free a node that never made it into the tree, with its subtree.
    fn discard(&mut self, node: NodeId);

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn first_child(&self, node: NodeId) -> Option<NodeId>;

    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
}
