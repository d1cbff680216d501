//! Error types.
//!
//! Reconciliation itself never fails on caller mistakes: mismatched kinds are
//! replaced, malformed keyed lists fall back to positional reconciliation and
//! a reducer that returns nothing is a no-op. What remains are host failures
//! (stale node ids, broken parent links), messages to dead instances and
//! runaway dispatch cascades.

use thiserror::Error;

use crate::engine::InstanceId;
use crate::host::NodeId;
use crate::types::Key;

/// Errors reported by a [`Host`](crate::host::Host) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host node {0} does not exist")]
    NodeNotFound(NodeId),

    #[error("host node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("host node {0} has no parent")]
    Detached(NodeId),

    #[error("cannot insert {child} into its own subtree under {parent}")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Why a child list cannot be reconciled by key.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("child at index {index} has no key")]
    Missing { index: usize },

    #[error("key `{0}` appears more than once")]
    Duplicate(Key),
}

/// Errors surfaced by the [`Runtime`](crate::Runtime).
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("element `{0}` has not been mounted")]
    Unmounted(String),

    #[error("component instance {0} is no longer mounted")]
    StaleInstance(InstanceId),

    #[error("more than {limit} queued actions in a single drain; aborting dispatch")]
    DispatchOverflow { limit: usize },
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
