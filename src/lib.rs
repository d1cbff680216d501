//! # spark-vdom
//!
//! Retained-mode element reconciler with keyed lists and transition primitives.
//!
//! ## Architecture
//!
//! Applications describe their UI as a tree of [`Element`]s: host tags and
//! stateful [`Component`]s. The [`Runtime`] materializes that tree into a
//! [`Host`] and, on every later update, re-applies only the mutations that
//! differ between the committed tree and the next one.
//!
//! ```text
//! Element tree → Runtime::mount → Host nodes
//!                     ↓
//! send / dispatch_event / advance → reducer → render → reconcile → Host mutations
//! ```
//!
//! Component state changes only through reducers and props. Hooks get an
//! explicit [`Cx`] handle; anything they send is queued and applied after the
//! current update commits. Time is a virtual clock advanced by the embedder.
//!
//! ## Modules
//!
//! - [`types`] - Property values, keys, events and callback shapes
//! - [`element`] - Element descriptions, props and child lists
//! - [`component`] - The component trait, hooks and runtime handles
//! - [`engine`] - Generational registry and timer queue
//! - [`host`] - Host trait and the in-memory [`HostTree`]
//! - [`pipeline`] - Mount, diff, keyed reconciliation and the [`Runtime`]
//! - [`primitives`] - [`Transition`], [`TransitionGroup`] and child mappings
//!
//! ## Example
//!
//! ```ignore
//! use spark_vdom::{create_element, Props, Runtime};
//!
//! let mut runtime = Runtime::new();
//! let root = runtime.host().root();
//! let tree = runtime.mount(
//!     create_element("list", Props::new(), Some("empty".into())),
//!     root,
//! )?;
//! assert_eq!(runtime.host().inner_markup(root), "<list>empty</list>");
//! ```

pub mod component;
pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod primitives;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use component::{Component, Cx, Hooks, Scope};

pub use config::{RuntimeConfig, DEFAULT_MAX_QUEUED_DISPATCHES};

pub use element::{
    create_element, validate_keys, ChildMode, Children, ComponentType, Element, ElementKind,
    Props, KEY,
};

pub use engine::{InstanceId, TimerId, Timers};

pub use error::{HostError, KeyError, ReconcileError, Result};

pub use host::{Host, HostTree, MutationStats, NodeId};

pub use pipeline::Runtime;

pub use primitives::{
    ChildMapping, Transition, TransitionAction, TransitionGroup, TransitionGroupAction,
    TransitionGroupState, TransitionState, TransitionStatus,
};
