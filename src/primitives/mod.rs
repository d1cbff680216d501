//! Animation Primitives - Components built on the reconciler.
//!
//! This module provides the animated-list building blocks:
//! - [`child_mapping`] - Key-indexed child lists and the order-preserving merge
//! - [`Transition`] - Per-element enter/exit state machine driven by timers
//! - [`TransitionGroup`] - Keyed list that keeps leaving children until they exit
//!
//! # Architecture
//!
//! Both primitives are plain [`Component`](crate::Component)s. They hold no
//! host state of their own; everything they do goes through props, their
//! reducer and the runtime's timers:
//!
//! ```text
//! TransitionGroup ── in/status props ──▶ Transition ── render prop ──▶ host
//!        ▲                                   │
//!        └──────── on_exited listener ◀──────┘  (after the exit timeout)
//! ```

pub mod child_mapping;
mod transition;
mod transition_group;

pub use child_mapping::{
    initial_child_mapping, merge_child_mappings, next_child_mapping, ChildMapping,
};
pub use transition::{
    next_state, Transition, TransitionAction, TransitionState, TransitionStatus,
    APPEAR_DELAY, DEFAULT_EXIT_TIMEOUT, ENTER_DELAY,
};
pub use transition_group::{TransitionGroup, TransitionGroupAction, TransitionGroupState};
